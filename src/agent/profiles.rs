//! Agent personas and task instructions
//!
//! Every completion is rendered as a system message describing the agent
//! (role, goal, backstory) followed by a user message carrying the task,
//! the question and whatever context earlier stages produced.

use crate::llm::ChatMessage;

/// Who an agent is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

/// What an agent is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: &'static str,
    pub expected_output: &'static str,
}

pub const RESEARCH_AGENT: AgentProfile = AgentProfile {
    role: "Research Agent",
    goal: "Search through the PDF to find relevant answers",
    backstory: "The research agent is adept at searching and extracting data from \
                documents, ensuring accurate and prompt responses.",
};

pub const EXPERT_AGENT: AgentProfile = AgentProfile {
    role: "Expert Agent",
    goal: "Critique on the research agent's findings and extract relevant information",
    backstory: "The expert agent is an expert in the field of computer science, especially \
                artificial intelligence, and is able to provide technical feedback on the \
                provided information.",
};

pub const PROFESSIONAL_WRITER: AgentProfile = AgentProfile {
    role: "Professional Writer",
    goal: "Write professional paragraphs based on the research agent's findings and \
           expert agent's critiques",
    backstory: "The professional writer agent has excellent writing skills and is able to \
                craft clear and concise paragraphs based on the provided information.",
};

pub const CRITIQUE_TASK: TaskSpec = TaskSpec {
    description: "- Critique verbosely on the research agent's findings and provide valuable \
                  insights\n\
                  - The responses should clearly explain whether the points are related to \
                  the user's question",
    expected_output: "Provide clear and accurate critiques to each answer provided by the \
                      research agent",
};

pub const SUMMARIZING_TASK: TaskSpec = TaskSpec {
    description: "- Write one paragraph to answer the user based on the research agent's \
                  findings and expert agent's critiques.\n\
                  - The paragraph should clearly respond to the user's question given at \
                  the start",
    expected_output: "Write one clear and concise paragraph that can be sent to the user to \
                      address the question that they had.",
};

impl AgentProfile {
    /// System message introducing the agent
    pub fn system_message(&self) -> ChatMessage {
        ChatMessage::system(format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        ))
    }
}

impl TaskSpec {
    /// User message for this task. Sections are `(heading, body)` pairs
    /// rendered in order after the question.
    pub fn user_message(&self, question: &str, sections: &[(&str, &str)]) -> ChatMessage {
        let mut prompt = format!(
            "{}\n\nHere is the user's question:\n{}\n",
            self.description,
            question.trim()
        );

        for (heading, body) in sections {
            prompt.push_str(&format!("\n{}:\n{}\n", heading, body.trim()));
        }

        prompt.push_str(&format!(
            "\nThis is the expected output for your work:\n{}",
            self.expected_output
        ));

        ChatMessage::user(prompt)
    }
}

/// Full conversation for one stage
pub fn render(
    profile: &AgentProfile,
    task: &TaskSpec,
    question: &str,
    sections: &[(&str, &str)],
) -> Vec<ChatMessage> {
    vec![
        profile.system_message(),
        task.user_message(question, sections),
    ]
}
