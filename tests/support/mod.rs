//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pdfcrew::agent::{CrewEvent, StageObserver};
use pdfcrew::document::Embedder;
use pdfcrew::llm::{ChatMessage, CompletionService};
use pdfcrew::{PipelineError, Result};
use std::sync::Mutex;

const BUCKETS: usize = 64;

/// Bag-of-words embedder: each lowercase word lands in a fixed bucket
pub struct WordEmbedder;

#[async_trait]
impl Embedder for WordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; BUCKETS];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = word
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % BUCKETS] += 1.0;
        }
        Ok(v)
    }

    fn model(&self) -> &str {
        "word-buckets"
    }
}

/// Which stage a completion request belongs to, judged by its persona
pub fn stage_of(messages: &[ChatMessage]) -> &'static str {
    if messages[0].content.starts_with("You are Expert Agent") {
        "critic"
    } else {
        "composer"
    }
}

/// Completion fake that records each call and replies per stage
#[derive(Default)]
pub struct ScriptedLlm {
    pub calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    pub critic_reply: Option<String>,
    pub composer_reply: Option<String>,
    pub fail_on: Option<&'static str>,
}

impl ScriptedLlm {
    pub fn stages_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn prompt_for(&self, stage: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == stage)
            .map(|(_, m)| m.last().map(|m| m.content.clone()).unwrap_or_default())
    }
}

#[async_trait]
impl CompletionService for ScriptedLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let stage = stage_of(messages);
        self.calls
            .lock()
            .unwrap()
            .push((stage.to_string(), messages.to_vec()));

        if self.fail_on == Some(stage) {
            return Err(PipelineError::service("completion", "service unavailable"));
        }

        let reply = match stage {
            "critic" => self.critic_reply.clone(),
            _ => self.composer_reply.clone(),
        };
        Ok(reply.unwrap_or_else(|| format!("{} reply", stage)))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Observer recording event names in order
#[derive(Default)]
pub struct EventLog(pub Mutex<Vec<String>>);

impl EventLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl StageObserver for EventLog {
    fn on_event(&self, event: CrewEvent<'_>) {
        let entry = match event {
            CrewEvent::StageStarted(stage) => format!("start:{}", stage),
            CrewEvent::Retrieved(p) => format!("retrieved:{}", p.len()),
            CrewEvent::Critiqued(_) => "critiqued".to_string(),
            CrewEvent::Answered(_) => "answered".to_string(),
            CrewEvent::StageFailed(stage, _) => format!("failed:{}", stage),
        };
        self.0.lock().unwrap().push(entry);
    }
}
