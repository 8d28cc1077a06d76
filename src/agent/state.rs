//! Pipeline state machine
//!
//! Deterministic finite state machine for one run:
//! - Safety: Composing is only reachable through Critiquing, which is only
//!   reachable through Retrieving
//! - Liveness: every run ends in Done or Failed
//! - Terminal states accept no further events

use crate::agent::profiles::{AgentProfile, EXPERT_AGENT, PROFESSIONAL_WRITER, RESEARCH_AGENT};
use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline run states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    /// Run created, nothing executed yet
    Idle,

    /// Searching the document index
    Retrieving,

    /// Critic completion in flight
    Critiquing,

    /// Composer completion in flight
    Composing,

    /// Answer produced (terminal)
    Done,

    /// A stage failed (terminal)
    Failed,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Start,
    PassagesReady,
    CritiqueReady,
    AnswerReady,
    StageFailed,
}

/// The three sequential stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Retriever,
    Critic,
    Composer,
}

impl Stage {
    /// Persona of the agent that owns this stage
    pub fn profile(&self) -> &'static AgentProfile {
        match self {
            Stage::Retriever => &RESEARCH_AGENT,
            Stage::Critic => &EXPERT_AGENT,
            Stage::Composer => &PROFESSIONAL_WRITER,
        }
    }

    pub fn agent_role(&self) -> &'static str {
        self.profile().role
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Retriever => "retriever",
            Stage::Critic => "critic",
            Stage::Composer => "composer",
        };
        f.write_str(name)
    }
}

impl PipelineState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    /// 1. Idle       → Retrieving (on: Start)
    /// 2. Retrieving → Critiquing (on: PassagesReady)
    /// 3. Critiquing → Composing  (on: CritiqueReady)
    /// 4. Composing  → Done       (on: AnswerReady)
    /// 5. Retrieving | Critiquing | Composing → Failed (on: StageFailed)
    pub fn transition(&self, event: PipelineEvent) -> Result<PipelineState> {
        use PipelineEvent::*;
        use PipelineState::*;

        let next_state = match (self, event) {
            (Idle, Start) => Retrieving,
            (Retrieving, PassagesReady) => Critiquing,
            (Critiquing, CritiqueReady) => Composing,
            (Composing, AnswerReady) => Done,
            (Retrieving | Critiquing | Composing, StageFailed) => Failed,

            (from, event) => {
                return Err(PipelineError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next_state)
    }

    /// The stage executing in this state, if any
    pub fn active_stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Retrieving => Some(Stage::Retriever),
            PipelineState::Critiquing => Some(Stage::Critic),
            PipelineState::Composing => Some(Stage::Composer),
            _ => None,
        }
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Retrieving => "Searching document",
            PipelineState::Critiquing => "Reviewing findings",
            PipelineState::Composing => "Writing answer",
            PipelineState::Done => "Completed",
            PipelineState::Failed => "Failed",
        }
    }
}
