//! Agent pipeline
//!
//! The three agents (Research Agent, Expert Agent, Professional Writer),
//! the state machine tracking a run, and the `Crew` driver sequencing them.

pub mod composer;
pub mod critic;
pub mod crew;
pub mod profiles;
pub mod state;

// Re-export commonly used types
pub use composer::{Answer, Composer, FALLBACK_ANSWER};
pub use critic::{Critic, Critique};
pub use crew::{Crew, CrewEvent, CrewOutput, NoopObserver, StageObserver};
pub use profiles::{AgentProfile, TaskSpec};
pub use state::{PipelineEvent, PipelineState, Stage};
