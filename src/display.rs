//! Console output
//!
//! The answer goes to stdout between marker lines. Everything else
//! (spinners, intermediate stage output, errors) goes to stderr so the
//! answer can be piped on its own.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::agent::{CrewEvent, Stage, StageObserver};
use crate::cli::Verbosity;
use crate::document::PassageSet;

/// Printed before and after the answer
pub const ANSWER_MARKER: &str = "------";

const PREVIEW_CHARS: usize = 160;

/// Answer block exactly as written to stdout
pub fn format_answer(answer: &str) -> String {
    format!("\n{}\n{}\n{}", ANSWER_MARKER, answer, ANSWER_MARKER)
}

/// First `max` characters of `text`, with an ellipsis when cut
fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Stage progress and verbose output on the terminal
pub struct ConsoleDisplay {
    verbosity: Verbosity,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleDisplay {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            spinner: Mutex::new(None),
        }
    }

    /// Print the final answer between marker lines
    pub fn show_answer(&self, answer: &str) {
        println!("{}", format_answer(answer));
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        self.finish_spinner();
        eprintln!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display info message (suppressed in quiet mode)
    pub fn show_info(&self, info: &str) {
        if self.verbosity.show_progress() {
            eprintln!("{} {}", "Info:".cyan(), info);
        }
    }

    /// Display a block of detail text (verbose only)
    pub fn show_details(&self, text: &str) {
        if self.verbosity.show_events() {
            eprintln!("\n{}\n", text.dimmed());
        }
    }

    fn start_spinner(&self, stage: Stage) {
        if !self.verbosity.show_progress() {
            return;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{} working...", stage.agent_role()));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn stage_header(&self, stage: Stage) {
        let profile = stage.profile();
        eprintln!(
            "\n{} {}",
            format!("# {}", profile.role).bold().cyan(),
            format!("({})", profile.goal).dimmed()
        );
    }

    fn show_passages(&self, passages: &PassageSet) {
        self.stage_header(Stage::Retriever);
        if passages.is_empty() {
            eprintln!("{}", "No relevant passages found.".yellow());
            return;
        }
        for (idx, passage) in passages.iter().enumerate() {
            let label = format!(
                "[{}] score {:.2} chunk {}",
                idx + 1,
                passage.score,
                passage.ordinal
            );
            eprintln!("{} {}", label.green(), preview(&passage.text, PREVIEW_CHARS));
        }
    }
}

impl StageObserver for ConsoleDisplay {
    fn on_event(&self, event: CrewEvent<'_>) {
        match event {
            CrewEvent::StageStarted(stage) => self.start_spinner(stage),
            CrewEvent::Retrieved(passages) => {
                self.finish_spinner();
                if self.verbosity.show_events() {
                    self.show_passages(passages);
                }
            }
            CrewEvent::Critiqued(critique) => {
                self.finish_spinner();
                if self.verbosity.show_events() {
                    self.stage_header(Stage::Critic);
                    eprintln!("{}", critique.as_str());
                }
            }
            CrewEvent::Answered(_) => self.finish_spinner(),
            CrewEvent::StageFailed(stage, error) => {
                self.finish_spinner();
                eprintln!(
                    "{} {} failed: {}",
                    "✗".red(),
                    stage.agent_role(),
                    error.to_string().red()
                );
            }
        }
    }
}
