//! Telemetry for pipeline runs
//!
//! Collects stage lifecycle events for one run and summarises them.

use std::time::{Duration, Instant};

use crate::agent::state::{PipelineState, Stage};

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    StateTransition {
        from: PipelineState,
        to: PipelineState,
        timestamp: Instant,
    },
    StageStarted {
        stage: Stage,
        timestamp: Instant,
    },
    StageCompleted {
        stage: Stage,
        duration_ms: u64,
        success: bool,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub stages_started: usize,
    pub stages_succeeded: usize,
    pub stages_failed: usize,
    pub state_transitions: usize,
}

/// Per-run telemetry collector
#[derive(Debug, Clone)]
pub struct TelemetryCollector {
    events: Vec<TelemetryEvent>,
    stats: TelemetryStats,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            stats: TelemetryStats::default(),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&mut self, event: TelemetryEvent) {
        match &event {
            TelemetryEvent::StateTransition { .. } => {
                self.stats.state_transitions += 1;
            }
            TelemetryEvent::StageStarted { .. } => {
                self.stats.stages_started += 1;
            }
            TelemetryEvent::StageCompleted { success, .. } => {
                if *success {
                    self.stats.stages_succeeded += 1;
                } else {
                    self.stats.stages_failed += 1;
                }
            }
        }

        self.events.push(event);
    }

    /// Get current statistics
    pub fn stats(&self) -> &TelemetryStats {
        &self.stats
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    /// Stages in the order they started
    pub fn stage_order(&self) -> Vec<Stage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::StageStarted { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    /// Duration of each completed stage, in completion order
    pub fn stage_durations(&self) -> Vec<(Stage, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::StageCompleted {
                    stage,
                    duration_ms,
                    success: true,
                    ..
                } => Some((*stage, *duration_ms)),
                _ => None,
            })
            .collect()
    }

    /// Multi-line run summary for verbose output
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Run Summary".to_string(),
            "─".repeat(37),
            format!("Duration:          {:?}", self.elapsed()),
        ];
        for (stage, ms) in self.stage_durations() {
            lines.push(format!("{:<18} {}ms", format!("{}:", stage.agent_role()), ms));
        }
        lines.push(format!(
            "Stages:            {} ok, {} failed",
            self.stats.stages_succeeded, self.stats.stages_failed
        ));
        lines.join("\n")
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
