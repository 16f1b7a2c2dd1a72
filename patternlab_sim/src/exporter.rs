//! JSON trace exporter.
//!
//! Exports a scenario's frames and events as JSON so a front end can replay
//! the run without re-executing it.

use crate::runner::{ScenarioMetrics, ScenarioResult};
use patternlab_core::SortStep;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single paced frame of a sort trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// Position in the trace
    pub index: usize,

    /// Playback time at which the frame was delivered
    pub time_ms: u64,

    #[serde(flatten)]
    pub step: SortStep,
}

/// Something a scenario observed while running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl TraceEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: None,
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: Some("warn".to_string()),
        }
    }
}

/// Complete scenario export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Playback duration in milliseconds
    pub duration_ms: u64,

    /// All frames
    pub frames: Vec<TraceFrame>,

    /// Events, in the order they happened
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<TraceEvent>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    pub metrics: ScenarioMetrics,
}

impl TraceExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_ms: 0,
            frames: Vec::new(),
            events: Vec::new(),
            passed: false,
            failure_reason: None,
            metrics: ScenarioMetrics::default(),
        }
    }

    /// Creates an export carrying a result's events and verdict. Frames
    /// are added separately as playback delivers them.
    pub fn from_result(result: &ScenarioResult) -> Self {
        let mut export = Self::new(result.scenario.name(), result.seed);
        export.events = result.trace.events.clone();
        export.finalize(result);
        export
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: TraceFrame) {
        self.duration_ms = frame.time_ms;
        self.frames.push(frame);
    }

    pub fn add_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Copies the verdict and metrics from `result`.
    pub fn finalize(&mut self, result: &ScenarioResult) {
        self.passed = result.passed;
        self.failure_reason = result.failure_reason.clone();
        self.metrics = result.metrics.clone();
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScenarioRunner;
    use crate::scenarios::ScenarioId;

    #[test]
    fn test_export_serializes_flattened_frames() {
        let mut export = TraceExport::new("strategy", 42);
        export.add_frame(TraceFrame {
            index: 0,
            time_ms: 100,
            step: SortStep {
                array: vec![2, 1],
                comparing: Some((0, 1)),
                swapping: None,
                sorted: None,
            },
        });
        export.add_event(TraceEvent::warn("slow frame"));

        let json: serde_json::Value = serde_json::to_value(&export).unwrap();
        assert_eq!(export.duration_ms, 100);
        assert_eq!(json["frames"][0]["array"], serde_json::json!([2, 1]));
        assert_eq!(json["frames"][0]["comparing"], serde_json::json!([0, 1]));
        assert!(json["frames"][0].get("swapping").is_none());
        assert_eq!(json["events"][0]["level"], "warn");
    }

    #[test]
    fn test_export_from_result_copies_verdict() {
        let result = ScenarioRunner::new(9).run(ScenarioId::Decorator);
        let export = TraceExport::from_result(&result);

        assert_eq!(export.scenario, "decorator");
        assert_eq!(export.seed, 9);
        assert_eq!(export.passed, result.passed);
        assert_eq!(export.events, result.trace.events);
        assert!(export.frames.is_empty());
    }
}
