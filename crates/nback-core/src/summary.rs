//! Session summary record with JSON persistence.
//!
//! This is the record handed to a results collector after a session ends,
//! whatever way it ended. Producing it is the engine's job; delivering it
//! is not.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{SessionStatus, Subject};
use crate::score::SessionScore;

/// Single-session result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique identifier for this session.
    pub id: Uuid,
    pub subject_first_name: String,
    pub subject_email: String,
    /// The lag the session ran at.
    pub lag: usize,
    /// Eligible trials with a recorded outcome (response or timeout).
    pub total_trials: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Percentage in [0, 100].
    pub accuracy: f64,
    pub status: SessionStatus,
    /// When the summary was produced.
    pub recorded_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn build(
        subject: &Subject,
        lag: usize,
        score: SessionScore,
        status: SessionStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_first_name: subject.first_name.clone(),
            subject_email: subject.email.clone(),
            lag,
            total_trials: score.total,
            correct: score.correct,
            incorrect: score.incorrect,
            accuracy: score.accuracy(),
            status,
            recorded_at: Utc::now(),
        }
    }

    /// Human-readable test name, e.g. "2-Back Test".
    pub fn test_type(&self) -> String {
        format!("{}-Back Test", self.lag)
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionSummary {
        SessionSummary::build(
            &Subject {
                first_name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            2,
            SessionScore {
                correct: 21,
                incorrect: 7,
                total: 28,
            },
            SessionStatus::Completed,
        )
    }

    #[test]
    fn build_derives_accuracy() {
        let summary = sample();
        assert_eq!(summary.total_trials, 28);
        assert!((summary.accuracy - 75.0).abs() < 1e-9);
        assert_eq!(summary.test_type(), "2-Back Test");
    }

    #[test]
    fn json_roundtrip() {
        let summary = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        summary.save_json(&path).unwrap();
        let loaded = SessionSummary::load_json(&path).unwrap();

        assert_eq!(loaded.id, summary.id);
        assert_eq!(loaded.subject_email, "ada@example.com");
        assert_eq!(loaded.status, SessionStatus::Completed);
    }

    #[test]
    fn timestamp_is_iso8601() {
        let json = serde_json::to_value(sample()).unwrap();
        let ts = json["recorded_at"].as_str().unwrap();
        assert!(ts.contains('T'), "expected ISO-8601 timestamp, got {ts}");
    }
}
