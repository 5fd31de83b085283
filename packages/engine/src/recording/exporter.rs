// packages/engine/src/recording/exporter.rs
//! Export round reports and events
//!
//! Supports:
//! - JSON (for analysis, tooling)
//! - Text (human-readable transcript, same lines the driver prints)

use crate::recording::recorder::RoundEvent;
use crate::runtime::round::RoundReport;
use crate::utils::errors::Result;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON
    Json,

    /// Plain text transcript
    Text,
}

/// Exporter for round reports and recorded events
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export round reports
    ///
    /// The text form mirrors the console transcript:
    ///
    /// ```text
    /// Stimulus: Hello world
    /// KeywordBot -> Agent says: Hi there!
    /// EchoBot -> Echoing: Hello world
    /// ```
    pub fn export_reports(&self, reports: &[RoundReport]) -> Result<String> {
        debug!("Exporting {} round reports to {:?}", reports.len(), self.format);

        match self.format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            ExportFormat::Text => Ok(reports
                .iter()
                .map(|report| {
                    let mut block = format!("Stimulus: {}", report.stimulus);
                    for line in report.lines() {
                        block.push('\n');
                        block.push_str(&line);
                    }
                    block
                })
                .collect::<Vec<_>>()
                .join("\n\n")),
        }
    }

    /// Export recorded events
    pub fn export_events(&self, events: &[RoundEvent]) -> Result<String> {
        debug!("Exporting {} events to {:?}", events.len(), self.format);

        match self.format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(events)?),
            ExportFormat::Text => Ok(events
                .iter()
                .map(|event| {
                    let mut line = format!(
                        "{} round={} {}",
                        event.timestamp.to_rfc3339(),
                        event.round,
                        event.event_type.as_str()
                    );
                    if let Some(agent) = &event.agent {
                        line.push_str(&format!(" agent={}", agent));
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::recorder::RoundEventType;
    use crate::runtime::round::{AgentOutcome, RoundEntry};
    use chrono::Utc;

    fn report() -> RoundReport {
        RoundReport {
            round: 1,
            round_id: "01HZX".to_string(),
            stimulus: "Hello world".to_string(),
            started_at: Utc::now(),
            elapsed_ms: 1,
            entries: vec![
                RoundEntry {
                    agent: "KeywordBot".to_string(),
                    outcome: AgentOutcome::Completed {
                        output: "Agent says: Hi there!".to_string(),
                    },
                },
                RoundEntry {
                    agent: "EchoBot".to_string(),
                    outcome: AgentOutcome::Completed {
                        output: "Echoing: Hello world".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_text_reports() {
        let text = Exporter::new(ExportFormat::Text)
            .export_reports(&[report()])
            .unwrap();

        assert_eq!(
            text,
            "Stimulus: Hello world\nKeywordBot -> Agent says: Hi there!\nEchoBot -> Echoing: Hello world"
        );
    }

    #[test]
    fn test_json_reports_round_trip() {
        let json = Exporter::new(ExportFormat::Json)
            .export_reports(&[report()])
            .unwrap();
        let parsed: Vec<RoundReport> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0].entries, report().entries);
    }

    #[test]
    fn test_text_events() {
        let events = vec![RoundEvent::new(
            2,
            RoundEventType::AgentFailed,
            Some("Faulty".to_string()),
            serde_json::json!({"error": "boom"}),
        )];

        let text = Exporter::new(ExportFormat::Text)
            .export_events(&events)
            .unwrap();
        assert!(text.ends_with("round=2 agent_failed agent=Faulty"));
    }
}
