// packages/engine/src/runtime/round.rs
//! Round results
//!
//! A [`RoundReport`] holds exactly one [`RoundEntry`] per registered agent,
//! in registration order, whatever order the agents finished in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one agent during a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// The pipeline ran to completion
    Completed { output: String },

    /// A stage returned an error or panicked
    Failed { error: String },

    /// The round deadline passed before the pipeline finished
    TimedOut,

    /// The agent was still running a previous round and was not invoked
    Busy,

    /// No worker became free before the round deadline; the pipeline never ran
    Unscheduled,
}

impl AgentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AgentOutcome::Completed { .. })
    }

    /// Pipeline output, if the agent completed
    pub fn output(&self) -> Option<&str> {
        match self {
            AgentOutcome::Completed { output } => Some(output),
            _ => None,
        }
    }

    /// Failure reason, if the agent did not complete
    pub fn error(&self) -> Option<String> {
        match self {
            AgentOutcome::Completed { .. } => None,
            AgentOutcome::Failed { error } => Some(error.clone()),
            AgentOutcome::TimedOut => Some("timed out".to_string()),
            AgentOutcome::Busy => Some("still running a previous round".to_string()),
            AgentOutcome::Unscheduled => {
                Some("no free worker before the round deadline".to_string())
            }
        }
    }
}

impl fmt::Display for AgentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.output(), self.error()) {
            (Some(output), _) => write!(f, "{}", output),
            (None, Some(error)) => write!(f, "ERROR: {}", error),
            (None, None) => Ok(()),
        }
    }
}

/// One agent's line in a round report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntry {
    /// Agent display name
    pub agent: String,

    /// Result of the agent's pipeline
    pub outcome: AgentOutcome,
}

impl fmt::Display for RoundEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.agent, self.outcome)
    }
}

/// Results of one round, in agent registration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1 for each environment
    pub round: u64,

    /// Unique round ID (ULID)
    pub round_id: String,

    /// Stimulus every agent received
    pub stimulus: String,

    /// When the round was scheduled
    pub started_at: DateTime<Utc>,

    /// Wall-clock time until the barrier resolved (milliseconds)
    pub elapsed_ms: u64,

    /// One entry per registered agent
    pub entries: Vec<RoundEntry>,
}

impl RoundReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of the first agent registered under `name`
    pub fn entry(&self, name: &str) -> Option<&RoundEntry> {
        self.entries.iter().find(|entry| entry.agent == name)
    }

    /// Agent names in report order
    pub fn agents(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.agent.as_str()).collect()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// `"<agent> -> <result>"` lines
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RoundReport {
        RoundReport {
            round: 1,
            round_id: "01HZX".to_string(),
            stimulus: "Hello world".to_string(),
            started_at: Utc::now(),
            elapsed_ms: 3,
            entries: vec![
                RoundEntry {
                    agent: "KeywordBot".to_string(),
                    outcome: AgentOutcome::Completed {
                        output: "Agent says: Hi there!".to_string(),
                    },
                },
                RoundEntry {
                    agent: "Faulty".to_string(),
                    outcome: AgentOutcome::Failed {
                        error: "boom".to_string(),
                    },
                },
                RoundEntry {
                    agent: "Slow".to_string(),
                    outcome: AgentOutcome::TimedOut,
                },
            ],
        }
    }

    #[test]
    fn test_lines() {
        assert_eq!(
            report().lines(),
            vec![
                "KeywordBot -> Agent says: Hi there!",
                "Faulty -> ERROR: boom",
                "Slow -> ERROR: timed out",
            ]
        );
    }

    #[test]
    fn test_counts_and_lookup() {
        let report = report();
        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.agents(), vec!["KeywordBot", "Faulty", "Slow"]);
        assert_eq!(
            report.entry("KeywordBot").and_then(|e| e.outcome.output()),
            Some("Agent says: Hi there!")
        );
        assert!(report.entry("Missing").is_none());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(AgentOutcome::Busy).unwrap();
        assert_eq!(json, serde_json::json!({"status": "busy"}));

        let json = serde_json::to_value(AgentOutcome::Unscheduled).unwrap();
        assert_eq!(json, serde_json::json!({"status": "unscheduled"}));
        assert_eq!(
            AgentOutcome::Unscheduled.to_string(),
            "ERROR: no free worker before the round deadline"
        );

        let json = serde_json::to_value(AgentOutcome::Completed {
            output: "x".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "completed", "output": "x"}));
    }

    #[test]
    fn test_display_joins_lines() {
        let text = report().to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("KeywordBot -> "));
    }
}
