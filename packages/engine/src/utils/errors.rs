// packages/engine/src/utils/errors.rs
//! Engine error types
//!
//! Failures raised inside a single agent's pipeline ([`EngineError::StageFailed`],
//! [`EngineError::AgentPanicked`]) are captured per agent by the round
//! orchestrator and never abort a round. Everything else is surfaced directly
//! to the caller.

use thiserror::Error;

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// A stage refused or failed to transform its input
    #[error("stage rejected input: {0}")]
    StageRejected(String),

    /// A stage failed while an agent was running its pipeline
    #[error("stage '{stage}' (position {position}) failed: {source}")]
    StageFailed {
        /// Name of the failing stage
        stage: String,

        /// Zero-based index of the stage in the pipeline
        position: usize,

        /// The error raised by the stage
        #[source]
        source: Box<EngineError>,
    },

    /// An agent's pipeline panicked on its worker thread
    #[error("agent panicked: {0}")]
    AgentPanicked(String),

    /// The caller supplied an argument the engine cannot work with
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The worker pool was shut down before the round could be scheduled
    #[error("worker pool is closed")]
    WorkerPoolClosed,

    /// A pool job was cancelled before it got a worker
    #[error("job cancelled before it started")]
    JobCancelled,

    /// Configuration could not be loaded or is malformed
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Tracing or metrics could not be installed
    #[error("observability error: {0}")]
    ObservabilityError(String),

    /// A round event could not be recorded
    #[error("recording failed: {0}")]
    RecordingFailed(String),

    /// A report or event transcript could not be rendered
    #[error("export failed: {0}")]
    ExportFailed(String),
}

impl EngineError {
    /// Shorthand for stages that reject their input
    pub fn rejected(message: impl Into<String>) -> Self {
        EngineError::StageRejected(message.into())
    }

    /// Whether this error originated inside an agent's pipeline
    pub fn is_agent_failure(&self) -> bool {
        matches!(
            self,
            EngineError::StageRejected(_)
                | EngineError::StageFailed { .. }
                | EngineError::AgentPanicked(_)
        )
    }
}

impl From<::config::ConfigError> for EngineError {
    fn from(err: ::config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ExportFailed(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_message() {
        let err = EngineError::StageFailed {
            stage: "keyword".to_string(),
            position: 1,
            source: Box::new(EngineError::rejected("no rules")),
        };
        assert_eq!(
            err.to_string(),
            "stage 'keyword' (position 1) failed: stage rejected input: no rules"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_agent_failure_classification() {
        assert!(EngineError::rejected("x").is_agent_failure());
        assert!(EngineError::AgentPanicked("boom".into()).is_agent_failure());
        assert!(!EngineError::WorkerPoolClosed.is_agent_failure());
        assert!(!EngineError::InvalidArgument("empty".into()).is_agent_failure());
    }
}
