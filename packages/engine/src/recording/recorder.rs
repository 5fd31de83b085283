// packages/engine/src/recording/recorder.rs
//! Round event recorder
//!
//! The environment reports round progress here; events land in a bounded
//! lock-free queue and can be drained at any time. Recording never fails a
//! round: a full queue drops the event and bumps the drop counter.

use crate::recording::event_queue::{EventQueue, QueueStats};
use crate::runtime::round::{AgentOutcome, RoundEntry, RoundReport};
use crate::utils::config::RecordingConfig;
use crate::utils::errors::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;

/// Event to be recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundEvent {
    /// Unique event ID (ULID)
    pub id: String,

    /// Round number within the environment
    pub round: u64,

    /// Event type
    pub event_type: RoundEventType,

    /// Agent the event is about, if any
    pub agent: Option<String>,

    /// Wall-clock timestamp
    pub timestamp: DateTime<Utc>,

    /// Event data (JSON)
    pub data: serde_json::Value,
}

impl RoundEvent {
    pub fn new(
        round: u64,
        event_type: RoundEventType,
        agent: Option<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            round,
            event_type,
            agent,
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEventType {
    RoundStarted,
    AgentCompleted,
    AgentFailed,
    AgentTimedOut,
    AgentSkipped,
    RoundCompleted,
}

impl RoundEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundEventType::RoundStarted => "round_started",
            RoundEventType::AgentCompleted => "agent_completed",
            RoundEventType::AgentFailed => "agent_failed",
            RoundEventType::AgentTimedOut => "agent_timed_out",
            RoundEventType::AgentSkipped => "agent_skipped",
            RoundEventType::RoundCompleted => "round_completed",
        }
    }
}

/// Cloneable handle recording round events into a shared queue
#[derive(Debug, Clone)]
pub struct RoundRecorder {
    queue: Arc<EventQueue>,
}

impl RoundRecorder {
    /// Create a recorder holding at most `capacity` undrained events
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EngineError::InvalidArgument(
                "recorder capacity cannot be 0".to_string(),
            ));
        }

        info!("Initializing round recorder (capacity {})", capacity);
        Ok(Self {
            queue: EventQueue::new(capacity),
        })
    }

    pub fn from_config(config: &RecordingConfig) -> Result<Self> {
        Self::new(config.queue_capacity)
    }

    /// Record an event
    pub fn record(&self, event: RoundEvent) -> Result<()> {
        self.queue.push(event).map_err(|event| {
            warn!(
                "Round event queue full, dropping {} for round {}",
                event.event_type.as_str(),
                event.round
            );
            EngineError::RecordingFailed("Event queue full".to_string())
        })
    }

    pub fn round_started(&self, round: u64, round_id: &str, stimulus: &str, agents: usize) {
        let _ = self.record(RoundEvent::new(
            round,
            RoundEventType::RoundStarted,
            None,
            serde_json::json!({
                "round_id": round_id,
                "stimulus": stimulus,
                "agents": agents,
            }),
        ));
    }

    pub fn agent_finished(&self, round: u64, entry: &RoundEntry) {
        let (event_type, data) = match &entry.outcome {
            AgentOutcome::Completed { output } => (
                RoundEventType::AgentCompleted,
                serde_json::json!({ "output": output }),
            ),
            AgentOutcome::Failed { error } => (
                RoundEventType::AgentFailed,
                serde_json::json!({ "error": error }),
            ),
            AgentOutcome::TimedOut => (RoundEventType::AgentTimedOut, serde_json::json!({})),
            AgentOutcome::Busy => (
                RoundEventType::AgentSkipped,
                serde_json::json!({ "reason": "busy" }),
            ),
            AgentOutcome::Unscheduled => (
                RoundEventType::AgentSkipped,
                serde_json::json!({ "reason": "unscheduled" }),
            ),
        };

        let _ = self.record(RoundEvent::new(
            round,
            event_type,
            Some(entry.agent.clone()),
            data,
        ));
    }

    pub fn round_completed(&self, report: &RoundReport) {
        let _ = self.record(RoundEvent::new(
            report.round,
            RoundEventType::RoundCompleted,
            None,
            serde_json::json!({
                "round_id": report.round_id,
                "elapsed_ms": report.elapsed_ms,
                "succeeded": report.success_count(),
                "failed": report.failure_count(),
            }),
        ));
    }

    /// Take every recorded event, oldest first
    pub fn drain(&self) -> Vec<RoundEvent> {
        self.queue.drain()
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }
}
