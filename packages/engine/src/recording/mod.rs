// packages/engine/src/recording/mod.rs
//! Round event recording
//!
//! Captures the lifecycle of every round in memory so a run can be inspected
//! or exported afterwards. Nothing is persisted across process runs.
//!
//! - **Recorder**: Turns round progress into [`RoundEvent`]s
//! - **Event Queue**: Bounded lock-free MPMC queue holding the events
//! - **Exporter**: Renders reports and events as JSON or a text transcript
//!
//! # Architecture
//!
//! ```text
//! Environment::run_round → RoundRecorder::record → Lock-Free Queue
//!                                                        ↓
//!                                    drain() → Exporter (JSON / text)
//! ```

pub mod event_queue;
pub mod exporter;
pub mod recorder;

// Re-export commonly used types
pub use event_queue::{EventQueue, QueueStats};
pub use exporter::{ExportFormat, Exporter};
pub use recorder::{RoundEvent, RoundEventType, RoundRecorder};
