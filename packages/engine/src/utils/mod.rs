// packages/engine/src/utils/mod.rs
//! Common utilities shared by every engine module
//!
//! - **errors**: The engine-wide error type and `Result` alias
//! - **config**: Layered configuration (file + environment variables)

pub mod config;
pub mod errors;

pub use config::{EngineConfig, ObservabilityConfig, RecordingConfig, RuntimeConfig};
pub use errors::{EngineError, Result};
