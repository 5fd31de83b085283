// packages/engine/src/lib.rs
//! Swarmlab Simulation Engine Library
//!
//! Simulates a population of agents, each transforming a stimulus through an
//! ordered pipeline of stages while sharing one concurrent memory store.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **memory**: Shared and per-agent key/value stores
//! - **pipeline**: The stage capability and built-in stages
//! - **runtime**: Agents, worker pool and concurrent round orchestration
//! - **evaluation**: Accuracy scoring against labeled test sets
//! - **plugins**: Hooks applied to agents outside of rounds
//! - **recording**: In-memory round event capture and export
//! - **observability**: Tracing and metrics setup
//! - **utils**: Errors and configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swarmlab_engine::pipeline::{EchoStage, KeywordStage, LowercaseStage};
//! use swarmlab_engine::{Environment, PipelineAgent};
//!
//! # async fn demo() -> swarmlab_engine::Result<()> {
//! let mut env = Environment::new();
//! env.add_agent(Arc::new(
//!     PipelineAgent::new("KeywordBot")
//!         .with_stage(LowercaseStage)
//!         .with_stage(KeywordStage::new().with_rule("hello", "Hi there!"))
//!         .with_stage(EchoStage::new()),
//! ));
//!
//! let report = env.run_round("Hello world").await?;
//! assert_eq!(report.lines(), vec!["KeywordBot -> Agent says: Hi there!"]);
//! # Ok(())
//! # }
//! ```

// Public module exports
pub mod evaluation;
pub mod memory;
pub mod observability;
pub mod pipeline;
pub mod plugins;
pub mod recording;
pub mod runtime;
pub mod utils;

// Re-export commonly used types
pub use memory::SharedMemory;
pub use runtime::agent::{Agent, PipelineAgent};
pub use runtime::environment::Environment;
pub use runtime::round::{AgentOutcome, RoundReport};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}
