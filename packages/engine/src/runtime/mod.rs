// packages/engine/src/runtime/mod.rs
//! Agent execution runtime
//!
//! This module provides the round-execution engine:
//!
//! - **Agent**: Pipeline execution for a single agent
//! - **Worker Pool**: Bounded pool running pipelines on blocking threads
//! - **Environment**: Concurrent rounds with a completion barrier
//! - **Round**: Per-round reports, ordered by agent registration
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── Environment ────────────────────────┐
//! │  agents: [KeywordBot, EchoBot, ...]   shared: SharedMemory   │
//! │                                                              │
//! │  run_round(stimulus)                                         │
//! │     │                                                        │
//! │     ├─→ job(KeywordBot.act) ─┐                               │
//! │     ├─→ job(EchoBot.act)    ─┼─→ Worker Pool (bounded)       │
//! │     └─→ job(...)            ─┘         │                     │
//! │                                        ▼                     │
//! │                 barrier: await all, registration order       │
//! │                                        │                     │
//! │                                   RoundReport                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod environment;
pub mod round;
pub mod worker_pool;

// Re-export commonly used types
pub use agent::{Agent, PipelineAgent};
pub use environment::Environment;
pub use round::{AgentOutcome, RoundEntry, RoundReport};
pub use worker_pool::{Job, PoolStats, WorkerPool};
