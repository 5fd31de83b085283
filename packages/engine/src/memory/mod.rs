// packages/engine/src/memory/mod.rs
//! Agent memory
//!
//! - **Shared Memory**: One concurrent key/value store per environment, the
//!   only state mutated by several agents at once
//! - **Agent Memory**: Private per-agent store (`remember` / `recall`)
//!
//! Values are `serde_json::Value` so agents can exchange strings, counters and
//! structured data through the same map.

pub mod agent_memory;
pub mod shared_memory;

pub use agent_memory::AgentMemory;
pub use shared_memory::SharedMemory;
