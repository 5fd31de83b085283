// packages/engine/src/plugins/mod.rs
//! Agent plugins
//!
//! A plugin is a side-effecting hook applied once per agent, outside of any
//! round (see [`Environment::apply_plugin`]). It must not assume it runs
//! before or after any particular round.
//!
//! [`Environment::apply_plugin`]: crate::runtime::Environment::apply_plugin

use crate::memory::SharedMemory;
use crate::runtime::agent::Agent;
use crate::utils::errors::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Cross-cutting hook applied to agents
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Enhance one agent; errors propagate to the caller
    fn enhance(&self, agent: &dyn Agent, shared: &SharedMemory) -> Result<()>;
}

/// Logs every agent it is applied to
#[derive(Debug, Default)]
pub struct LoggingPlugin {
    applied: AtomicU64,
}

impl LoggingPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents this plugin has been applied to
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }
}

impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "logging"
    }

    fn enhance(&self, agent: &dyn Agent, _shared: &SharedMemory) -> Result<()> {
        info!("Plugin applied to agent: {}", agent.name());
        self.applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
