// packages/engine/src/runtime/agent.rs
//! Agents and pipeline execution
//!
//! An agent runs its stages strictly in registration order, feeding each
//! stage's output to the next, and remembers the final output under
//! [`LAST_OUTPUT_KEY`]. Stage errors are not caught here: they propagate to
//! the round orchestrator, which isolates them from sibling agents.

use crate::memory::agent_memory::{AgentMemory, LAST_OUTPUT_KEY};
use crate::memory::SharedMemory;
use crate::pipeline::Stage;
use crate::utils::errors::{EngineError, Result};
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

/// A simulated actor that can be registered with an environment
pub trait Agent: Send + Sync {
    /// Display name, used to label round results
    fn name(&self) -> &str;

    /// Transform a stimulus, possibly reading or writing shared memory
    fn act(&self, input: &str, shared: &SharedMemory) -> Result<String>;
}

/// Agent whose behavior is an ordered pipeline of stages
pub struct PipelineAgent {
    /// Display name
    name: String,

    /// Stages in execution order
    pipeline: Vec<Box<dyn Stage>>,

    /// Private memory, never visible to other agents
    memory: AgentMemory,
}

impl PipelineAgent {
    /// Create an agent with an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: Vec::new(),
            memory: AgentMemory::new(),
        }
    }

    /// Append a stage to the end of the pipeline
    pub fn add_stage(&mut self, stage: impl Stage + 'static) {
        self.pipeline.push(Box::new(stage));
    }

    /// Builder form of [`PipelineAgent::add_stage`]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.add_stage(stage);
        self
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.pipeline.iter().map(|stage| stage.name()).collect()
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    pub fn remember(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.memory.remember(key, value);
    }

    pub fn recall(&self, key: &str) -> Option<Value> {
        self.memory.recall(key)
    }

    /// Output of the most recent successful `act`
    pub fn last_output(&self) -> Option<String> {
        self.recall(LAST_OUTPUT_KEY)
            .and_then(|value| value.as_str().map(str::to_owned))
    }
}

impl Agent for PipelineAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&self, input: &str, shared: &SharedMemory) -> Result<String> {
        debug!("Agent {} running {} stages", self.name, self.pipeline.len());

        let mut output = input.to_string();

        for (position, stage) in self.pipeline.iter().enumerate() {
            trace!("Agent {} stage #{} ({})", self.name, position, stage.name());

            output = stage
                .process(&output, shared)
                .map_err(|e| EngineError::StageFailed {
                    stage: stage.name().to_string(),
                    position,
                    source: Box::new(e),
                })?;
        }

        self.remember(LAST_OUTPUT_KEY, output.clone());
        Ok(output)
    }
}

impl fmt::Debug for PipelineAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineAgent")
            .field("name", &self.name)
            .field("pipeline", &self.stage_names())
            .finish()
    }
}
