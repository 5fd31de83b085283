// packages/engine/src/pipeline/stage.rs
//! The stage capability shared by built-in and caller-supplied stages

use crate::memory::SharedMemory;
use crate::utils::errors::Result;
use std::fmt;

/// One transformation step in an agent's pipeline
///
/// Stages are owned by a single agent but run on worker threads, hence the
/// `Send + Sync` bound. Any mutable state inside a stage must synchronize
/// itself; cross-agent communication goes through [`SharedMemory`].
pub trait Stage: Send + Sync {
    /// Display name used in logs and failure reports
    fn name(&self) -> &str;

    /// Transform `input`, optionally reading or writing shared memory
    fn process(&self, input: &str, memory: &SharedMemory) -> Result<String>;
}

/// Stage backed by a closure
pub struct FnStage<F> {
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&str, &SharedMemory) -> Result<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&str, &SharedMemory) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, input: &str, memory: &SharedMemory) -> Result<String> {
        (self.func)(input, memory)
    }
}

impl<F> fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::EngineError;

    #[test]
    fn test_fn_stage() {
        let stage = FnStage::new("echoing", |input, _| Ok(format!("Echoing: {}", input)));
        let memory = SharedMemory::new();

        assert_eq!(stage.name(), "echoing");
        assert_eq!(stage.process("hi", &memory).unwrap(), "Echoing: hi");
    }

    #[test]
    fn test_fn_stage_uses_shared_memory() {
        let stage = FnStage::new("tally", |input, memory| {
            let seen = memory.increment("tally", 1)?;
            Ok(format!("{}#{}", input, seen))
        });
        let memory = SharedMemory::new();

        stage.process("a", &memory).unwrap();
        assert_eq!(stage.process("b", &memory).unwrap(), "b#2");
    }

    #[test]
    fn test_fn_stage_error() {
        let stage = FnStage::new("refuse", |_, _| Err(EngineError::rejected("nope")));
        let result = stage.process("x", &SharedMemory::new());
        assert!(matches!(result, Err(EngineError::StageRejected(_))));
    }
}
