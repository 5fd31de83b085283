// packages/engine/src/pipeline/stages.rs
//! Built-in stages
//!
//! - **LowercaseStage**: preprocessing, lowercases the input
//! - **KeywordStage**: reasoning, maps the first matching keyword to a response
//! - **EchoStage**: postprocessing, prefixes the input

use crate::memory::SharedMemory;
use crate::pipeline::stage::Stage;
use crate::utils::errors::Result;
use tracing::trace;

/// Response of [`KeywordStage`] when no rule matches
pub const NO_ACTION: &str = "No action";

/// Default prefix of [`EchoStage`]
pub const DEFAULT_ECHO_PREFIX: &str = "Agent says: ";

/// Lowercases its input
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseStage;

impl Stage for LowercaseStage {
    fn name(&self) -> &str {
        "lowercase"
    }

    fn process(&self, input: &str, _memory: &SharedMemory) -> Result<String> {
        Ok(input.to_lowercase())
    }
}

/// Keyword → response rules
///
/// Keywords are lowercased when added and matched as substrings. When several
/// keywords occur in the input, the rule registered first wins.
#[derive(Debug, Clone, Default)]
pub struct KeywordStage {
    rules: Vec<(String, String)>,
}

impl KeywordStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; re-adding a keyword replaces its response but keeps its rank
    pub fn add_rule(&mut self, keyword: impl AsRef<str>, response: impl Into<String>) {
        let keyword = keyword.as_ref().to_lowercase();
        let response = response.into();

        match self.rules.iter_mut().find(|(k, _)| *k == keyword) {
            Some(rule) => rule.1 = response,
            None => self.rules.push((keyword, response)),
        }
    }

    pub fn with_rule(mut self, keyword: impl AsRef<str>, response: impl Into<String>) -> Self {
        self.add_rule(keyword, response);
        self
    }

    /// Rules in match order
    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }
}

impl Stage for KeywordStage {
    fn name(&self) -> &str {
        "keyword"
    }

    fn process(&self, input: &str, _memory: &SharedMemory) -> Result<String> {
        let matched = self
            .rules
            .iter()
            .find(|(keyword, _)| input.contains(keyword.as_str()));

        match matched {
            Some((keyword, response)) => {
                trace!("keyword '{}' matched", keyword);
                Ok(response.clone())
            }
            None => Ok(NO_ACTION.to_string()),
        }
    }
}

/// Prefixes its input
#[derive(Debug, Clone)]
pub struct EchoStage {
    prefix: String,
}

impl EchoStage {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ECHO_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EchoStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for EchoStage {
    fn name(&self) -> &str {
        "echo"
    }

    fn process(&self, input: &str, _memory: &SharedMemory) -> Result<String> {
        Ok(format!("{}{}", self.prefix, input))
    }
}
