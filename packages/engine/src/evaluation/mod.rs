// packages/engine/src/evaluation/mod.rs
//! Accuracy evaluation
//!
//! Runs an agent over a labeled test set, sequentially and outside of any
//! round, and scores exact string matches. There is no partial credit.

use crate::memory::SharedMemory;
use crate::runtime::agent::Agent;
use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single labeled input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// Ordered collection of test cases; evaluated in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSet {
    cases: Vec<TestCase>,
}

impl TestSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_case(&mut self, input: impl Into<String>, expected: impl Into<String>) {
        self.cases.push(TestCase {
            input: input.into(),
            expected: expected.into(),
        });
    }

    pub fn with_case(mut self, input: impl Into<String>, expected: impl Into<String>) -> Self {
        self.add_case(input, expected);
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }
}

impl<I, E> FromIterator<(I, E)> for TestSet
where
    I: Into<String>,
    E: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (I, E)>>(iter: T) -> Self {
        let mut set = TestSet::new();
        for (input, expected) in iter {
            set.add_case(input, expected);
        }
        set
    }
}

/// A case the agent got wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub input: String,
    pub expected: String,
    pub actual: String,
}

/// Outcome of evaluating an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub agent: String,
    pub total: usize,
    pub correct: usize,
    pub mismatches: Vec<Mismatch>,
}

impl EvaluationReport {
    /// `correct / total`; `total` is never zero
    pub fn accuracy(&self) -> f64 {
        self.correct as f64 / self.total as f64
    }
}

/// Run `agent` on every case and collect matches and mismatches
///
/// # Errors
///
/// [`EngineError::InvalidArgument`] for an empty test set. Agent errors are
/// returned as-is; evaluation stops at the first one.
pub fn evaluate(
    agent: &dyn Agent,
    test_set: &TestSet,
    shared: &SharedMemory,
) -> Result<EvaluationReport> {
    if test_set.is_empty() {
        return Err(EngineError::InvalidArgument(
            "cannot evaluate accuracy on an empty test set".to_string(),
        ));
    }

    let mut correct = 0;
    let mut mismatches = Vec::new();

    for case in test_set.iter() {
        let actual = agent.act(&case.input, shared)?;

        if actual == case.expected {
            correct += 1;
        } else {
            debug!(
                "Agent {} mismatch on {:?}: expected {:?}, got {:?}",
                agent.name(),
                case.input,
                case.expected,
                actual
            );
            mismatches.push(Mismatch {
                input: case.input.clone(),
                expected: case.expected.clone(),
                actual,
            });
        }
    }

    Ok(EvaluationReport {
        agent: agent.name().to_string(),
        total: test_set.len(),
        correct,
        mismatches,
    })
}

/// Fraction of cases where the agent's output equals the expected label
pub fn evaluate_accuracy(
    agent: &dyn Agent,
    test_set: &TestSet,
    shared: &SharedMemory,
) -> Result<f64> {
    Ok(evaluate(agent, test_set, shared)?.accuracy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{EchoStage, FnStage, KeywordStage, LowercaseStage};
    use crate::runtime::agent::PipelineAgent;

    fn keyword_bot() -> PipelineAgent {
        PipelineAgent::new("KeywordBot")
            .with_stage(LowercaseStage)
            .with_stage(
                KeywordStage::new()
                    .with_rule("hello", "Hi there!")
                    .with_rule("bye", "Goodbye!"),
            )
            .with_stage(EchoStage::new())
    }

    #[test]
    fn test_all_cases_match() {
        let test_set: TestSet = [
            ("hello friend", "Agent says: Hi there!"),
            ("bye everyone", "Agent says: Goodbye!"),
        ]
        .into_iter()
        .collect();

        let accuracy = evaluate_accuracy(&keyword_bot(), &test_set, &SharedMemory::new()).unwrap();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_no_cases_match() {
        let test_set = TestSet::new()
            .with_case("hello friend", "Goodbye!")
            .with_case("bye everyone", "hello");

        let accuracy = evaluate_accuracy(&keyword_bot(), &test_set, &SharedMemory::new()).unwrap();
        assert_eq!(accuracy, 0.0);
    }

    #[test]
    fn test_partial_and_mismatch_details() {
        let test_set = TestSet::new()
            .with_case("hello friend", "Agent says: Hi there!")
            .with_case("what now", "Agent says: Goodbye!");

        let report = evaluate(&keyword_bot(), &test_set, &SharedMemory::new()).unwrap();
        assert_eq!(report.accuracy(), 0.5);
        assert_eq!(report.agent, "KeywordBot");
        assert_eq!(
            report.mismatches,
            vec![Mismatch {
                input: "what now".to_string(),
                expected: "Agent says: Goodbye!".to_string(),
                actual: "Agent says: No action".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_test_set_is_invalid() {
        let result = evaluate_accuracy(&keyword_bot(), &TestSet::new(), &SharedMemory::new());
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_agent_errors_propagate() {
        let agent = PipelineAgent::new("Faulty").with_stage(FnStage::new("fail", |_, _| {
            Err(EngineError::rejected("nope"))
        }));
        let test_set = TestSet::new().with_case("x", "y");

        let result = evaluate(&agent, &test_set, &SharedMemory::new());
        assert!(matches!(result, Err(EngineError::StageFailed { .. })));
    }
}
