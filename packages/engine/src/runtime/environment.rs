// packages/engine/src/runtime/environment.rs
//! Round orchestration
//!
//! An [`Environment`] binds an ordered set of agents to one [`SharedMemory`]
//! and runs them against stimuli, one round at a time.
//!
//! # Round lifecycle
//!
//! ```text
//! run_round(stimulus)
//! ├─ schedule: one pool job per agent, registration order
//! ├─ barrier:  await every job (single round deadline, if configured)
//! └─ collect:  RoundReport entries in registration order
//! ```
//!
//! A failing, panicking or timed-out agent only affects its own entry. An
//! agent whose previous `act` is still running (after a timeout) is reported
//! as busy instead of being invoked a second time.
//!
//! The round deadline covers queueing for a worker too. Jobs still waiting
//! for a worker when it passes are cancelled and reported as unscheduled, so
//! no pipeline of a finished round starts later. Only pipelines that already
//! started (and timed out) outlive the round.

use crate::memory::SharedMemory;
use crate::plugins::Plugin;
use crate::recording::RoundRecorder;
use crate::runtime::agent::Agent;
use crate::runtime::round::{AgentOutcome, RoundEntry, RoundReport};
use crate::runtime::worker_pool::{Job, PoolStats, WorkerPool};
use crate::utils::config::RuntimeConfig;
use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// A registered agent plus its in-flight marker
struct AgentSlot {
    agent: Arc<dyn Agent>,
    in_flight: Arc<AtomicBool>,
}

/// Clears an agent's in-flight marker when its `act` returns
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum Pending {
    Running(Job<String>),
    Skipped,
}

/// Execution context for a fixed, append-only set of agents
pub struct Environment {
    /// Runtime configuration
    config: RuntimeConfig,

    /// Registered agents, in registration order
    agents: Vec<AgentSlot>,

    /// Memory shared by every agent
    shared: SharedMemory,

    /// Workers executing agent pipelines
    pool: WorkerPool,

    /// Optional round event recorder
    recorder: Option<RoundRecorder>,

    /// Number of rounds run so far
    rounds_completed: u64,
}

impl Environment {
    /// Create an environment with the default runtime configuration
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            agents: Vec::new(),
            shared: SharedMemory::new(),
            pool: WorkerPool::default(),
            recorder: None,
            rounds_completed: 0,
        }
    }

    /// Create an environment with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.max_concurrent_agents)?;

        Ok(Self {
            config,
            agents: Vec::new(),
            shared: SharedMemory::new(),
            pool,
            recorder: None,
            rounds_completed: 0,
        })
    }

    /// Record round events into `recorder`
    pub fn with_recorder(mut self, recorder: RoundRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Register an agent; rounds report agents in registration order
    pub fn add_agent<A: Agent + 'static>(&mut self, agent: Arc<A>) {
        let agent: Arc<dyn Agent> = agent;
        debug!("Registering agent #{}: {}", self.agents.len(), agent.name());

        self.agents.push(AgentSlot {
            agent,
            in_flight: Arc::new(AtomicBool::new(false)),
        });
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Registered agents, in registration order
    pub fn agents(&self) -> impl Iterator<Item = &Arc<dyn Agent>> + '_ {
        self.agents.iter().map(|slot| &slot.agent)
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|slot| slot.agent.name()).collect()
    }

    /// Shared memory of this environment
    pub fn shared_memory(&self) -> &SharedMemory {
        &self.shared
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    pub fn recorder(&self) -> Option<&RoundRecorder> {
        self.recorder.as_ref()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Run every agent concurrently on `stimulus` and wait for all of them
    ///
    /// The report holds one entry per registered agent, in registration
    /// order. Per-agent failures are reported in their entry; the only error
    /// returned here is [`EngineError::WorkerPoolClosed`].
    pub async fn run_round(&mut self, stimulus: impl Into<String>) -> Result<RoundReport> {
        if self.pool.is_closed() {
            return Err(EngineError::WorkerPoolClosed);
        }

        let stimulus = stimulus.into();
        let round = self.rounds_completed + 1;
        let round_id = Ulid::new().to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = self
            .config
            .round_timeout()
            .map(|timeout| tokio::time::Instant::now() + timeout);

        info!(
            "Round {} started with {} agents: {:?}",
            round,
            self.agents.len(),
            stimulus
        );

        if let Some(recorder) = &self.recorder {
            recorder.round_started(round, &round_id, &stimulus, self.agents.len());
        }

        // Schedule one job per agent
        let mut pending = Vec::with_capacity(self.agents.len());

        for slot in &self.agents {
            let Some(guard) = InFlightGuard::claim(&slot.in_flight) else {
                warn!(
                    "Agent {} is still running a previous round, skipping",
                    slot.agent.name()
                );
                pending.push(Pending::Skipped);
                continue;
            };

            let agent = Arc::clone(&slot.agent);
            let shared = self.shared.clone();
            let input = stimulus.clone();

            let job = self.pool.spawn(move || {
                let _guard = guard;
                agent.act(&input, &shared)
            })?;

            metrics::counter!("swarmlab_agent_runs_total").increment(1);
            pending.push(Pending::Running(job));
        }

        // Barrier: resolve every job, collecting in registration order
        let mut entries = Vec::with_capacity(pending.len());

        for (slot, task) in self.agents.iter().zip(pending) {
            let name = slot.agent.name();
            let outcome = match task {
                Pending::Skipped => AgentOutcome::Busy,
                Pending::Running(job) => Self::resolve(name, job, deadline).await,
            };

            if let Some(reason) = failure_label(&outcome) {
                metrics::counter!("swarmlab_agent_failures_total", "reason" => reason)
                    .increment(1);
            }

            let entry = RoundEntry {
                agent: name.to_string(),
                outcome,
            };

            if let Some(recorder) = &self.recorder {
                recorder.agent_finished(round, &entry);
            }

            entries.push(entry);
        }

        let elapsed = start.elapsed();
        self.rounds_completed = round;

        let report = RoundReport {
            round,
            round_id,
            stimulus,
            started_at,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            entries,
        };

        if let Some(recorder) = &self.recorder {
            recorder.round_completed(&report);
        }

        metrics::counter!("swarmlab_rounds_total").increment(1);
        metrics::histogram!("swarmlab_round_duration_seconds").record(elapsed.as_secs_f64());

        info!(
            "Round {} completed in {:?}: {}/{} agents succeeded",
            round,
            elapsed,
            report.success_count(),
            report.len()
        );

        Ok(report)
    }

    /// Run one round per stimulus, in order, each fully resolved before the next
    pub async fn run_rounds<I, S>(&mut self, stimuli: I) -> Result<Vec<RoundReport>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut reports = Vec::new();

        for stimulus in stimuli {
            reports.push(self.run_round(stimulus).await?);
        }

        Ok(reports)
    }

    /// Invoke `plugin` once per agent, in registration order, outside any round
    pub fn apply_plugin(&self, plugin: &dyn Plugin) -> Result<()> {
        debug!("Applying plugin {} to {} agents", plugin.name(), self.agents.len());

        for slot in &self.agents {
            plugin.enhance(slot.agent.as_ref(), &self.shared)?;
        }

        Ok(())
    }

    /// Close the worker pool; later rounds fail with `WorkerPoolClosed`
    pub fn shutdown(&self) {
        info!("Shutting down environment");
        self.pool.shutdown();
    }

    async fn resolve(
        name: &str,
        mut job: Job<String>,
        deadline: Option<tokio::time::Instant>,
    ) -> AgentOutcome {
        let result = match deadline {
            Some(deadline) => {
                let waited = tokio::time::timeout_at(deadline, &mut job).await;

                match waited {
                    Ok(result) => result,
                    Err(_) if job.cancel_if_queued() => {
                        warn!("Agent {} got no worker before the round deadline", name);
                        return AgentOutcome::Unscheduled;
                    }
                    Err(_) => {
                        warn!("Agent {} timed out", name);
                        return AgentOutcome::TimedOut;
                    }
                }
            }
            None => job.await,
        };

        match result {
            Ok(output) => {
                debug!("Agent {} completed", name);
                AgentOutcome::Completed { output }
            }
            Err(e) => {
                warn!("Agent {} failed: {}", name, e);
                AgentOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.pool.shutdown();
    }
}

fn failure_label(outcome: &AgentOutcome) -> Option<&'static str> {
    match outcome {
        AgentOutcome::Completed { .. } => None,
        AgentOutcome::Failed { .. } => Some("failed"),
        AgentOutcome::TimedOut => Some("timeout"),
        AgentOutcome::Busy => Some("busy"),
        AgentOutcome::Unscheduled => Some("unscheduled"),
    }
}
