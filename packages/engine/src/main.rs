// packages/engine/src/main.rs
//! Swarmlab Simulation Engine
//!
//! Demo driver: wires a keyword bot and an echo bot into one environment,
//! runs a fixed list of stimuli, scores the keyword bot and exercises the
//! plugin and shared-memory surfaces.

use anyhow::Result;
use std::sync::Arc;
use swarmlab_engine::evaluation::{evaluate_accuracy, TestSet};
use swarmlab_engine::observability::{init_metrics, init_tracing};
use swarmlab_engine::pipeline::{EchoStage, FnStage, KeywordStage, LowercaseStage};
use swarmlab_engine::plugins::LoggingPlugin;
use swarmlab_engine::recording::{ExportFormat, Exporter, RoundRecorder};
use swarmlab_engine::{BuildInfo, EngineConfig, Environment, PipelineAgent};
use tracing::{debug, info};

const STIMULI: [&str; 3] = ["Hello world", "Random message", "Bye now"];

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so the configured level applies
    let config = EngineConfig::load()?;
    init_tracing(&config.observability)?;

    let metrics = if config.observability.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    let build = BuildInfo::current();
    info!(
        "Starting Swarmlab Simulation Engine v{} ({}, {})",
        build.version, build.git_hash, build.rustc_version
    );
    debug!("Configuration loaded: {:?}", config);

    let mut env = Environment::with_config(config.runtime.clone())?;
    if config.recording.enabled {
        env = env.with_recorder(RoundRecorder::from_config(&config.recording)?);
    }

    // Agent 1: keyword-based
    let keyword_bot = Arc::new(
        PipelineAgent::new("KeywordBot")
            .with_stage(LowercaseStage)
            .with_stage(
                KeywordStage::new()
                    .with_rule("hello", "Hi there!")
                    .with_rule("bye", "Goodbye!"),
            )
            .with_stage(EchoStage::new()),
    );

    // Agent 2: functional echo
    let echo_bot = Arc::new(PipelineAgent::new("EchoBot").with_stage(FnStage::new(
        "echoing",
        |input, _| Ok(format!("Echoing: {}", input)),
    )));

    env.add_agent(Arc::clone(&keyword_bot));
    env.add_agent(Arc::clone(&echo_bot));

    for stimulus in STIMULI {
        println!("\nStimulus: {}", stimulus);
        let report = env.run_round(stimulus).await?;
        for line in report.lines() {
            println!("{}", line);
        }
    }

    // Evaluation
    let test_set = TestSet::new()
        .with_case("hello friend", "Agent says: Hi there!")
        .with_case("bye everyone", "Agent says: Goodbye!");
    let accuracy = evaluate_accuracy(keyword_bot.as_ref(), &test_set, env.shared_memory())?;
    println!("\nKeywordBot accuracy: {:?}", accuracy);

    // Plugin
    let plugin = LoggingPlugin::new();
    env.apply_plugin(&plugin)?;
    info!("Logging plugin applied to {} agents", plugin.applied());

    // Agents can communicate via shared memory
    env.shared_memory()
        .put("announcement", "System update available");
    let announcement = env
        .shared_memory()
        .get("announcement")
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    println!("\nShared memory message for agents: {}", announcement);

    if let Some(recorder) = env.recorder() {
        let events = recorder.drain();
        info!("Recorded {} round events", events.len());
        debug!("{}", Exporter::new(ExportFormat::Json).export_events(&events)?);
    }

    if let Some(handle) = metrics {
        debug!("Metrics:\n{}", handle.render());
    }

    env.shutdown();
    Ok(())
}
