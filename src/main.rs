//! neural-core CLI
//!
//! Drives the engine advisor services from the terminal.
//!
//! # Architecture Overview
//!
//! ```text
//!   chat / chart / advice / analyze / session
//!        │
//!        ▼
//!   ┌─────────────┐     ┌──────────────────────────────┐     ┌──────────────┐
//!   │ NeuralCore  │────▶│ Gate                         │────▶│ GeminiClient │──▶ generateContent
//!   │ (prompts,   │     │  circuit check → call →      │     │ (reqwest)    │
//!   │  fallbacks) │◀────│  classify → backoff → retry  │◀────│              │
//!   └─────────────┘     └──────────────────────────────┘     └──────────────┘
//!                                 │
//!                        CircuitRegistry (one circuit per endpoint)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use neural_core::ai::GeminiClient;
use neural_core::config::load_or_default;
use neural_core::engine::TelemetrySnapshot;
use neural_core::lifecycle::{signals, Cancellation};
use neural_core::observability::{logging, metrics};
use neural_core::resilience::CircuitRegistry;
use neural_core::NeuralCore;

#[derive(Parser)]
#[command(name = "neural-core", version)]
#[command(about = "Engine advisor backed by a rate-limit aware generative AI gate", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one chat message
    Chat {
        message: String,
        /// Ground the answer with web search
        #[arg(long)]
        search: bool,
    },
    /// Generate a Highcharts config from a description
    Chart { prompt: String },
    /// One-sentence advice for a telemetry snapshot
    Advice {
        #[arg(short, long)]
        telemetry: PathBuf,
    },
    /// Deep analysis of a telemetry snapshot
    Analyze {
        #[arg(short, long)]
        telemetry: PathBuf,
    },
    /// Interactive chat; lines starting with `/chart ` request a chart
    Session {
        #[arg(long)]
        search: bool,
    },
    /// Print the effective configuration and circuit states
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        base_url = %config.ai.base_url,
        max_attempts = config.gate.max_attempts,
        base_delay_ms = config.gate.base_delay_ms,
        cooldown_ms = config.gate.cooldown_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = CircuitRegistry::new(config.gate.cooldown());
    let circuit = registry.circuit(&config.ai.base_url);

    let cancellation = Cancellation::new();
    signals::cancel_on_interrupt(cancellation.clone());

    let client = GeminiClient::from_config(&config.ai)?;
    let core = NeuralCore::from_config(Arc::new(client), circuit, &config)
        .with_cancel(cancellation.token());

    match cli.command {
        Commands::Chat { message, search } => {
            print_json(&core.chat(&message, search).await)?;
        }
        Commands::Chart { prompt } => {
            print_json(&core.generate_chart_config(&prompt).await)?;
        }
        Commands::Advice { telemetry } => {
            let snapshot = read_telemetry(&telemetry).await?;
            let advice = core
                .engine_advice(&snapshot.metrics, &snapshot.config, snapshot.status)
                .await;
            println!("{}", advice);
        }
        Commands::Analyze { telemetry } => {
            let snapshot = read_telemetry(&telemetry).await?;
            println!("{}", core.deep_analysis(&snapshot.metrics, &snapshot.config).await);
        }
        Commands::Session { search } => {
            run_session(&core, &cancellation, search).await?;
        }
        Commands::Status => {
            #[derive(Serialize)]
            struct Status<'a> {
                config: &'a neural_core::NeuralConfig,
                circuits: Vec<neural_core::resilience::CircuitSnapshot>,
            }
            print_json(&Status {
                config: &config,
                circuits: registry.snapshot(),
            })?;
        }
    }

    Ok(())
}

/// Read chat lines from stdin until EOF or interrupt; the circuit persists across lines.
async fn run_session(
    core: &NeuralCore,
    cancellation: &Cancellation,
    search: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = cancellation.token();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.strip_prefix("/chart ") {
            Some(prompt) => print_json(&core.generate_chart_config(prompt).await)?,
            None => print_json(&core.chat(line, search).await)?,
        }
    }
    Ok(())
}

async fn read_telemetry(path: &Path) -> Result<TelemetrySnapshot, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(TelemetrySnapshot::from_json(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
