use std::process::ExitCode;

use automator::{
    ClientConfig, HttpAgentClient, Phase, RunController, RunEvent,
    render::{RenderOptions, render_plan_preview, render_results},
};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "automator")]
#[command(about = "Drive the agentic automation service from the terminal")]
struct Cli {
    /// Print the raw response body as JSON instead of rendered text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan and execute a goal, then print the findings
    Run {
        goal: String,

        /// Step budget, clamped to 3..=10
        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        max_steps: i64,

        /// Show long step text in full
        #[arg(long)]
        full_text: bool,

        /// Expand raw data blocks
        #[arg(long)]
        expand_data: bool,
    },
    /// Ask the agent for a plan without executing it
    Plan {
        goal: String,

        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        max_steps: i64,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("automator=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "automator failed");
            eprintln!("⚠️ Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> automator::Result<ExitCode> {
    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, timeout_secs = config.timeout.as_secs(), "using agent service");
    let controller = RunController::new(HttpAgentClient::new(config)?);

    match cli.command {
        Command::Run {
            goal,
            max_steps,
            full_text,
            expand_data,
        } => {
            let mut events = controller.subscribe();
            controller.set_goal(goal).await;
            controller.set_max_steps(max_steps).await;

            let phase = controller.submit().await?;
            drain_events(&mut events);

            let snapshot = controller.snapshot().await;
            match phase {
                Phase::Succeeded => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&snapshot.response)?);
                    } else if let Some(view) = snapshot.results_view() {
                        let options = RenderOptions {
                            full_text,
                            expand_data,
                        };
                        print!("{}", render_results(&view, options));
                    }
                    Ok(ExitCode::SUCCESS)
                }
                _ => {
                    let message = snapshot
                        .error
                        .unwrap_or_else(|| format!("run ended in phase {phase}"));
                    eprintln!("⚠️ Error: {message}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Plan { goal, max_steps } => {
            controller.set_goal(goal).await;
            controller.set_max_steps(max_steps).await;
            let preview = controller.preview_plan().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                print!("{}", render_plan_preview(&preview));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn drain_events(events: &mut tokio::sync::broadcast::Receiver<RunEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if event.brings_results_into_view() {
                    info!("results ready");
                }
                tracing::debug!(?event, "run event");
            }
            Err(TryRecvError::Lagged(skipped)) => tracing::debug!(skipped, "run events lagged"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
