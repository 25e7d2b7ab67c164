//! askpanel CLI
//!
//! Launches the desktop window, the terminal UI, or runs a single query
//! from the command line.

use askpanel::{AnswerClient, AppConfig, ConfigOverrides, QueryController};
use clap::{Parser, Subcommand};
use console::style;
use crossbeam_channel::Receiver;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// askpanel - ask a question, get an answer
///
/// Sends queries to an HTTP answer service and shows the answers, one
/// request at a time, with the option to stop a request mid-flight.
#[derive(Parser)]
#[command(name = "askpanel")]
#[command(author = "askpanel Contributors")]
#[command(version)]
#[command(about = "Chat-style query panel for a remote answer service", long_about = None)]
struct Cli {
    /// JSON config file (default: askpanel.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer service endpoint, e.g. http://localhost:8000/api/ask
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the desktop window (default)
    Gui,

    /// Open the terminal UI
    Tui,

    /// Ask a single question and print the answer
    Ask {
        /// The question (use -- before it if it starts with -)
        #[arg(required = true, allow_hyphen_values = true, num_args = 1..)]
        query: Vec<String>,

        /// Print the raw {answer, meta} response as JSON
        #[arg(long)]
        json: bool,

        /// Also print the response metadata
        #[arg(long)]
        meta: bool,
    },

    /// Check that the answer service is up
    Health,
}

fn main() {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        config_path: cli.config.clone(),
        endpoint: cli.endpoint.clone(),
        timeout_secs: cli.timeout,
    };

    let result = AppConfig::load(&overrides).and_then(|config| {
        askpanel::logging::init(&config);
        askpanel::logging::separator("askpanel starting");
        tracing::info!(endpoint = %config.endpoint, timeout_secs = config.timeout_secs, "configuration loaded");
        run(cli.command.unwrap_or(Commands::Gui), &config)
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &AppConfig) -> askpanel::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = AnswerClient::new(config)?;

    match command {
        Commands::Gui => {
            let controller = QueryController::new(client, runtime.handle().clone());
            askpanel::gui::run(controller)
        }
        Commands::Tui => {
            let controller = QueryController::new(client, runtime.handle().clone());
            askpanel::tui::run(controller)
        }
        Commands::Ask { query, json, meta } => {
            let interrupts = ctrl_c_channel(&runtime);
            let controller = QueryController::new(client, runtime.handle().clone());
            cmd_ask(controller, &query.join(" "), json, meta, &interrupts)
        }
        Commands::Health => runtime.block_on(cmd_health(&client, config)),
    }
}

/// Forward Ctrl+C presses into a channel the query loop can poll
fn ctrl_c_channel(runtime: &tokio::runtime::Runtime) -> Receiver<()> {
    let (tx, rx) = crossbeam_channel::unbounded();
    runtime.spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Ask command implementation
fn cmd_ask(
    mut controller: QueryController,
    query: &str,
    as_json: bool,
    show_meta: bool,
    interrupts: &Receiver<()>,
) -> askpanel::Result<()> {
    if !controller.submit_query(query) {
        // Blank queries are silently ignored
        return Ok(());
    }

    let start = Instant::now();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Thinking\u{2026}");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut cancelled = false;
    while controller.panel().is_pending() {
        if interrupts.try_recv().is_ok() {
            cancelled = controller.cancel_query();
            break;
        }
        controller.process_messages_timeout(Duration::from_millis(50));
    }
    spinner.finish_and_clear();

    if cancelled {
        println!("{}", style("Cancelled").yellow());
        return Ok(());
    }

    let panel = controller.panel();
    if !panel.error_message().is_empty() {
        eprintln!("{} {}", style("Error:").red().bold(), panel.error_message());
        std::process::exit(1);
    }

    if as_json {
        println!(
            "{}",
            serde_json::json!({
                "answer": panel.answer(),
                "meta": panel.meta(),
            })
        );
        return Ok(());
    }

    println!("{}", panel.answer());

    if show_meta && !panel.meta().is_empty() {
        println!();
        for (key, value) in panel.meta() {
            println!(
                "  {} {}",
                style(format!("{}:", key)).bold(),
                askpanel::format_meta_value(value)
            );
        }
    }

    eprintln!(
        "{} {}",
        style("\u{2713}").green().bold(),
        style(HumanDuration(start.elapsed())).dim()
    );

    Ok(())
}

/// Health command implementation
async fn cmd_health(client: &AnswerClient, config: &AppConfig) -> askpanel::Result<()> {
    let url = config.health_url()?;
    println!("{} Probing {}", style("\u{2192}").cyan().bold(), style(&url).yellow());

    let start = Instant::now();
    let health = client.health().await?;

    let status = if health.status == "ok" {
        style(health.status.as_str()).green().bold()
    } else {
        style(health.status.as_str()).red().bold()
    };
    println!(
        "  {} {} ({} ms)",
        style("Status:").bold(),
        status,
        start.elapsed().as_millis()
    );
    if !health.timestamp.is_empty() {
        println!("  {} {}", style("Server time:").bold(), health.timestamp);
    }

    Ok(())
}
