mod budget_cmd;
mod config;
mod event_cmds;
mod format;
mod parse;
mod serve_cmd;
mod staff_cmd;
mod summary_cmds;
#[cfg(test)]
mod test_util;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use planner_core::{JsonFileStore, PlannerService, RandomIdGenerator};

use config::PlannerConfig;

#[derive(Parser)]
#[command(name = "planner", about = "Event budget planner")]
struct Cli {
    /// Path of the JSON data file (overrides PLANNER_DATA_FILE env var)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a planner config file (use --data-file to pin the data file)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Event management
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Budget line items
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Staff assignments
    Staff {
        #[command(subcommand)]
        command: StaffCommands,
    },
    /// Budget summaries
    Summary {
        #[command(subcommand)]
        command: SummaryCommands,
    },
    /// Serve the JSON API and HTML dashboard
    Serve {
        /// Address to bind (defaults to the config file, then 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (defaults to the config file, then 8080)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Create a new event
    Create {
        /// Event name
        #[arg(long)]
        name: String,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Venue
        #[arg(long, default_value = "")]
        venue: String,
        /// Target budget
        #[arg(long)]
        budget: String,
        /// Three-letter currency code
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// List all events
    List,
    /// Show an event with its budget items and staff
    Details {
        /// Event ID
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Add a budget line item to an event
    Add {
        /// Event ID
        #[arg(long)]
        event_id: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Amount in the event's currency
        #[arg(long)]
        amount: String,
        /// planned, committed or paid
        #[arg(long, default_value = "planned")]
        status: String,
    },
}

#[derive(Subcommand)]
pub enum StaffCommands {
    /// Assign a staff member to an event
    Add {
        /// Event ID
        #[arg(long)]
        event_id: String,
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        role: String,
        /// Hourly rate
        #[arg(long)]
        rate: String,
        /// Hours booked
        #[arg(long)]
        hours: String,
    },
}

#[derive(Subcommand)]
pub enum SummaryCommands {
    /// Budget rollup for one event
    Event {
        /// Event ID
        #[arg(long)]
        id: String,
    },
    /// Budget rollup across every event
    Portfolio,
}

fn cmd_init(data_file: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let data_file = data_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_DATA_FILE));

    let cfg = config::ConfigFile {
        storage: config::StorageSection {
            data_file: Some(data_file.clone()),
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  storage.data_file = {}", data_file.display());
    println!("  server = {}:{}", cfg.server.bind, cfg.server.port);

    Ok(())
}

/// Build a service over the JSON data file at `path`.
fn open_service(path: &Path) -> Arc<PlannerService> {
    Arc::new(PlannerService::new(
        Arc::new(JsonFileStore::new(path)),
        Arc::new(RandomIdGenerator),
    ))
}

/// Token cancelled when the process receives Ctrl+C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}

/// Resolved configuration plus a service over its data file.
fn open(cli_data_file: Option<PathBuf>) -> anyhow::Result<(PlannerConfig, Arc<PlannerService>)> {
    let resolved = PlannerConfig::resolve(cli_data_file)?;
    tracing::debug!(data_file = %resolved.data_file.display(), "resolved data file");
    let service = open_service(&resolved.data_file);
    Ok((resolved, service))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.data_file.as_deref(), force)?;
        }
        Commands::Event { command } => {
            let (_, service) = open(cli.data_file)?;
            let mut out = std::io::stdout().lock();
            event_cmds::run_event_command(command, &service, &cancel, &mut out).await?;
        }
        Commands::Budget { command } => {
            let (_, service) = open(cli.data_file)?;
            let mut out = std::io::stdout().lock();
            budget_cmd::run_budget_command(command, &service, &cancel, &mut out).await?;
        }
        Commands::Staff { command } => {
            let (_, service) = open(cli.data_file)?;
            let mut out = std::io::stdout().lock();
            staff_cmd::run_staff_command(command, &service, &cancel, &mut out).await?;
        }
        Commands::Summary { command } => {
            let (_, service) = open(cli.data_file)?;
            let mut out = std::io::stdout().lock();
            summary_cmds::run_summary_command(command, &service, &cancel, &mut out).await?;
        }
        Commands::Serve { bind, port } => {
            let (resolved, service) = open(cli.data_file)?;
            let bind = bind.unwrap_or(resolved.bind);
            let port = port.unwrap_or(resolved.port);
            serve_cmd::run_serve(service, &bind, port, cancel).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep table output clean unless the server is running.
    let default_filter = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
