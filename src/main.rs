use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vantage_gateway::db::{self, SlotRepo};
use vantage_gateway::{Config, Gateway};

/// Vantage - UI context gateway for conversational CRM assistants
#[derive(Parser)]
#[command(name = "vantage", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "VANTAGE_PORT")]
    port: Option<u16>,

    /// Data directory (database location)
    #[arg(long, env = "VANTAGE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the persisted session slot
    ShowSlot {
        /// Slot name
        #[arg(default_value = "ui-context")]
        name: String,
    },
    /// Delete the persisted session slot
    ClearSlot {
        /// Slot name
        #[arg(default_value = "ui-context")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vantage_gateway=info",
        1 => "info,vantage_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir);
        std::fs::create_dir_all(data_dir)?;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::ShowSlot { name } => show_slot(&config, &name),
            Command::ClearSlot { name } => clear_slot(&config, &name),
        };
    }

    tracing::info!(
        port = config.api.port,
        data_dir = %config.data_dir.display(),
        slot = %config.store.slot_name,
        "starting vantage gateway"
    );

    let gateway = Gateway::new(config)?;
    gateway.run().await?;

    Ok(())
}

/// Print the persisted session slot
fn show_slot(config: &Config, name: &str) -> anyhow::Result<()> {
    let pool = db::init(config.db_path())?;
    let slots = SlotRepo::new(pool);

    match slots.load(name)? {
        Some(projection) => println!("{}", serde_json::to_string_pretty(&projection)?),
        None => println!("Slot '{name}' is empty"),
    }

    Ok(())
}

/// Delete the persisted session slot
fn clear_slot(config: &Config, name: &str) -> anyhow::Result<()> {
    let pool = db::init(config.db_path())?;
    let slots = SlotRepo::new(pool);

    if slots.exists(name)? {
        slots.delete(name)?;
        println!("Slot '{name}' deleted");
    } else {
        println!("Slot '{name}' is already empty");
    }

    Ok(())
}
