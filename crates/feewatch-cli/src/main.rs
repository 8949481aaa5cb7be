use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "feewatch", version, about = "Bitcoin fee watcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the background watch loop
    Watch {
        /// Seconds between fee updates
        #[arg(long, default_value_t = feewatch_core::sync::UPDATE_INTERVAL_SECS)]
        interval: u64,
        /// Run a single update cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Show the current recommended fee rates
    Fees {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current block tip height
    Height,
    /// Show the projected fee range of the next block
    NextBlock,
    /// Show settings, cache freshness and a badge preview
    Status {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Connectivity and configuration checks
    Diagnostics,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Watch { interval, once } => commands::watch::run(interval, once),
        Commands::Fees { json } => commands::fees::run(json),
        Commands::Height => commands::height::run(),
        Commands::NextBlock => commands::next_block::run(),
        Commands::Status { json } => commands::status::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Diagnostics => commands::diagnostics::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "feewatch", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
