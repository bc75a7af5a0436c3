//! bolsar CLI - Closing data and instrument metadata from the bolsar portal.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod browser;
mod commands;
mod display;

use browser::BrowserOptions;

#[derive(Parser)]
#[command(name = "bolsar")]
#[command(about = "Closing data and instrument metadata from bolsar.info", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Browser binary location
    #[arg(short = 'b', long = "browser-binary", global = true)]
    browser_binary: Option<PathBuf>,

    /// Working directory; closing data lands in <DIR>/<YYYY-MM-DD>/
    #[arg(short = 'd', long = "directory", default_value = ".", global = true)]
    directory: PathBuf,

    /// WebDriver executable to spawn
    #[arg(long, default_value = "geckodriver", global = true)]
    driver: PathBuf,

    /// Port for the spawned WebDriver
    #[arg(long, default_value = "4444", global = true)]
    port: u16,

    /// Use an already running WebDriver instead of spawning one
    #[arg(long, global = true)]
    webdriver_url: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the closing reports of one or more trading dates
    Closing {
        /// Dates to acquire (YYYY-MM-DD). Defaults to today.
        #[arg(short = 't', long = "date", num_args = 1..)]
        dates: Vec<String>,

        /// Also save the negotiated-amounts table
        #[arg(long)]
        negotiated_amounts: bool,

        /// Seconds to wait for the report downloads of a date
        #[arg(long, default_value = "30")]
        download_timeout: u64,
    },

    /// Fetch reference metadata for instruments from the market data API
    Instruments {
        /// Instrument symbols (e.g., GGAL, YPFD)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Write the records as JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show issuer and nominal value of instruments
    Issuer {
        /// Instrument symbols
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

/// Installs the log subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let browser = BrowserOptions {
        browser_binary: cli.browser_binary,
        driver: cli.driver,
        port: cli.port,
        webdriver_url: cli.webdriver_url,
    };

    match command {
        Commands::Closing {
            dates,
            negotiated_amounts,
            download_timeout,
        } => {
            commands::closing::closing(
                &browser,
                &cli.directory,
                &dates,
                negotiated_amounts,
                download_timeout,
                cli.quiet,
            )
            .await
        }
        Commands::Instruments { symbols, output } => {
            commands::instruments::instruments(&browser, &symbols, output, cli.quiet).await
        }
        Commands::Issuer { symbols } => commands::issuer::issuer(&browser, &symbols).await,
    }
}
