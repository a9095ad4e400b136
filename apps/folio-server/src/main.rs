use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_server::{ingress, wiring};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Folio Server - profile management and AI document summaries
#[derive(Parser)]
#[command(name = "folio-server")]
#[command(about = "Folio Server - profile management and AI document summaries")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use in-memory providers with a demo session
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Folio Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args).await,
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let platform = if args.mock {
        let (platform, token) = wiring::mock_platform(&config.providers);
        tracing::warn!(
            token = token.as_str(),
            "Running with in-memory providers; use this bearer token for the demo session"
        );
        platform
    } else {
        wiring::live_platform(&config.providers)?
    };

    tracing::info!("Initializing modules...");
    let router = wiring::build_app(&config, &platform).await?;
    ingress::serve(router, &config.server).await
}

/// Validates config, provider credentials (unless `--mock`) and module sections.
async fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let platform = if args.mock {
        wiring::mock_platform(&config.providers).0
    } else {
        wiring::live_platform(&config.providers)?
    };
    wiring::build_app(&config, &platform).await?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
