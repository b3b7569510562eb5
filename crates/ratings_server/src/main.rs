//! Bond Ratings Gateway
//!
//! REST API serving bond credit-rating data from the terminal.

use clap::Parser;
use ratings_server::config::{build_config, CliArgs as ConfigCliArgs};
use ratings_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bond Ratings Gateway - REST API for bond credit ratings
#[derive(Parser, Debug)]
#[command(name = "ratings_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "RATINGS_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RATINGS_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RATINGS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Terminal (bridge) host
    #[arg(long, env = "BLOOMBERG_HOST")]
    bloomberg_host: Option<String>,

    /// Terminal (bridge) port
    #[arg(long, env = "BLOOMBERG_PORT")]
    bloomberg_port: Option<u16>,

    /// Failure reporting of the bond list (demo, strict)
    #[arg(long, env = "RATINGS_FAILURE_MODE")]
    failure_mode: Option<String>,

    /// Do not connect to the terminal at startup
    #[arg(long)]
    no_connect: bool,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            bloomberg_host: args.bloomberg_host,
            bloomberg_port: args.bloomberg_port,
            failure_mode: args.failure_mode,
            no_connect: args.no_connect,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Bond Ratings Gateway v{}", ratings_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        bloomberg = %format!("{}:{}", config.bloomberg_host, config.bloomberg_port),
        failure_mode = %config.failure_mode,
        batch_size = config.batch_size,
        "Server configuration loaded"
    );

    let server = Server::new(config);
    tracing::info!(address = %server.config().socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
