use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_scaffold::lifecycle::{prepare_config, StartupOptions};
use api_scaffold::observability::{self, Logger};
use api_scaffold::HttpServer;

#[derive(Parser)]
#[command(name = "api-scaffold")]
#[command(about = "HTTP API server with a uniform request pipeline", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, env = "APP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = prepare_config(&StartupOptions {
        config_path: cli.config,
        port: cli.port,
    })?;

    observability::init(&config.logging);

    Logger::info(
        "system",
        format_args!("{} v{} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );
    Logger::mysql("system", format_args!("{:?}", config.mysql));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config);
    server.run(listener).await?;

    Logger::info("system", "shutdown complete");
    Ok(())
}
