use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use camera_alarm_bridge::backend::ShinobiClient;
use camera_alarm_bridge::config::{AppConfig, ServerConfig, DEFAULT_PORT};
use camera_alarm_bridge::dispatch::EventDispatcher;
use camera_alarm_bridge::{net, telemetry};

#[derive(Parser, Debug)]
#[command(about = "Forward IP camera alarm-server motion events to Shinobi")]
struct Args {
    /// The address to listen on; empty means all interfaces
    #[arg(long, default_value = "")]
    addr: String,
    /// The port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// The backend config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Log everything at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.verbose);

    info!("🚀 Starting camera alarm bridge...");

    let config = AppConfig::load(&args.config)?;
    info!("⚙️ Configuration loaded from {}", args.config.display());

    let backend =
        ShinobiClient::new(config.shinobi.clone()).context("failed to build backend client")?;
    let dispatcher = EventDispatcher::new(Arc::new(backend));

    let server = ServerConfig {
        addr: args.addr,
        port: args.port,
    };
    let listener = net::bind_listener(&server).await?;

    net::accept_loop(listener, dispatcher).await;
    Ok(())
}
