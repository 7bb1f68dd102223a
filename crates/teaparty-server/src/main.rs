//! Teaparty server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port with the default banner
//! teaparty-server
//!
//! # Custom bind address and server name
//! teaparty-server --bind 0.0.0.0:5005 --server-name TestChat
//! ```

use clap::Parser;
use teaparty_server::{ChatConfig, Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Teaparty chat server
#[derive(Parser, Debug)]
#[command(name = "teaparty-server")]
#[command(about = "Line-oriented multi-room chat server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:5005")]
    bind: String,

    /// Server name shown in the welcome banner
    #[arg(short = 'n', long, default_value = "TeaParty")]
    server_name: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "10000")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("teaparty server starting");
    tracing::info!("binding to {}", args.bind);

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        chat: ChatConfig { server_name: args.server_name, max_connections: args.max_connections },
    };

    let server = Server::bind(config).await?;

    server.run().await?;

    Ok(())
}
