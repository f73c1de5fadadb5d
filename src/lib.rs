pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod proxy;
pub mod server;

use cli::Args;
use config::ProxyConfig;
use log::info;
use proxy::AgentProxy;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ProxyConfig::from_args(&args);

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!(
        "Agent Endpoint: {}",
        config.agent_endpoint.as_ref().map(|u| u.as_str()).unwrap_or("<not configured>")
    );
    info!("Search Deadline: {}s", config.search.deadline.as_secs());
    info!("Search Max Retries: {}", config.search.retry.max_retries);
    info!("Search Initial Backoff: {}ms", config.search.retry.initial_backoff.as_millis());
    info!("Chat Deadline: {}s", config.chat.deadline.as_secs());
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let proxy = Arc::new(AgentProxy::new(config));
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, proxy, args.clone());
    server.run().await?;

    Ok(())
}
