use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the proxy to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    // --- Upstream Agent Args ---
    /// Base URL of the demo agent service (e.g., http://localhost:8000). Requests go to <base>/api/demo-agent/
    #[arg(long = "agent-url", env = "DEMO_AGENT_API_URL")] // No default, calls fail with 502 when unset
    pub agent_url: Option<String>,

    // --- Search Route Args ---
    /// Overall deadline in seconds for a search call, retries and backoff included.
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value = "360")]
    pub search_timeout_secs: u64,

    /// Extra attempts a search makes after an upstream 5xx or network error.
    #[arg(long, env = "SEARCH_MAX_RETRIES", default_value = "2")]
    pub search_max_retries: u32,

    /// Backoff before the first search retry in milliseconds. Doubles on each further retry.
    #[arg(long, env = "INITIAL_BACKOFF_MS", default_value = "2000")]
    pub initial_backoff_ms: u64,

    // --- Chat Route Args ---
    /// Deadline in seconds for a chat call. Chat messages are never retried.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "120")]
    pub chat_timeout_secs: u64,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
