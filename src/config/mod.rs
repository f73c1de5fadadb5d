use crate::cli::Args;
use crate::proxy::retry::RetryPolicy;
use log::warn;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const AGENT_ROUTE: &str = "/api/demo-agent/";

pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(360);
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_SEARCH_MAX_RETRIES: u32 = 2;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(2_000);

#[derive(Debug)]
pub enum ConfigError {
    InvalidAgentUrl(String, url::ParseError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAgentUrl(raw, e) =>
                write!(f, "Invalid demo agent URL '{}': {}", raw, e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidAgentUrl(_, e) => Some(e),
        }
    }
}

/// Deadline and retry behaviour of one proxied route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSettings {
    pub deadline: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Fully resolved upstream endpoint; `None` when no base URL was configured.
    pub agent_endpoint: Option<Url>,
    pub search: RouteSettings,
    pub chat: RouteSettings,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            agent_endpoint: None,
            search: RouteSettings {
                deadline: DEFAULT_SEARCH_TIMEOUT,
                retry: RetryPolicy::new(DEFAULT_SEARCH_MAX_RETRIES, DEFAULT_INITIAL_BACKOFF),
            },
            chat: RouteSettings {
                deadline: DEFAULT_CHAT_TIMEOUT,
                retry: RetryPolicy::none(),
            },
        }
    }
}

impl ProxyConfig {
    pub fn from_args(args: &Args) -> Self {
        let agent_endpoint = match args.agent_url.as_deref() {
            Some(base) if !base.trim().is_empty() =>
                match agent_endpoint(base) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!("{}. Proxy calls will fail until it is fixed.", e);
                        None
                    }
                }
            _ => {
                warn!("DEMO_AGENT_API_URL is not set. Proxy calls will fail with 502.");
                None
            }
        };

        Self {
            agent_endpoint,
            search: RouteSettings {
                deadline: Duration::from_secs(args.search_timeout_secs),
                retry: RetryPolicy::new(
                    args.search_max_retries,
                    Duration::from_millis(args.initial_backoff_ms)
                ),
            },
            chat: RouteSettings {
                deadline: Duration::from_secs(args.chat_timeout_secs),
                retry: RetryPolicy::none(),
            },
        }
    }

    pub fn with_agent_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.agent_endpoint = Some(agent_endpoint(base)?);
        Ok(self)
    }
}

/// Resolves `<base>/api/demo-agent/`, tolerating a trailing slash on the base.
pub fn agent_endpoint(base: &str) -> Result<Url, ConfigError> {
    let base = base.trim();
    let raw = format!("{}{}", base.trim_end_matches('/'), AGENT_ROUTE);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidAgentUrl(base.to_string(), e))
}
