pub mod deadline;
pub mod retry;

use log::{ debug, info, error };
use reqwest::{ Client as HttpClient, Response };

use crate::config::{ ProxyConfig, RouteSettings };
use crate::errors::ProxyError;
use crate::models::agent::{ AgentErrorBody, AgentReply, AgentRequest };
use crate::models::api::ProxyResponse;
use self::deadline::Deadline;
use self::retry::send_with_retry;

/// Which route a call came through. Decides log labels and fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    Search,
    Chat,
}

impl ProxyKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProxyKind::Search => "Search proxy",
            ProxyKind::Chat => "Chat proxy",
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            ProxyKind::Search => "Failed to process your query. Please try again.",
            ProxyKind::Chat => "Failed to process your message. Please try again.",
        }
    }
}

/// Stateless forwarder to the demo agent. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AgentProxy {
    http: HttpClient,
    config: ProxyConfig,
}

impl AgentProxy {
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_client(HttpClient::new(), config)
    }

    pub fn with_client(http: HttpClient, config: ProxyConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Forwards a search query, retrying server-side failures.
    pub async fn search(&self, query: String) -> Result<ProxyResponse, ProxyError> {
        let payload = AgentRequest::new(query, None);
        self.forward(ProxyKind::Search, self.config.search, &payload).await
    }

    /// Forwards one chat turn. Never retried.
    pub async fn send_message(
        &self,
        message: String,
        conversation_id: Option<String>
    ) -> Result<ProxyResponse, ProxyError> {
        let payload = AgentRequest::new(message, conversation_id);
        self.forward(ProxyKind::Chat, self.config.chat, &payload).await
    }

    async fn forward(
        &self,
        kind: ProxyKind,
        settings: RouteSettings,
        payload: &AgentRequest
    ) -> Result<ProxyResponse, ProxyError> {
        let deadline = Deadline::start(settings.deadline);
        let result = deadline.run(async {
            let endpoint = self.config.agent_endpoint.as_ref().ok_or(ProxyError::NotConfigured)?;
            let res = send_with_retry(
                &self.http,
                endpoint,
                payload,
                settings.retry,
                kind.label()
            ).await?;
            interpret(kind, res).await
        }).await;

        match &result {
            Ok(reply) => {
                info!(
                    "{} succeeded (conversation {})",
                    kind.label(),
                    reply.conversation_id
                        .as_ref()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                debug!("{} finished with {:?} of its deadline left", kind.label(), deadline.remaining());
            }
            Err(ProxyError::DeadlineExceeded { budget }) => {
                error!("{} timed out after {:?}", kind.label(), budget);
            }
            Err(e @ (ProxyError::TransportUnreachable(_) | ProxyError::NotConfigured)) => {
                error!("{} failed: {}", kind.label(), e);
            }
            Err(e) => {
                info!("{} returned agent error: {}", kind.label(), e);
            }
        }
        result
    }
}

/// Turns the agent's final answer into a reply or a tagged error.
async fn interpret(kind: ProxyKind, res: Response) -> Result<ProxyResponse, ProxyError> {
    let status = res.status();
    if status.is_success() {
        let reply = res.json::<AgentReply>().await?;
        return Ok(reply.into());
    }

    let message = res
        .json::<AgentErrorBody>().await
        .ok()
        .and_then(AgentErrorBody::into_message)
        .unwrap_or_else(|| kind.fallback_message().to_string());

    if status.is_server_error() {
        Err(ProxyError::UpstreamServerError { status, message })
    } else {
        Err(ProxyError::ClientRejected { status, message })
    }
}
