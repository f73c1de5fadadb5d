use log::warn;
use reqwest::{ Client as HttpClient, Response };
use std::time::Duration;
use url::Url;

use crate::errors::ProxyError;
use crate::models::agent::AgentRequest;

/// How many extra attempts a route makes, and how long it waits before the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self { max_retries, initial_backoff }
    }

    /// Exactly one attempt.
    pub const fn none() -> Self {
        Self { max_retries: 0, initial_backoff: Duration::ZERO }
    }

    /// Wait before the retry that follows the zero-based `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Posts `payload` to the agent, retrying 5xx answers and transport failures.
///
/// 4xx answers return immediately. Once retries run out the last response is
/// returned as-is (or the last transport error), leaving interpretation to the
/// caller. Attempts are strictly sequential. The caller's deadline aborts the
/// loop by dropping this future.
pub async fn send_with_retry(
    http: &HttpClient,
    endpoint: &Url,
    payload: &AgentRequest,
    policy: RetryPolicy,
    label: &str
) -> Result<Response, ProxyError> {
    let mut attempt = 0;
    loop {
        match http.post(endpoint.clone()).json(payload).send().await {
            Ok(res) => {
                let status = res.status();
                if !status.is_server_error() || attempt >= policy.max_retries {
                    return Ok(res);
                }
                let backoff = policy.backoff_for(attempt);
                warn!(
                    "{} attempt {}/{} got {} from agent, retrying in {}ms",
                    label,
                    attempt + 1,
                    policy.max_retries.saturating_add(1),
                    status,
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                if attempt >= policy.max_retries {
                    return Err(ProxyError::TransportUnreachable(e));
                }
                let backoff = policy.backoff_for(attempt);
                warn!(
                    "{} attempt {}/{} failed to reach agent: {}. Retrying in {}ms",
                    label,
                    attempt + 1,
                    policy.max_retries.saturating_add(1),
                    e,
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
            }
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{ method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(10))
    }

    fn endpoint_for(server: &MockServer) -> Url {
        Url::parse(&format!("{}/api/demo-agent/", server.uri())).unwrap()
    }

    #[test]
    fn backoff_doubles_from_initial() {
        let policy = RetryPolicy::new(2, Duration::from_millis(2_000));
        assert_eq!(policy.backoff_for(0), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(8_000));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert!(policy.backoff_for(64) >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn server_errors_use_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/demo-agent/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server).await;

        let res = send_with_retry(
            &HttpClient::new(),
            &endpoint_for(&server),
            &AgentRequest::new("q".into(), None),
            fast_policy(2),
            "test"
        ).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server).await;

        let res = send_with_retry(
            &HttpClient::new(),
            &endpoint_for(&server),
            &AgentRequest::new("q".into(), None),
            fast_policy(2),
            "test"
        ).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn zero_retry_policy_makes_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server).await;

        let res = send_with_retry(
            &HttpClient::new(),
            &endpoint_for(&server),
            &AgentRequest::new("q".into(), None),
            RetryPolicy::none(),
            "test"
        ).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn transport_errors_surface_after_last_attempt() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let endpoint = Url::parse(&format!("http://{}/api/demo-agent/", addr)).unwrap();

        let result = send_with_retry(
            &HttpClient::new(),
            &endpoint,
            &AgentRequest::new("q".into(), None),
            fast_policy(1),
            "test"
        ).await;
        assert!(matches!(result, Err(ProxyError::TransportUnreachable(_))));
    }
}
