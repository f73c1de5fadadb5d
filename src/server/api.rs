use crate::cli::Args;
use crate::errors::ProxyError;
use crate::models::api::{ ChatRequest, ProxyResponse, SearchRequest };
use crate::proxy::AgentProxy;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    extract::{ State, rejection::JsonRejection },
    Json,
};
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<AgentProxy>,
}

pub fn router(proxy: Arc<AgentProxy>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/chat", post(chat_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(AppState { proxy })
}

pub async fn start_http_server(
    addr: SocketAddr,
    proxy: Arc<AgentProxy>,
    args: Args
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(proxy);

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            (Some(_), None) | (None, Some(_)) => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("Missing TLS certificate or key path".into());
            }
            (None, None) => {
                error!("--enable-tls was set but no certificate/key paths provided.");
                return Err("TLS enabled without cert/key".into());
            }
        };
        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("HTTPS proxy listening on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
            e
        })?;
        info!("HTTP proxy listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

fn bad_body(rejection: JsonRejection) -> ProxyError {
    ProxyError::BadRequest {
        status: rejection.status(),
        message: rejection.body_text(),
    }
}

async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>
) -> Result<Json<ProxyResponse>, ProxyError> {
    let Json(req) = payload.map_err(bad_body)?;
    info!("Search request received ({} chars)", req.query.chars().count());
    let reply = state.proxy.search(req.query).await?;
    Ok(Json(reply))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ProxyResponse>, ProxyError> {
    let Json(req) = payload.map_err(bad_body)?;
    info!(
        "Chat request received (conversation {})",
        req.conversation_id.as_deref().unwrap_or("new")
    );
    let reply = state.proxy.send_message(req.message, req.conversation_id).await?;
    Ok(Json(reply))
}
