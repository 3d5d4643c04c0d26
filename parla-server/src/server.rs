use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use parla_core::assistant::LanguageAssistant;
use parla_core::config::ServerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<LanguageAssistant>,
}

impl AppState {
    pub fn new(assistant: LanguageAssistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }
}

/// Build the HTTP router (shared between production startup and tests).
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health))
        .route("/correct-grammar", post(routes::correct_grammar))
        .route("/auto-complete", post(routes::auto_complete))
        .route("/roleplay", post(routes::roleplay))
        .route("/reset-history", post(routes::reset_history))
        .route("/therapist-chat", post(routes::therapist_chat))
        .route("/therapist-reset", post(routes::therapist_reset))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http());

    let router = if config.cors_permissive {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}

/// Socket address for `bind` and `port`. Accepts IPv4 and IPv6 hosts.
pub fn socket_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.bind))?;
    Ok(SocketAddr::new(ip, config.port))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let model = state.assistant.model_info();
    let app = build_app(state, config);

    let addr = socket_addr(config)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let lines = [
        format!("parla v{}", parla_core::VERSION),
        format!("listening on http://{}", addr),
        format!("llm: {} ({})", model.provider, model.model_name),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bind: &str, port: u16) -> ServerConfig {
        ServerConfig {
            bind: bind.to_string(),
            port,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_socket_addr_ipv4() {
        let addr = socket_addr(&config("0.0.0.0", 5000)).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_socket_addr_ipv6() {
        let addr = socket_addr(&config("::", 8080)).unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.to_string(), "[::]:8080");

        let addr = socket_addr(&config("::1", 8080)).unwrap();
        assert_eq!(addr.to_string(), "[::1]:8080");
    }

    #[test]
    fn test_socket_addr_rejects_hostname() {
        let err = socket_addr(&config("localhost", 5000)).unwrap_err();
        assert!(err.to_string().contains("invalid bind address"));
    }
}
