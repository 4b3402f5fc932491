//! Application startup and lifecycle management.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tower_sessions::{
    cookie::{Key, SameSite},
    Expiry, MemoryStore, SessionManagerLayer,
};

use crate::config::Settings;
use crate::error::AppError;
use crate::handlers::{
    app::health_check,
    ask::ask,
    auth::{google_callback, google_login, logout, me},
    metrics::metrics,
};
use crate::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use crate::services::{
    AnswerProvider, GeminiProvider, GoogleIdentityProvider, IdentityProvider,
};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub identity: Arc<dyn IdentityProvider>,
    pub answers: Arc<dyn AnswerProvider>,
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Session setup: signed cookie, lazily created on first write
    let session_store = MemoryStore::default();
    let key = Key::try_from(state.config.session.secret.expose_secret().as_bytes())
        .map_err(|e| AppError::Config(anyhow::anyhow!("Invalid session secret: {}", e)))?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(state.config.is_prod())
        .with_expiry(Expiry::OnInactivity(time::Duration::days(
            state.config.session.ttl_days,
        )));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/ask", post(ask))
        .route("/api/auth/google", get(google_login))
        .route("/api/auth/google/callback", get(google_callback))
        .route("/api/auth/logout", get(logout))
        .route("/api/auth/me", get(me));

    // SPA hosting only when the bundle is present; unknown paths fall back to
    // index.html so client-side routes survive a reload.
    let public_dir = Path::new(&state.config.public_dir);
    if public_dir.is_dir() {
        let index = public_dir.join("index.html");
        let spa = ServeDir::new(public_dir).fallback(ServeFile::new(index));
        router = router.fallback_service(spa);
        tracing::info!(dir = %state.config.public_dir, "Serving SPA assets");
    } else {
        tracing::info!(dir = %state.config.public_dir, "Public directory not found, SPA hosting disabled");
    }

    let router = router
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state);

    Ok(router)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration and the real
    /// Google and Gemini backends.
    pub async fn build(config: Settings) -> Result<Self, AppError> {
        if config.google.client_id.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID is not set, login will fail");
        }
        if config.gemini.api_key.expose_secret().is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set, /ask will fail");
        }

        let identity: Arc<dyn IdentityProvider> =
            Arc::new(GoogleIdentityProvider::new(&config.google));
        let answers: Arc<dyn AnswerProvider> = Arc::new(GeminiProvider::new(&config.gemini));

        tracing::info!(
            model = %config.gemini.model,
            "Initialized Gemini answer provider"
        );

        Self::build_with_providers(config, identity, answers).await
    }

    /// Build with explicit providers; tests inject mocks here.
    pub async fn build_with_providers(
        config: Settings,
        identity: Arc<dyn IdentityProvider>,
        answers: Arc<dyn AnswerProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            identity,
            answers,
        };

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("ask-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until shutdown is signalled.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state)
            .map_err(|e| std::io::Error::other(format!("Failed to build router: {}", e)))?;

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
