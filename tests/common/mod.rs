//! Test helper module for ask-service integration tests.
//!
//! Spawns the application on a random port with mock identity and answer
//! providers so no test talks to Google or Gemini.

#![allow(dead_code)]

use ask_service::config::{Environment, GeminiConfig, GoogleOAuthConfig, SessionConfig, Settings};
use ask_service::services::{
    AnswerProvider, IdentityProfile, IdentityProvider, MockAnswerProvider, MockIdentityProvider,
};
use ask_service::startup::Application;
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;

/// Signing secret for the session cookie; the config layer requires at
/// least 64 bytes.
pub const TEST_SESSION_SECRET: &str =
    "test-session-secret-0123456789abcdef0123456789abcdef0123456789abcdef";

/// Test application with a running HTTP server.
pub struct TestApp {
    pub port: u16,
    pub identity: Arc<MockIdentityProvider>,
    pub answers: Arc<MockAnswerProvider>,
}

impl TestApp {
    /// Spawn with a provider that accepts `dev@cx-labs.io` and a canned answer.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            MockIdentityProvider::returning(test_profile("dev@cx-labs.io")),
            MockAnswerProvider::answering("A canned answer."),
            create_test_settings(),
        )
        .await
    }

    pub async fn spawn_with(
        identity: MockIdentityProvider,
        answers: MockAnswerProvider,
        settings: Settings,
    ) -> Self {
        // Idempotent; keeps /metrics live for tests the same way main does.
        ask_service::services::metrics::init_metrics();

        let identity = Arc::new(identity);
        let answers = Arc::new(answers);

        let app = Application::build_with_providers(
            settings,
            identity.clone() as Arc<dyn IdentityProvider>,
            answers.clone() as Arc<dyn AnswerProvider>,
        )
        .await
        .expect("Failed to build application");

        let port = app.port();

        // Spawn the server in the background
        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            port,
            identity,
            answers,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://localhost:{}{}", self.port, path)
    }

    /// Client with a cookie store so the session survives across requests,
    /// and redirects disabled so tests can assert on them.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client")
    }
}

pub fn test_profile(email: &str) -> IdentityProfile {
    IdentityProfile {
        id: "google-user-1".to_string(),
        email: email.to_string(),
        name: Some("Test User".to_string()),
        verified_email: true,
    }
}

pub fn create_test_settings() -> Settings {
    Settings {
        environment: Environment::Dev,
        service_name: "ask-service-test".to_string(),
        log_level: "error".to_string(),
        port: 0,
        public_dir: "public-does-not-exist".to_string(),
        frontend_url: "http://localhost:5173/".to_string(),
        backend_url: "http://localhost:8080".to_string(),
        session: SessionConfig {
            secret: Secret::new(TEST_SESSION_SECRET.to_string()),
            ttl_days: 7,
        },
        google: GoogleOAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: Secret::new("test-client-secret".to_string()),
            allowed_email_domain: "@cx-labs.io".to_string(),
        },
        gemini: GeminiConfig {
            api_key: Secret::new("test-api-key".to_string()),
            model: "gemini-2.0-flash".to_string(),
        },
    }
}

/// Pull a query parameter out of a redirect location.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}
