use secrecy::{ExposeSecret, Secret};
use std::env;

use crate::error::AppError;

/// Session signing keys are derived from the configured secret; the cookie
/// crate requires at least 64 bytes of master key material.
const MIN_SESSION_SECRET_BYTES: usize = 64;

/// Development-only signing secret. Prod deployments must set SESSION_SECRET.
const DEV_SESSION_SECRET: &str =
    "insecure-dev-session-secret-0123456789abcdef0123456789abcdef0123456789abcdef";

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub port: u16,
    /// Directory holding the built SPA bundle; fallback routes are only
    /// registered when it exists on disk.
    pub public_dir: String,
    /// Where the browser lands after login, logout, and rejected logins.
    pub frontend_url: String,
    /// Externally reachable base URL of this service, used to build the
    /// OAuth callback URL.
    pub backend_url: String,
    pub session: SessionConfig,
    pub google: GoogleOAuthConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Secret<String>,
    pub ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Suffix an email must carry for the login to be accepted, including
    /// the leading '@'.
    pub allowed_email_domain: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::Config(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let settings = Settings {
            environment,
            service_name: get_env("SERVICE_NAME", Some("ask-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            port: get_env("PORT", Some("8080"), is_prod)?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::Config(anyhow::anyhow!(e.to_string()))
                })?,
            public_dir: get_env("PUBLIC_DIR", Some("public"), is_prod)?,
            frontend_url: get_env("FRONTEND_URL", Some("http://localhost:5173/"), is_prod)?,
            backend_url: get_env("BACKEND_URL", Some("http://localhost:8080"), is_prod)?,
            session: SessionConfig {
                secret: Secret::new(get_env("SESSION_SECRET", Some(DEV_SESSION_SECRET), is_prod)?),
                ttl_days: get_env("SESSION_TTL_DAYS", Some("7"), is_prod)?
                    .parse()
                    .unwrap_or(7),
            },
            google: GoogleOAuthConfig {
                client_id: get_env("GOOGLE_CLIENT_ID", Some(""), is_prod)?,
                client_secret: Secret::new(get_env("GOOGLE_CLIENT_SECRET", Some(""), is_prod)?),
                allowed_email_domain: get_env("ALLOWED_EMAIL_DOMAIN", Some("@cx-labs.io"), is_prod)?,
            },
            gemini: GeminiConfig {
                api_key: Secret::new(get_env("GEMINI_API_KEY", Some(""), is_prod)?),
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), is_prod)?,
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }

    /// Callback URL registered with the OAuth client.
    pub fn oauth_redirect_uri(&self) -> String {
        format!(
            "{}/api/auth/google/callback",
            self.backend_url.trim_end_matches('/')
        )
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.session.secret.expose_secret().len() < MIN_SESSION_SECRET_BYTES {
            return Err(AppError::Config(anyhow::anyhow!(
                "SESSION_SECRET must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.session.ttl_days <= 0 {
            return Err(AppError::Config(anyhow::anyhow!(
                "SESSION_TTL_DAYS must be positive"
            )));
        }

        // A bare "cx-labs.io" would also match "evil-cx-labs.io" under the
        // suffix check, so the leading '@' is mandatory.
        if !self.google.allowed_email_domain.starts_with('@') {
            return Err(AppError::Config(anyhow::anyhow!(
                "ALLOWED_EMAIL_DOMAIN must start with '@'"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
