//! Google OAuth2 code exchange and profile fetch.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::{IdentityError, IdentityProfile, IdentityProvider};
use crate::config::GoogleOAuthConfig;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    #[serde(default)]
    verified_email: bool,
    name: Option<String>,
}

pub struct GoogleIdentityProvider {
    client: Client,
    client_id: String,
    client_secret: Secret<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn fetch_profile(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<IdentityProfile, IdentityError> {
        // 1. Exchange code for access token
        let token_res = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret().as_str()),
                ("code", code),
                ("code_verifier", code_verifier),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        if !token_res.status().is_success() {
            let status = token_res.status();
            let err_body = token_res.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %err_body, "Google token exchange error");
            return Err(IdentityError::ExchangeFailed(status.to_string()));
        }

        let token_data: GoogleTokenResponse = token_res
            .json()
            .await
            .map_err(|e| IdentityError::ExchangeFailed(e.to_string()))?;

        // 2. Get user info from Google
        let user_info_res = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token_data.access_token)
            .send()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        if !user_info_res.status().is_success() {
            return Err(IdentityError::ProfileFetchFailed(
                user_info_res.status().to_string(),
            ));
        }

        let user_info: GoogleUserInfo = user_info_res
            .json()
            .await
            .map_err(|e| IdentityError::ProfileFetchFailed(e.to_string()))?;

        Ok(IdentityProfile {
            id: user_info.id,
            email: user_info.email,
            name: user_info.name,
            verified_email: user_info.verified_email,
        })
    }
}
