//! Identity provider abstraction for the login flow.
//!
//! The cookie and session choreography lives in the auth handlers; this
//! module only covers the leg that talks to Google, so tests can swap in a
//! mock and drive the callback without real credentials.

pub mod google;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Profile fields returned by the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub verified_email: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Redeem an authorization code for the signed-in user's profile.
    async fn fetch_profile(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<IdentityProfile, IdentityError>;
}
