use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key under which the signed-in user is stored.
pub const SESSION_USER_KEY: &str = "user";

/// Signed-in user as persisted in the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Current visitor, signed in or not, extracted from the session.
///
/// No route hard-requires a login, so this never rejects on a missing user;
/// handlers decide for themselves what an anonymous visitor gets.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let user: Option<AuthUser> = session.get(SESSION_USER_KEY).await.unwrap_or(None);
        Ok(CurrentUser(user))
    }
}
