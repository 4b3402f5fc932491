use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{AuthUser, CurrentUser, SESSION_USER_KEY};
use crate::services::metrics::record_login;
use crate::startup::AppState;

/// Short-lived cookies carrying the OAuth round-trip state.
const OAUTH_STATE_COOKIE: &str = "oauth_state";
const CODE_VERIFIER_COOKIE: &str = "code_verifier";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<AuthUser>,
}

/// GET /api/auth/google
///
/// Starts the login flow: stash state and PKCE verifier in short-lived
/// cookies and send the browser to Google's consent screen.
pub async fn google_login(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let state_val = uuid::Uuid::new_v4().to_string();
    let code_verifier = generate_code_verifier();
    let challenge = code_challenge(&code_verifier);

    let google_url = authorization_url(
        &state.config.google.client_id,
        &state.config.oauth_redirect_uri(),
        &state_val,
        &challenge,
    );

    // Secure tracks the environment so the dev flow works over plain HTTP.
    let secure = state.config.is_prod();
    let updated_jar = jar
        .add(
            Cookie::build((OAUTH_STATE_COOKIE, state_val))
                .path("/")
                .http_only(true)
                .secure(secure)
                .max_age(time::Duration::minutes(5))
                .build(),
        )
        .add(
            Cookie::build((CODE_VERIFIER_COOKIE, code_verifier))
                .path("/")
                .http_only(true)
                .secure(secure)
                .max_age(time::Duration::minutes(5))
                .build(),
        );

    (updated_jar, Redirect::to(&google_url))
}

/// GET /api/auth/google/callback
///
/// Every failure path lands the browser back on the frontend without a
/// session; details go to the logs, never to the visitor.
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), AppError> {
    let stored_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let code_verifier = jar.get(CODE_VERIFIER_COOKIE).map(|c| c.value().to_string());

    // Both cookies are single-use regardless of how the callback plays out.
    // Removal cookies must carry the same path as the originals to match.
    let jar = jar
        .remove(Cookie::build((OAUTH_STATE_COOKIE, "")).path("/").build())
        .remove(Cookie::build((CODE_VERIFIER_COOKIE, "")).path("/").build());

    let frontend = state.config.frontend_url.clone();

    if let Some(err) = query.error {
        tracing::warn!(error = %err, "Google returned an error on callback");
        record_login("provider_error");
        return Ok((jar, Redirect::to(&frontend)));
    }

    let (code, callback_state) = match (query.code, query.state) {
        (Some(code), Some(s)) => (code, s),
        _ => {
            tracing::warn!("Callback missing code or state");
            record_login("invalid_callback");
            return Ok((jar, Redirect::to(&frontend)));
        }
    };

    if stored_state.as_deref() != Some(callback_state.as_str()) {
        tracing::warn!("OAuth state mismatch");
        record_login("state_mismatch");
        return Ok((jar, Redirect::to(&frontend)));
    }

    let code_verifier = match code_verifier {
        Some(v) => v,
        None => {
            tracing::warn!("Missing code verifier cookie");
            record_login("missing_verifier");
            return Ok((jar, Redirect::to(&frontend)));
        }
    };

    let redirect_uri = state.config.oauth_redirect_uri();
    let profile = match state
        .identity
        .fetch_profile(&code, &code_verifier, &redirect_uri)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Google code exchange failed");
            record_login("exchange_failed");
            return Ok((jar, Redirect::to(&frontend)));
        }
    };

    if !profile.verified_email {
        tracing::warn!(email = %profile.email, "Login rejected: email not verified");
        record_login("unverified_email");
        return Ok((jar, Redirect::to(&frontend)));
    }

    if !profile
        .email
        .ends_with(&state.config.google.allowed_email_domain)
    {
        tracing::warn!(email = %profile.email, "Login rejected: email outside allowed domain");
        record_login("denied_domain");
        return Ok((jar, Redirect::to(&frontend)));
    }

    let name = profile
        .name
        .unwrap_or_else(|| display_name_from_email(&profile.email));
    let user = AuthUser {
        id: profile.id,
        email: profile.email,
        name,
    };

    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(anyhow::Error::new)?;

    record_login("success");
    tracing::info!(user_id = %user.id, email = %user.email, "User logged in via Google");

    Ok((jar, Redirect::to(&frontend)))
}

/// GET /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, AppError> {
    session.flush().await.map_err(anyhow::Error::new)?;
    tracing::info!("User logged out");
    Ok(Redirect::to(&state.config.frontend_url))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}

fn generate_code_verifier() -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    use rand::Rng;
    rng.fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn authorization_url(
    client_id: &str,
    redirect_uri: &str,
    state_val: &str,
    code_challenge: &str,
) -> String {
    format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}&code_challenge={}&code_challenge_method=S256",
        client_id, redirect_uri, state_val, code_challenge
    )
}

fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or("User").to_string()
}
