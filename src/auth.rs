//! Accounts, sessions and the request extractors built on them.
//!
//! Members sign up with email and password (stored as an Argon2 hash).
//! Logging in creates a server-side session keyed by a random cookie
//! token; sessions live in memory and are gone after a restart. Each
//! session carries its own XSRF token that mutating requests must echo.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::queries::{households, users};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, Role, UserProfile};
use crate::state::{AppState, Session};
use crate::xsrf::{is_mutating, xsrf_error_response, XsrfToken};

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "session";

const MIN_PASSWORD_LEN: usize = 8;

/// Paths reachable without a session.
fn is_public(path: &str) -> bool {
    matches!(path, "/health" | "/api/auth/signup" | "/api/auth/login")
}

/// Rejects requests without a valid session, checks the session's XSRF
/// token on mutating requests and makes the [`Session`] available to
/// handlers as a request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let session = cookies
        .get(SESSION_COOKIE)
        .and_then(|c| state.session(c.value()));
    let Some(session) = session else {
        return AppError::Unauthorized("Authentication required".into()).into_response();
    };

    if is_mutating(request.method()) && !session.xsrf_token.matches(request.headers()) {
        warn!(user_id = session.user_id, path = %request.uri().path(), "XSRF check failed");
        return xsrf_error_response();
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// The profile of whoever owns the request's session.
pub struct CurrentUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;
        let conn = state.db.get()?;
        let user = users::get_user(&conn, session.user_id)?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;
        Ok(CurrentUser(user))
    }
}

/// A signed-in user who already belongs to a household.
pub struct Member {
    pub user: UserProfile,
    pub household_id: i64,
}

impl Member {
    /// Fails with a permission error when `household_id` is not the member's own.
    pub fn authorize(&self, household_id: i64) -> AppResult<()> {
        if household_id == self.household_id {
            Ok(())
        } else {
            warn!(
                user_id = self.user.id,
                household_id, "Rejected access to another household's data"
            );
            Err(AppError::Forbidden(
                "This belongs to another household".into(),
            ))
        }
    }

    pub fn display_name(&self) -> String {
        self.user.display_name()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Member {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        let household_id = user.household_id.ok_or_else(|| {
            AppError::BusinessRule("Set up your household before adding to the checklist".into())
        })?;
        Ok(Member { user, household_id })
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub theme: String,
    pub xsrf_token: String,
}

impl SessionResponse {
    fn new(user: UserProfile, session: &Session) -> Self {
        Self {
            theme: user.effective_theme(),
            user,
            xsrf_token: session.xsrf_token.value().to_string(),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("bad email regex: {e}"))
    })
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(AppError::Validation("Enter a valid email address".into()))
    }
}

fn open_session(state: &AppState, cookies: &Cookies, user_id: i64) -> Session {
    let token = Uuid::new_v4().to_string();
    let session = Session {
        user_id,
        xsrf_token: XsrfToken::generate(),
    };
    state.start_session(token.clone(), session.clone());

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(state.config.secure_cookies)
        .build();
    cookies.add(cookie);
    session
}

/// Register an account together with a fresh one-member household.
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(data): Json<SignupData>,
) -> AppResult<Json<SessionResponse>> {
    if !state.config.allow_signup {
        return Err(AppError::Forbidden("Sign-up is disabled".into()));
    }
    let email = data.email.trim();
    validate_email(email)?;
    if data.first_name.trim().is_empty() {
        return Err(AppError::Validation("First name is required".into()));
    }
    if data.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(&data.password)?;

    let mut conn = state.db.get()?;
    if users::find_user_by_email(&conn, email)?.is_some() {
        return Err(AppError::BusinessRule(
            "An account with this email already exists".into(),
        ));
    }

    let tx = conn.transaction()?;
    let new_user = NewUser {
        email: email.to_string(),
        first_name: data.first_name.trim().to_string(),
        last_name: data.last_name.trim().to_string(),
        role: data.role,
    };
    let user_id = users::create_user(&tx, &new_user, Some(&password_hash))?;
    let household_id = households::create_household(&tx)?;
    users::set_household(&tx, user_id, Some(household_id))?;
    let user = users::get_user(&tx, user_id)?
        .ok_or_else(|| AppError::Internal("User vanished during sign-up".into()))?;
    tx.commit()?;

    info!(user_id, household_id, "Account created");
    let session = open_session(&state, &cookies, user_id);
    Ok(Json(SessionResponse::new(user, &session)))
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(data): Json<LoginData>,
) -> AppResult<Json<SessionResponse>> {
    let conn = state.db.get()?;

    let email = data.email.trim();
    let credentials = users::get_credentials(&conn, email)?;
    let user_id = match credentials {
        Some((id, hash)) if verify_password(&data.password, &hash) => id,
        _ => {
            warn!(%email, "Failed login attempt");
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    let user = users::get_user(&conn, user_id)?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;
    drop(conn);

    info!(user_id, "User logged in");
    let session = open_session(&state, &cookies, user_id);
    Ok(Json(SessionResponse::new(user, &session)))
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> AppResult<Json<()>> {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        if let Some(session) = state.end_session(session_cookie.value()) {
            info!(user_id = session.user_id, "User logged out");
        }
    }

    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").http_only(true).build();
    cookies.remove(cookie);

    Ok(Json(()))
}

pub async fn me(
    CurrentUser(user): CurrentUser,
    Extension(session): Extension<Session>,
) -> Json<SessionResponse> {
    Json(SessionResponse::new(user, &session))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash format stored for user");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("sam@example.com").is_ok());
        assert!(validate_email("  sam@example.com ").is_ok());
        assert!(validate_email("sam@localhost").is_err());
        assert!(validate_email("no at sign").is_err());
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public("/api/auth/login"));
        assert!(!is_public("/api/auth/logout"));
        assert!(!is_public("/api/items"));
    }
}
