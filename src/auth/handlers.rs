use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        services::{issue_tokens, normalize_email, normalize_username, validate_password},
    },
    error::ApiError,
    extract::AppJson,
    state::AppState,
    store::NewUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let username = normalize_username(&payload.username)?;
    let email = normalize_email(&payload.email)?;
    validate_password(&payload.password)?;

    // Ensure username and email are not taken
    if state.store.find_user_by_username(&username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::Conflict("Username already registered".into()));
    }
    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    // The store still enforces uniqueness for concurrent registrations.
    let user = state
        .store
        .create_user(NewUser {
            username: &username,
            email: &email,
            password_hash: &hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email)?;

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let user_id = user.id;
    let response = issue_tokens(&keys, user)?;

    info!(%user_id, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::unauthenticated("invalid or expired refresh token")
    })?;

    let Some(user) = state.store.find_user_by_id(claims.sub).await? else {
        warn!(user_id = %claims.sub, "refresh for unknown user");
        return Err(ApiError::unauthenticated("User not found"));
    };

    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let Some(found) = state.store.find_user_by_id(user.id).await? else {
        warn!(user_id = %user.id, "token for unknown user");
        return Err(ApiError::unauthenticated("User not found"));
    };

    Ok(Json(PublicUser::from(found)))
}
