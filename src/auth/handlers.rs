use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
        password::{hash_password, verify_password, PasswordError},
        services::{is_valid_username, AuthUser, JwtKeys},
    },
    state::AppState,
    users::{dto::UserShape, repo},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    if let Ok(Some(_)) = repo::find_by_username(&state.db, &payload.username).await {
        warn!(username = %payload.username, "username already registered");
        return Err((StatusCode::CONFLICT, "Username already taken".into()));
    }

    let hash = hash_password(&payload.password).map_err(internal)?;
    let user = repo::create(&state.db, &payload.username, &hash)
        .await
        .map_err(internal)?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(internal)?;
    let shape = UserShape::from_record(&user).map_err(internal)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: shape,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let mut user = match repo::find_by_username(&state.db, &payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(username = %payload.username, "login unknown username");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into()));
        }
    };

    // A malformed stored hash means a corrupted account record, not a wrong
    // password; it must not surface as a 401.
    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e @ PasswordError::MalformedHash(_)) => {
            error!(error = %e, user_id = %user.id, "stored hash unreadable");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Account record is corrupted".into(),
            ));
        }
        Err(e) => return Err(internal(e)),
    };

    if !ok {
        warn!(username = %payload.username, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    repo::load_relations(&state.db, &mut user)
        .await
        .map_err(internal)?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(internal)?;
    let shape = UserShape::from_record(&user).map_err(internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: shape,
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let access_token = keys.sign_access(claims.sub).map_err(internal)?;
    let refresh_token = keys.sign_refresh(claims.sub).map_err(internal)?;

    let user = repo::find_hydrated(&state.db, claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    let shape = UserShape::from_record(&user).map_err(internal)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: shape,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserShape>, (StatusCode, String)> {
    let user = repo::find_hydrated(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(user_id = %user_id, "token subject no longer exists");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;
    let shape = UserShape::from_record(&user).map_err(internal)?;
    Ok(Json(shape))
}
