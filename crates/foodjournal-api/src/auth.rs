use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};

use foodjournal_db::Store;
use foodjournal_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::store_status;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Check if email is taken
    if state
        .store
        .find_user_by_email(email)
        .await
        .map_err(store_status)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // A concurrent registration can still win the race; UNIQUE maps to 409.
    let user_id = state
        .store
        .create_user(email, &req.password)
        .await
        .map_err(store_status)?;

    let token = create_token(&state.jwt_secret, user_id, email).map_err(|e| {
        error!("Token creation failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!("Registered user {}", user_id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state
        .store
        .check_credentials(req.email.trim(), &req.password)
        .await
        .map_err(store_status)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = create_token(&state.jwt_secret, user.id, &user.email).map_err(|e| {
        error!("Token creation failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        email: user.email,
        token,
    }))
}

fn create_token(secret: &str, user_id: i64, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
