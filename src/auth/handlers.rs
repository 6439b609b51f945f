use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::token;
use crate::db::models::Role;
use crate::db::users;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// POST /api/login — verify credentials and hand out a signed token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = users::verify_credentials(&state.db, &req.username, &req.password)?;
    let token = token::issue(
        state.config.jwt_secret(),
        &user,
        state.config.auth.token_hours,
    )?;
    tracing::info!("login: {} ({})", user.username, user.role.as_str());
    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}
