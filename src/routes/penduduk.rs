use axum::extract::{Multipart, Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::db::models::Penduduk;
use crate::db::penduduk;
use crate::error::AppResult;
use crate::extractors::{AdminUser, AuthUser};
use crate::state::AppState;
use crate::storage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/penduduk", get(list).post(create))
        .route("/api/penduduk/{id}", axum::routing::put(update).delete(delete))
}

/// GET /api/penduduk — any authenticated role.
async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Penduduk>>> {
    let records = penduduk::list(&state.db)?;
    Ok(Json(records))
}

/// POST /api/penduduk — admin only. Multipart body: text fields plus up to
/// three photo files.
async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let (fields, photos) = storage::collect(&mut multipart, state.config.uploads_path()).await?;
    let id = penduduk::create(&state.db, fields, photos)?;
    tracing::info!("created penduduk {}", id);
    Ok(Json(json!({ "id": id })))
}

/// PUT /api/penduduk/{id} — admin only. Omitted fields and photo parts keep
/// their stored values.
async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let (fields, photos) = storage::collect(&mut multipart, state.config.uploads_path()).await?;
    penduduk::update(&state.db, id, fields, photos)?;
    tracing::info!("updated penduduk {}", id);
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/penduduk/{id} — admin only. Removes the row; referenced
/// photo files stay on disk.
async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    penduduk::delete(&state.db, id)?;
    tracing::info!("deleted penduduk {}", id);
    Ok(Json(json!({ "success": true })))
}
