use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::AppResult;
use crate::export;
use crate::extractors::AdminUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/export", get(export_all))
}

/// GET /api/export — admin only. Streams the workbook from memory; no
/// shared file on disk, so concurrent exports cannot interfere.
async fn export_all(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let buffer = export::export_all(&state.db, state.config.uploads_path())?;
    tracing::info!("exported {} bytes of xlsx", buffer.len());
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::EXPORT_FILENAME),
            ),
        ],
        buffer,
    ))
}
