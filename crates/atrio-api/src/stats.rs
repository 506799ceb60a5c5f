use axum::{Json, extract::State, response::IntoResponse};
use tracing::error;

use atrio_types::api::StatsResponse;

use crate::auth::AppState;
use crate::error::ApiError;

/// Dashboard counts. Whether this sits behind the auth gate is decided at
/// router assembly from configuration.
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let stats = tokio::task::spawn_blocking(move || db.db.stats())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    Ok(Json(StatsResponse {
        noticias: stats.noticias,
        eventos: stats.eventos,
        eventos_proximos: stats.eventos_proximos,
        galeria: stats.galeria,
        mensajes_no_leidos: stats.mensajes_no_leidos,
        mensajes_total: stats.mensajes_total,
    }))
}
