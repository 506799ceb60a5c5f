use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use atrio_db::models::EventoRow;
use atrio_db::time::{normalize_event_datetime, parse_db_datetime};
use atrio_types::api::{Claims, EventosResponse};
use atrio_types::models::Evento;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Multipart, Path, Query, int_param};
use crate::multipart::read_form;
use crate::upload::MediaKind;

#[derive(Debug, Deserialize)]
pub struct EventosQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// `upcoming=true` keeps only events at or after now.
    pub upcoming: Option<String>,
}

pub async fn list_eventos(
    State(state): State<AppState>,
    Query(query): Query<EventosQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = int_param(query.limit.as_deref(), 100);
    let offset = int_param(query.offset.as_deref(), 0);
    let upcoming = query.upcoming.as_deref() == Some("true");

    let db = state.clone();
    let (rows, total) =
        tokio::task::spawn_blocking(move || db.db.list_eventos(limit, offset, upcoming))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })??;

    Ok(Json(EventosResponse {
        eventos: rows.into_iter().map(to_wire).collect(),
        total,
    }))
}

pub async fn get_evento(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_evento(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Evento no encontrado".to_string()))?;

    Ok(Json(to_wire(row)))
}

pub async fn create_evento(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagen").await?;

    let (titulo, fecha_raw) = match (form.text("titulo"), form.text("fecha_evento")) {
        (Some(t), Some(f)) => (t.to_string(), f.to_string()),
        _ => {
            return Err(ApiError::Validation(
                "Título y fecha del evento son requeridos".to_string(),
            ));
        }
    };

    // Stored normalized so datetime('now') comparisons stay sound
    let fecha_evento = normalize_event_datetime(&fecha_raw)
        .ok_or_else(|| ApiError::Validation("Fecha del evento no válida".to_string()))?;

    let descripcion = form.text("descripcion").map(str::to_string);
    let lugar = form.text("lugar").map(str::to_string);

    let imagen = match form.file() {
        Some(file) => Some(
            state
                .media
                .store(MediaKind::Evento, &file.name, file.content_type.as_deref(), &file.data)
                .await?,
        ),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.create_evento(
            &row_id,
            &titulo,
            descripcion.as_deref(),
            &fecha_evento,
            lugar.as_deref(),
            imagen.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    info!("Evento {} creado por '{}'", id, claims.username);
    Ok((StatusCode::CREATED, Json(to_wire(row))))
}

pub async fn update_evento(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagen").await?;

    let db = state.clone();
    let lookup = id.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_evento(&lookup))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Evento no encontrado".to_string()))?;

    let fecha_evento = match form.text("fecha_evento") {
        Some(raw) => Some(
            normalize_event_datetime(raw)
                .ok_or_else(|| ApiError::Validation("Fecha del evento no válida".to_string()))?,
        ),
        None => None,
    };

    let new_imagen = match form.file() {
        Some(file) => Some(
            state
                .media
                .store(MediaKind::Evento, &file.name, file.content_type.as_deref(), &file.data)
                .await?,
        ),
        None => None,
    };

    let titulo = form.text("titulo").map(str::to_string);
    let descripcion = form.text("descripcion").map(str::to_string);
    let lugar = form.text("lugar").map(str::to_string);

    let db = state.clone();
    let row_id = id.clone();
    let imagen_param = new_imagen.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.db.update_evento(
            &row_id,
            titulo.as_deref(),
            descripcion.as_deref(),
            fecha_evento.as_deref(),
            lugar.as_deref(),
            imagen_param.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    let row = match updated {
        Some(row) => row,
        None => {
            if let Some(path) = &new_imagen {
                state.media.remove(path).await;
            }
            return Err(ApiError::NotFound("Evento no encontrado".to_string()));
        }
    };

    if new_imagen.is_some() {
        if let Some(old) = &existing.imagen {
            state.media.remove(old).await;
        }
    }

    Ok(Json(to_wire(row)))
}

pub async fn delete_evento(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || db.db.delete_evento(&row_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Evento no encontrado".to_string()))?;

    if let Some(imagen) = &row.imagen {
        state.media.remove(imagen).await;
    }

    info!("Evento {} eliminado por '{}'", id, claims.username);
    Ok(Json(json!({ "message": "Evento eliminado correctamente" })))
}

fn to_wire(row: EventoRow) -> Evento {
    Evento {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt evento id '{}': {}", row.id, e);
            Uuid::default()
        }),
        fecha_evento: parse_db_datetime(&row.fecha_evento).unwrap_or_else(|| {
            warn!("Corrupt fecha_evento '{}' on evento '{}'", row.fecha_evento, row.id);
            chrono::DateTime::default()
        }),
        created_at: parse_db_datetime(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on evento '{}'", row.created_at, row.id);
            chrono::DateTime::default()
        }),
        titulo: row.titulo,
        descripcion: row.descripcion,
        lugar: row.lugar,
        imagen: row.imagen,
    }
}
