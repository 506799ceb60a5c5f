use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use atrio_db::models::NoticiaRow;
use atrio_db::time::parse_db_datetime;
use atrio_types::api::{Claims, NoticiasResponse};
use atrio_types::models::Noticia;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Multipart, Path, Query, int_param};
use crate::multipart::read_form;
use crate::upload::MediaKind;

#[derive(Debug, Deserialize)]
pub struct NoticiasQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Anything except the literal string "false" keeps the default
    /// published-only view.
    #[serde(rename = "publicOnly")]
    pub public_only: Option<String>,
}

pub async fn list_noticias(
    State(state): State<AppState>,
    Query(query): Query<NoticiasQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = int_param(query.limit.as_deref(), 100);
    let offset = int_param(query.offset.as_deref(), 0);
    let public_only = query.public_only.as_deref() != Some("false");

    let db = state.clone();
    let (rows, total) =
        tokio::task::spawn_blocking(move || db.db.list_noticias(limit, offset, public_only))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })??;

    Ok(Json(NoticiasResponse {
        noticias: rows.into_iter().map(to_wire).collect(),
        total,
    }))
}

pub async fn get_noticia(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_noticia(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Noticia no encontrada".to_string()))?;

    Ok(Json(to_wire(row)))
}

pub async fn create_noticia(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagen").await?;

    let (titulo, contenido) = match (form.text("titulo"), form.text("contenido")) {
        (Some(t), Some(c)) => (t.to_string(), c.to_string()),
        _ => {
            return Err(ApiError::Validation(
                "Título y contenido son requeridos".to_string(),
            ));
        }
    };
    let publicado = coerce_publicado(form.text("publicado"));

    // Upload first: a rejected file aborts the create with no row written
    let imagen = match form.file() {
        Some(file) => Some(
            state
                .media
                .store(MediaKind::Noticia, &file.name, file.content_type.as_deref(), &file.data)
                .await?,
        ),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .create_noticia(&row_id, &titulo, &contenido, imagen.as_deref(), publicado)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    info!("Noticia {} creada por '{}'", id, claims.username);
    Ok((StatusCode::CREATED, Json(to_wire(row))))
}

pub async fn update_noticia(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagen").await?;

    let db = state.clone();
    let lookup = id.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_noticia(&lookup))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Noticia no encontrada".to_string()))?;

    // New file is written before the row changes and before the old file is
    // touched, so a rejected upload leaves everything as it was
    let new_imagen = match form.file() {
        Some(file) => Some(
            state
                .media
                .store(MediaKind::Noticia, &file.name, file.content_type.as_deref(), &file.data)
                .await?,
        ),
        None => None,
    };

    let titulo = form.text("titulo").map(str::to_string);
    let contenido = form.text("contenido").map(str::to_string);
    let publicado = form.text("publicado").map(coerce_flag);

    let db = state.clone();
    let row_id = id.clone();
    let imagen_param = new_imagen.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.db.update_noticia(
            &row_id,
            titulo.as_deref(),
            contenido.as_deref(),
            imagen_param.as_deref(),
            publicado,
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
            // Row vanished between lookup and update; drop the fresh file
            if let Some(path) = &new_imagen {
                state.media.remove(path).await;
            }
            return Err(ApiError::NotFound("Noticia no encontrada".to_string()));
        }
    };

    if new_imagen.is_some() {
        if let Some(old) = &existing.imagen {
            state.media.remove(old).await;
        }
    }

    Ok(Json(to_wire(row)))
}

pub async fn delete_noticia(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || db.db.delete_noticia(&row_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Noticia no encontrada".to_string()))?;

    if let Some(imagen) = &row.imagen {
        state.media.remove(imagen).await;
    }

    info!("Noticia {} eliminada por '{}'", id, claims.username);
    Ok(Json(json!({ "message": "Noticia eliminada correctamente" })))
}

/// Absent means published on create (original panel behavior).
fn coerce_publicado(raw: Option<&str>) -> bool {
    raw.map(coerce_flag).unwrap_or(true)
}

fn coerce_flag(raw: &str) -> bool {
    !matches!(raw, "false" | "0")
}

fn to_wire(row: NoticiaRow) -> Noticia {
    Noticia {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt noticia id '{}': {}", row.id, e);
            Uuid::default()
        }),
        fecha: parse_db_datetime(&row.fecha).unwrap_or_else(|| {
            warn!("Corrupt fecha '{}' on noticia '{}'", row.fecha, row.id);
            chrono::DateTime::default()
        }),
        titulo: row.titulo,
        contenido: row.contenido,
        imagen: row.imagen,
        publicado: row.publicado,
    }
}
