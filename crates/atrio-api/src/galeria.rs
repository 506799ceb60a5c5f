use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use atrio_db::models::GaleriaRow;
use atrio_db::time::parse_db_datetime;
use atrio_types::api::{Claims, GaleriaResponse, UpdateGaleriaRequest};
use atrio_types::models::GaleriaImagen;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Multipart, Path, Query, int_param};
use crate::multipart::read_form;
use crate::upload::MediaKind;

const MAX_BATCH_FILES: usize = 20;

#[derive(Debug, Deserialize)]
pub struct GaleriaQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// `todas` is the panel's no-filter sentinel.
    pub categoria: Option<String>,
}

pub async fn list_galeria(
    State(state): State<AppState>,
    Query(query): Query<GaleriaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = int_param(query.limit.as_deref(), 100);
    let offset = int_param(query.offset.as_deref(), 0);
    let categoria = query
        .categoria
        .filter(|c| !c.is_empty() && c != "todas");

    let db = state.clone();
    let (rows, total, categorias) = tokio::task::spawn_blocking(move || {
        let (rows, total) = db.db.list_galeria(limit, offset, categoria.as_deref())?;
        let categorias = db.db.galeria_categorias()?;
        Ok::<_, anyhow::Error>((rows, total, categorias))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    Ok(Json(GaleriaResponse {
        imagenes: rows.into_iter().map(to_wire).collect(),
        total,
        categorias,
    }))
}

pub async fn get_imagen(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_galeria_imagen(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Imagen no encontrada".to_string()))?;

    Ok(Json(to_wire(row)))
}

pub async fn upload_imagen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagen").await?;

    let file = form
        .file()
        .ok_or_else(|| ApiError::Validation("Imagen requerida".to_string()))?;

    let imagen = state
        .media
        .store(MediaKind::Galeria, &file.name, file.content_type.as_deref(), &file.data)
        .await?;

    let titulo = form.text("titulo").map(str::to_string);
    let categoria = form.text("categoria").unwrap_or("general").to_string();

    let id = Uuid::new_v4().to_string();
    let db = state.clone();
    let row_id = id.clone();
    let stored = imagen.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .create_galeria_imagen(&row_id, titulo.as_deref(), &stored, &categoria)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    });

    let row = match row {
        Ok(Ok(row)) => row,
        Ok(Err(e)) => {
            // Row never landed; do not leave the file orphaned
            state.media.remove(&imagen).await;
            return Err(e.into());
        }
        Err(e) => {
            state.media.remove(&imagen).await;
            return Err(e);
        }
    };

    info!("Imagen de galería {} subida por '{}'", id, claims.username);
    Ok((StatusCode::CREATED, Json(to_wire(row))))
}

/// Batch upload: every file is validated and stored before any row is
/// inserted; the first failure unwinds the files already written.
pub async fn upload_multiple(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart, "imagenes").await?;

    if form.files().is_empty() {
        return Err(ApiError::Validation(
            "Al menos una imagen es requerida".to_string(),
        ));
    }
    if form.files().len() > MAX_BATCH_FILES {
        return Err(ApiError::Validation(
            "Máximo 20 imágenes por subida".to_string(),
        ));
    }

    let categoria = form.text("categoria").unwrap_or("general").to_string();

    let mut stored = Vec::with_capacity(form.files().len());
    for file in form.files() {
        match state
            .media
            .store(MediaKind::Galeria, &file.name, file.content_type.as_deref(), &file.data)
            .await
        {
            Ok(path) => stored.push(path),
            Err(e) => {
                for path in &stored {
                    state.media.remove(path).await;
                }
                return Err(e.into());
            }
        }
    }

    let db = state.clone();
    let paths = stored.clone();
    let cat = categoria.clone();
    let inserted = tokio::task::spawn_blocking(move || {
        let mut rows = Vec::with_capacity(paths.len());
        for path in &paths {
            let id = Uuid::new_v4().to_string();
            rows.push(db.db.create_galeria_imagen(&id, None, path, &cat)?);
        }
        Ok::<_, anyhow::Error>(rows)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    });

    let rows = match inserted {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            for path in &stored {
                state.media.remove(path).await;
            }
            return Err(e.into());
        }
        Err(e) => {
            for path in &stored {
                state.media.remove(path).await;
            }
            return Err(e);
        }
    };

    info!(
        "{} imágenes de galería subidas por '{}'",
        rows.len(),
        claims.username
    );

    let imagenes: Vec<GaleriaImagen> = rows.into_iter().map(to_wire).collect();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} imágenes subidas", imagenes.len()),
            "imagenes": imagenes,
        })),
    ))
}

/// Metadata-only: an explicit empty `titulo` clears it, while an absent or
/// empty `categoria` keeps the stored one.
pub async fn update_imagen(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<UpdateGaleriaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let titulo = req.titulo;
    let categoria = req.categoria.filter(|c| !c.is_empty());

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .update_galeria_meta(&id, titulo.as_deref(), categoria.as_deref())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??
    .ok_or_else(|| ApiError::NotFound("Imagen no encontrada".to_string()))?;

    Ok(Json(to_wire(row)))
}

pub async fn delete_imagen(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || db.db.delete_galeria_imagen(&row_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Imagen no encontrada".to_string()))?;

    state.media.remove(&row.imagen).await;

    info!("Imagen de galería {} eliminada por '{}'", id, claims.username);
    Ok(Json(json!({ "message": "Imagen eliminada correctamente" })))
}

fn to_wire(row: GaleriaRow) -> GaleriaImagen {
    GaleriaImagen {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt imagen id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_db_datetime(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on imagen '{}'", row.created_at, row.id);
            chrono::DateTime::default()
        }),
        titulo: row.titulo,
        imagen: row.imagen,
        categoria: row.categoria,
    }
}
