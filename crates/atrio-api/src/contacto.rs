use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use atrio_db::models::ContactoRow;
use atrio_db::time::parse_db_datetime;
use atrio_types::api::{Claims, ContactoRequest, MensajesResponse};
use atrio_types::models::MensajeContacto;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query, int_param};

#[derive(Debug, Deserialize)]
pub struct MensajesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// `unread=true` narrows the page to unread messages.
    pub unread: Option<String>,
}

/// Public intake. The email check is advisory (name@domain.tld shape), kept
/// deliberately loose; spam defense is out of scope.
pub async fn create_mensaje(
    State(state): State<AppState>,
    Json(req): Json<ContactoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (nombre, email, mensaje) = match (req.nombre, req.email, req.mensaje) {
        (Some(n), Some(e), Some(m)) if !n.is_empty() && !e.is_empty() && !m.is_empty() => {
            (n, e, m)
        }
        _ => {
            return Err(ApiError::Validation(
                "Nombre, email y mensaje son requeridos".to_string(),
            ));
        }
    };

    if !email_shape_ok(&email) {
        return Err(ApiError::Validation("Email no válido".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let db = state.clone();
    let row_id = id.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.create_mensaje(&row_id, &nombre, &email, &mensaje)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    info!("Mensaje de contacto {} recibido", id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Mensaje enviado correctamente. Nos pondremos en contacto pronto.",
            "id": row.id,
        })),
    ))
}

pub async fn list_mensajes(
    State(state): State<AppState>,
    Query(query): Query<MensajesQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = int_param(query.limit.as_deref(), 100);
    let offset = int_param(query.offset.as_deref(), 0);
    let unread_only = query.unread.as_deref() == Some("true");

    let db = state.clone();
    let (rows, total, unread) =
        tokio::task::spawn_blocking(move || db.db.list_mensajes(limit, offset, unread_only))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.into())
            })??;

    Ok(Json(MensajesResponse {
        mensajes: rows.into_iter().map(to_wire).collect(),
        total,
        unread,
    }))
}

pub async fn get_mensaje(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_mensaje(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Mensaje no encontrado".to_string()))?;

    Ok(Json(to_wire(row)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let marked = tokio::task::spawn_blocking(move || db.db.mark_mensaje_leido(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    if !marked {
        return Err(ApiError::NotFound("Mensaje no encontrado".to_string()));
    }

    Ok(Json(json!({ "message": "Mensaje marcado como leído" })))
}

/// One UPDATE statement, atomic under SQLite.
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let flipped = tokio::task::spawn_blocking(move || db.db.mark_all_leidos())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    info!("'{}' marcó {} mensajes como leídos", claims.username, flipped);
    Ok(Json(json!({ "message": "Todos los mensajes marcados como leídos" })))
}

pub async fn delete_mensaje(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.delete_mensaje(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    if row.is_none() {
        return Err(ApiError::NotFound("Mensaje no encontrado".to_string()));
    }

    Ok(Json(json!({ "message": "Mensaje eliminado correctamente" })))
}

fn email_shape_ok(email: &str) -> bool {
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') || domain.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn to_wire(row: ContactoRow) -> MensajeContacto {
    MensajeContacto {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt mensaje id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_db_datetime(&row.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on mensaje '{}'", row.created_at, row.id);
            chrono::DateTime::default()
        }),
        nombre: row.nombre,
        email: row.email,
        mensaje: row.mensaje,
        leido: row.leido,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_accepts_ordinary_addresses() {
        assert!(email_shape_ok("ana@example.com"));
        assert!(email_shape_ok("ana.maria@mail.example.org"));
        assert!(email_shape_ok("a+b@x.co"));
    }

    #[test]
    fn email_shape_rejects_malformed_addresses() {
        assert!(!email_shape_ok("sin-arroba"));
        assert!(!email_shape_ok("@example.com"));
        assert!(!email_shape_ok("ana@"));
        assert!(!email_shape_ok("ana@sindominio"));
        assert!(!email_shape_ok("ana@example."));
        assert!(!email_shape_ok("ana@.com"));
        assert!(!email_shape_ok("ana maria@example.com"));
        assert!(!email_shape_ok("ana@exam ple.com"));
        assert!(!email_shape_ok("ana@@example.com"));
    }
}
