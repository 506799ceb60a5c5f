use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AdminUser, Evento, GaleriaImagen, MensajeContacto, Noticia};

// -- JWT Claims --

/// JWT claims shared between token issuance (login) and the authorization
/// middleware. Canonical definition lives here in atrio-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

/// Fields are optional so missing ones surface as a 400 with a readable
/// message instead of a body-deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AdminUser,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: AdminUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// -- Noticias --

#[derive(Debug, Serialize)]
pub struct NoticiasResponse {
    pub noticias: Vec<Noticia>,
    pub total: i64,
}

// -- Eventos --

#[derive(Debug, Serialize)]
pub struct EventosResponse {
    pub eventos: Vec<Evento>,
    pub total: i64,
}

// -- Galería --

#[derive(Debug, Serialize)]
pub struct GaleriaResponse {
    pub imagenes: Vec<GaleriaImagen>,
    pub total: i64,
    pub categorias: Vec<String>,
}

/// Metadata-only update; the stored file is never replaced through this.
#[derive(Debug, Deserialize)]
pub struct UpdateGaleriaRequest {
    pub titulo: Option<String>,
    pub categoria: Option<String>,
}

// -- Contacto --

#[derive(Debug, Deserialize)]
pub struct ContactoRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub mensaje: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MensajesResponse {
    pub mensajes: Vec<MensajeContacto>,
    pub total: i64,
    pub unread: i64,
}

// -- Stats --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub noticias: i64,
    pub eventos: i64,
    pub eventos_proximos: i64,
    pub galeria: i64,
    pub mensajes_no_leidos: i64,
    pub mensajes_total: i64,
}
