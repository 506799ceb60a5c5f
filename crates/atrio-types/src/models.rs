use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of an administrator; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Noticia {
    pub id: Uuid,
    pub titulo: String,
    pub contenido: String,
    pub imagen: Option<String>,
    pub fecha: DateTime<Utc>,
    pub publicado: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evento {
    pub id: Uuid,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_evento: DateTime<Utc>,
    pub lugar: Option<String>,
    pub imagen: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaleriaImagen {
    pub id: Uuid,
    pub titulo: Option<String>,
    pub imagen: String,
    pub categoria: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MensajeContacto {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    pub mensaje: String,
    pub leido: bool,
    pub created_at: DateTime<Utc>,
}
