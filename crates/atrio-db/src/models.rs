//! Row structs for the SQLite tables. These map directly to stored columns;
//! the API layer converts them into the wire types in `atrio-types`.

#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NoticiaRow {
    pub id: String,
    pub titulo: String,
    pub contenido: String,
    pub imagen: Option<String>,
    pub fecha: String,
    pub publicado: bool,
}

#[derive(Debug, Clone)]
pub struct EventoRow {
    pub id: String,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub fecha_evento: String,
    pub lugar: Option<String>,
    pub imagen: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct GaleriaRow {
    pub id: String,
    pub titulo: Option<String>,
    pub imagen: String,
    pub categoria: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ContactoRow {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub mensaje: String,
    pub leido: bool,
    pub created_at: String,
}

/// Aggregate counts for the dashboard, collected in a single read pass.
#[derive(Debug, Clone, Copy)]
pub struct StatsRow {
    pub noticias: i64,
    pub eventos: i64,
    pub eventos_proximos: i64,
    pub galeria: i64,
    pub mensajes_no_leidos: i64,
    pub mensajes_total: i64,
}
