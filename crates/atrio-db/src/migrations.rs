use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Runs the schema migrations. Every statement is idempotent so this is safe
/// to call on every startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS noticias (
            id TEXT PRIMARY KEY,
            titulo TEXT NOT NULL,
            contenido TEXT NOT NULL,
            imagen TEXT,
            fecha TEXT NOT NULL DEFAULT (datetime('now')),
            publicado INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS eventos (
            id TEXT PRIMARY KEY,
            titulo TEXT NOT NULL,
            descripcion TEXT,
            fecha_evento TEXT NOT NULL,
            lugar TEXT,
            imagen TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS galeria (
            id TEXT PRIMARY KEY,
            titulo TEXT,
            imagen TEXT NOT NULL,
            categoria TEXT NOT NULL DEFAULT 'general',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS contacto (
            id TEXT PRIMARY KEY,
            nombre TEXT NOT NULL,
            email TEXT NOT NULL,
            mensaje TEXT NOT NULL,
            leido INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_noticias_fecha ON noticias(fecha DESC);
        CREATE INDEX IF NOT EXISTS idx_eventos_fecha ON eventos(fecha_evento);
        CREATE INDEX IF NOT EXISTS idx_galeria_categoria ON galeria(categoria, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_contacto_leido ON contacto(leido, created_at DESC);
        "#,
    )?;

    info!("Database migrations complete");
    Ok(())
}
