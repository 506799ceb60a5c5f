use crate::Database;
use crate::models::{AdminRow, ContactoRow, EventoRow, GaleriaRow, NoticiaRow, StatsRow};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

impl Database {
    // -- Admins --

    pub fn create_admin(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO admins (id, username, password_hash) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin(conn, "username", username))
    }

    pub fn get_admin_by_id(&self, id: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin(conn, "id", id))
    }

    /// Returns false when no admin with that id exists.
    pub fn update_admin_password(&self, id: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE admins SET password_hash = ?2 WHERE id = ?1",
                (id, password_hash),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_admins(&self) -> Result<i64> {
        self.with_conn(|conn| count_rows(conn, "SELECT COUNT(*) FROM admins"))
    }

    // -- Noticias --

    pub fn create_noticia(
        &self,
        id: &str,
        titulo: &str,
        contenido: &str,
        imagen: Option<&str>,
        publicado: bool,
    ) -> Result<NoticiaRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO noticias (id, titulo, contenido, imagen, publicado) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, titulo, contenido, imagen, publicado],
            )?;
            query_noticia(conn, id)?.ok_or_else(|| anyhow!("Noticia {} missing after insert", id))
        })
    }

    pub fn get_noticia(&self, id: &str) -> Result<Option<NoticiaRow>> {
        self.with_conn(|conn| query_noticia(conn, id))
    }

    /// Returns the page plus the total count under the same filter.
    pub fn list_noticias(
        &self,
        limit: u32,
        offset: u32,
        public_only: bool,
    ) -> Result<(Vec<NoticiaRow>, i64)> {
        self.with_conn(|conn| {
            let filter = if public_only { " WHERE publicado = 1" } else { "" };
            let sql = format!(
                "SELECT id, titulo, contenido, imagen, fecha, publicado FROM noticias{} \
                 ORDER BY fecha DESC LIMIT ?1 OFFSET ?2",
                filter
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], noticia_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let total = count_rows(conn, &format!("SELECT COUNT(*) FROM noticias{}", filter))?;
            Ok((rows, total))
        })
    }

    /// Partial update: `None` fields keep their stored value. Returns the
    /// updated row, or `None` when the id does not exist.
    pub fn update_noticia(
        &self,
        id: &str,
        titulo: Option<&str>,
        contenido: Option<&str>,
        imagen: Option<&str>,
        publicado: Option<bool>,
    ) -> Result<Option<NoticiaRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE noticias SET titulo = COALESCE(?2, titulo), \
                 contenido = COALESCE(?3, contenido), imagen = COALESCE(?4, imagen), \
                 publicado = COALESCE(?5, publicado) WHERE id = ?1",
                rusqlite::params![id, titulo, contenido, imagen, publicado],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_noticia(conn, id)
        })
    }

    /// Deletes and returns the row so callers can clean up its image file.
    pub fn delete_noticia(&self, id: &str) -> Result<Option<NoticiaRow>> {
        self.with_conn_mut(|conn| match query_noticia(conn, id)? {
            Some(row) => {
                conn.execute("DELETE FROM noticias WHERE id = ?1", [id])?;
                Ok(Some(row))
            }
            None => Ok(None),
        })
    }

    // -- Eventos --

    pub fn create_evento(
        &self,
        id: &str,
        titulo: &str,
        descripcion: Option<&str>,
        fecha_evento: &str,
        lugar: Option<&str>,
        imagen: Option<&str>,
    ) -> Result<EventoRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO eventos (id, titulo, descripcion, fecha_evento, lugar, imagen) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, titulo, descripcion, fecha_evento, lugar, imagen],
            )?;
            query_evento(conn, id)?.ok_or_else(|| anyhow!("Evento {} missing after insert", id))
        })
    }

    pub fn get_evento(&self, id: &str) -> Result<Option<EventoRow>> {
        self.with_conn(|conn| query_evento(conn, id))
    }

    /// Events sort soonest-first. `upcoming` keeps only rows at or after now.
    pub fn list_eventos(
        &self,
        limit: u32,
        offset: u32,
        upcoming: bool,
    ) -> Result<(Vec<EventoRow>, i64)> {
        self.with_conn(|conn| {
            let filter = if upcoming {
                " WHERE fecha_evento >= datetime('now')"
            } else {
                ""
            };
            let sql = format!(
                "SELECT id, titulo, descripcion, fecha_evento, lugar, imagen, created_at \
                 FROM eventos{} ORDER BY fecha_evento ASC LIMIT ?1 OFFSET ?2",
                filter
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], evento_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let total = count_rows(conn, &format!("SELECT COUNT(*) FROM eventos{}", filter))?;
            Ok((rows, total))
        })
    }

    pub fn update_evento(
        &self,
        id: &str,
        titulo: Option<&str>,
        descripcion: Option<&str>,
        fecha_evento: Option<&str>,
        lugar: Option<&str>,
        imagen: Option<&str>,
    ) -> Result<Option<EventoRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE eventos SET titulo = COALESCE(?2, titulo), \
                 descripcion = COALESCE(?3, descripcion), fecha_evento = COALESCE(?4, fecha_evento), \
                 lugar = COALESCE(?5, lugar), imagen = COALESCE(?6, imagen) WHERE id = ?1",
                rusqlite::params![id, titulo, descripcion, fecha_evento, lugar, imagen],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_evento(conn, id)
        })
    }

    pub fn delete_evento(&self, id: &str) -> Result<Option<EventoRow>> {
        self.with_conn_mut(|conn| match query_evento(conn, id)? {
            Some(row) => {
                conn.execute("DELETE FROM eventos WHERE id = ?1", [id])?;
                Ok(Some(row))
            }
            None => Ok(None),
        })
    }

    // -- Galeria --

    pub fn create_galeria_imagen(
        &self,
        id: &str,
        titulo: Option<&str>,
        imagen: &str,
        categoria: &str,
    ) -> Result<GaleriaRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO galeria (id, titulo, imagen, categoria) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, titulo, imagen, categoria],
            )?;
            query_galeria_imagen(conn, id)?
                .ok_or_else(|| anyhow!("Imagen {} missing after insert", id))
        })
    }

    pub fn get_galeria_imagen(&self, id: &str) -> Result<Option<GaleriaRow>> {
        self.with_conn(|conn| query_galeria_imagen(conn, id))
    }

    pub fn list_galeria(
        &self,
        limit: u32,
        offset: u32,
        categoria: Option<&str>,
    ) -> Result<(Vec<GaleriaRow>, i64)> {
        self.with_conn(|conn| match categoria {
            Some(cat) => {
                let mut stmt = conn.prepare(
                    "SELECT id, titulo, imagen, categoria, created_at FROM galeria \
                     WHERE categoria = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![cat, limit, offset], galeria_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM galeria WHERE categoria = ?1",
                    [cat],
                    |row| row.get(0),
                )?;
                Ok((rows, total))
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, titulo, imagen, categoria, created_at FROM galeria \
                     ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![limit, offset], galeria_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let total = count_rows(conn, "SELECT COUNT(*) FROM galeria")?;
                Ok((rows, total))
            }
        })
    }

    pub fn galeria_categorias(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT categoria FROM galeria ORDER BY categoria")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Metadata-only update; the stored file path never changes here.
    pub fn update_galeria_meta(
        &self,
        id: &str,
        titulo: Option<&str>,
        categoria: Option<&str>,
    ) -> Result<Option<GaleriaRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE galeria SET titulo = COALESCE(?2, titulo), \
                 categoria = COALESCE(?3, categoria) WHERE id = ?1",
                rusqlite::params![id, titulo, categoria],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_galeria_imagen(conn, id)
        })
    }

    pub fn delete_galeria_imagen(&self, id: &str) -> Result<Option<GaleriaRow>> {
        self.with_conn_mut(|conn| match query_galeria_imagen(conn, id)? {
            Some(row) => {
                conn.execute("DELETE FROM galeria WHERE id = ?1", [id])?;
                Ok(Some(row))
            }
            None => Ok(None),
        })
    }

    // -- Contacto --

    pub fn create_mensaje(
        &self,
        id: &str,
        nombre: &str,
        email: &str,
        mensaje: &str,
    ) -> Result<ContactoRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO contacto (id, nombre, email, mensaje) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, nombre, email, mensaje],
            )?;
            query_mensaje(conn, id)?.ok_or_else(|| anyhow!("Mensaje {} missing after insert", id))
        })
    }

    pub fn get_mensaje(&self, id: &str) -> Result<Option<ContactoRow>> {
        self.with_conn(|conn| query_mensaje(conn, id))
    }

    /// Returns (page, total under filter, unread count across all rows).
    pub fn list_mensajes(
        &self,
        limit: u32,
        offset: u32,
        unread_only: bool,
    ) -> Result<(Vec<ContactoRow>, i64, i64)> {
        self.with_conn(|conn| {
            let filter = if unread_only { " WHERE leido = 0" } else { "" };
            let sql = format!(
                "SELECT id, nombre, email, mensaje, leido, created_at FROM contacto{} \
                 ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                filter
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], mensaje_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let total = count_rows(conn, &format!("SELECT COUNT(*) FROM contacto{}", filter))?;
            let unread = count_rows(conn, "SELECT COUNT(*) FROM contacto WHERE leido = 0")?;
            Ok((rows, total, unread))
        })
    }

    /// Returns false when no message with that id exists.
    pub fn mark_mensaje_leido(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("UPDATE contacto SET leido = 1 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Returns how many messages flipped from unread to read.
    pub fn mark_all_leidos(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("UPDATE contacto SET leido = 1 WHERE leido = 0", [])?;
            Ok(changed)
        })
    }

    pub fn delete_mensaje(&self, id: &str) -> Result<Option<ContactoRow>> {
        self.with_conn_mut(|conn| match query_mensaje(conn, id)? {
            Some(row) => {
                conn.execute("DELETE FROM contacto WHERE id = ?1", [id])?;
                Ok(Some(row))
            }
            None => Ok(None),
        })
    }

    // -- Stats --

    pub fn stats(&self) -> Result<StatsRow> {
        self.with_conn(|conn| {
            Ok(StatsRow {
                noticias: count_rows(conn, "SELECT COUNT(*) FROM noticias")?,
                eventos: count_rows(conn, "SELECT COUNT(*) FROM eventos")?,
                eventos_proximos: count_rows(
                    conn,
                    "SELECT COUNT(*) FROM eventos WHERE fecha_evento >= datetime('now')",
                )?,
                galeria: count_rows(conn, "SELECT COUNT(*) FROM galeria")?,
                mensajes_no_leidos: count_rows(
                    conn,
                    "SELECT COUNT(*) FROM contacto WHERE leido = 0",
                )?,
                mensajes_total: count_rows(conn, "SELECT COUNT(*) FROM contacto")?,
            })
        })
    }
}

fn query_admin(conn: &Connection, column: &str, value: &str) -> Result<Option<AdminRow>> {
    // column is one of two hardcoded call sites, never user input
    let sql = format!(
        "SELECT id, username, password_hash, created_at FROM admins WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(AdminRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_noticia(conn: &Connection, id: &str) -> Result<Option<NoticiaRow>> {
    let mut stmt = conn
        .prepare("SELECT id, titulo, contenido, imagen, fecha, publicado FROM noticias WHERE id = ?1")?;
    let row = stmt.query_row([id], noticia_from_row).optional()?;
    Ok(row)
}

fn query_evento(conn: &Connection, id: &str) -> Result<Option<EventoRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, titulo, descripcion, fecha_evento, lugar, imagen, created_at \
         FROM eventos WHERE id = ?1",
    )?;
    let row = stmt.query_row([id], evento_from_row).optional()?;
    Ok(row)
}

fn query_galeria_imagen(conn: &Connection, id: &str) -> Result<Option<GaleriaRow>> {
    let mut stmt = conn
        .prepare("SELECT id, titulo, imagen, categoria, created_at FROM galeria WHERE id = ?1")?;
    let row = stmt.query_row([id], galeria_from_row).optional()?;
    Ok(row)
}

fn query_mensaje(conn: &Connection, id: &str) -> Result<Option<ContactoRow>> {
    let mut stmt = conn
        .prepare("SELECT id, nombre, email, mensaje, leido, created_at FROM contacto WHERE id = ?1")?;
    let row = stmt.query_row([id], mensaje_from_row).optional()?;
    Ok(row)
}

fn noticia_from_row(row: &rusqlite::Row) -> rusqlite::Result<NoticiaRow> {
    Ok(NoticiaRow {
        id: row.get(0)?,
        titulo: row.get(1)?,
        contenido: row.get(2)?,
        imagen: row.get(3)?,
        fecha: row.get(4)?,
        publicado: row.get(5)?,
    })
}

fn evento_from_row(row: &rusqlite::Row) -> rusqlite::Result<EventoRow> {
    Ok(EventoRow {
        id: row.get(0)?,
        titulo: row.get(1)?,
        descripcion: row.get(2)?,
        fecha_evento: row.get(3)?,
        lugar: row.get(4)?,
        imagen: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn galeria_from_row(row: &rusqlite::Row) -> rusqlite::Result<GaleriaRow> {
    Ok(GaleriaRow {
        id: row.get(0)?,
        titulo: row.get(1)?,
        imagen: row.get(2)?,
        categoria: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn mensaje_from_row(row: &rusqlite::Row) -> rusqlite::Result<ContactoRow> {
    Ok(ContactoRow {
        id: row.get(0)?,
        nombre: row.get(1)?,
        email: row.get(2)?,
        mensaje: row.get(3)?,
        leido: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn count_rows(conn: &Connection, sql: &str) -> Result<i64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_db() -> Database {
        let dir = std::env::temp_dir().join("atrio_db_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.db", Uuid::new_v4()));
        Database::open(&path).unwrap()
    }

    fn seed_noticia(db: &Database, titulo: &str, fecha: &str, publicado: bool) -> String {
        let id = Uuid::new_v4().to_string();
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO noticias (id, titulo, contenido, fecha, publicado) VALUES (?1, ?2, 'cuerpo', ?3, ?4)",
                rusqlite::params![id, titulo, fecha, publicado],
            )?;
            Ok(())
        })
        .unwrap();
        id
    }

    #[test]
    fn create_and_fetch_noticia() {
        let db = test_db();
        let id = Uuid::new_v4().to_string();
        let created = db
            .create_noticia(&id, "Nueva sede", "Texto completo", None, true)
            .unwrap();

        assert_eq!(created.id, id);
        assert_eq!(created.titulo, "Nueva sede");
        assert!(created.publicado);
        assert!(created.imagen.is_none());
        assert!(!created.fecha.is_empty());

        let fetched = db.get_noticia(&id).unwrap().unwrap();
        assert_eq!(fetched.titulo, "Nueva sede");

        assert!(db.get_noticia("no-such-id").unwrap().is_none());
    }

    #[test]
    fn update_noticia_keeps_omitted_fields() {
        let db = test_db();
        let id = Uuid::new_v4().to_string();
        db.create_noticia(&id, "Original", "Contenido", Some("/uploads/a.jpg"), true)
            .unwrap();

        let updated = db
            .update_noticia(&id, Some("Corregido"), None, None, None)
            .unwrap()
            .unwrap();

        assert_eq!(updated.titulo, "Corregido");
        assert_eq!(updated.contenido, "Contenido");
        assert_eq!(updated.imagen.as_deref(), Some("/uploads/a.jpg"));
        assert!(updated.publicado);

        let toggled = db
            .update_noticia(&id, None, None, None, Some(false))
            .unwrap()
            .unwrap();
        assert!(!toggled.publicado);

        assert!(db.update_noticia("missing", Some("x"), None, None, None).unwrap().is_none());
    }

    #[test]
    fn list_noticias_filters_and_paginates() {
        let db = test_db();
        seed_noticia(&db, "quinta", "2025-01-05 10:00:00", true);
        seed_noticia(&db, "cuarta", "2025-01-04 10:00:00", true);
        seed_noticia(&db, "tercera", "2025-01-03 10:00:00", false);
        seed_noticia(&db, "segunda", "2025-01-02 10:00:00", true);
        seed_noticia(&db, "primera", "2025-01-01 10:00:00", true);

        // Default view hides the draft
        let (publicas, total) = db.list_noticias(100, 0, true).unwrap();
        assert_eq!(total, 4);
        assert_eq!(publicas.len(), 4);
        assert!(publicas.iter().all(|n| n.publicado));
        assert_eq!(publicas[0].titulo, "quinta");

        // Admin view pages through everything, newest first
        let (page, total) = db.list_noticias(2, 2, false).unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].titulo, "tercera");
        assert_eq!(page[1].titulo, "segunda");
    }

    #[test]
    fn delete_noticia_returns_row() {
        let db = test_db();
        let id = Uuid::new_v4().to_string();
        db.create_noticia(&id, "Efimera", "Texto", Some("/uploads/x.png"), true)
            .unwrap();

        let deleted = db.delete_noticia(&id).unwrap().unwrap();
        assert_eq!(deleted.imagen.as_deref(), Some("/uploads/x.png"));
        assert!(db.get_noticia(&id).unwrap().is_none());
        assert!(db.delete_noticia(&id).unwrap().is_none());
    }

    #[test]
    fn eventos_upcoming_filter_and_order() {
        let db = test_db();
        let pasado = Uuid::new_v4().to_string();
        let futuro = Uuid::new_v4().to_string();
        db.create_evento(&pasado, "Asamblea pasada", None, "2000-06-01 18:00:00", None, None)
            .unwrap();
        db.create_evento(&futuro, "Asamblea futura", Some("Anual"), "2099-06-01 18:00:00", Some("Salon"), None)
            .unwrap();

        let (todos, total) = db.list_eventos(100, 0, false).unwrap();
        assert_eq!(total, 2);
        assert_eq!(todos[0].id, pasado);
        assert_eq!(todos[1].id, futuro);

        let (proximos, total) = db.list_eventos(100, 0, true).unwrap();
        assert_eq!(total, 1);
        assert_eq!(proximos[0].id, futuro);
        assert_eq!(proximos[0].descripcion.as_deref(), Some("Anual"));
    }

    #[test]
    fn galeria_categoria_filter_and_distinct() {
        let db = test_db();
        db.create_galeria_imagen(&Uuid::new_v4().to_string(), Some("a"), "/uploads/a.jpg", "eventos")
            .unwrap();
        db.create_galeria_imagen(&Uuid::new_v4().to_string(), None, "/uploads/b.jpg", "general")
            .unwrap();
        db.create_galeria_imagen(&Uuid::new_v4().to_string(), Some("c"), "/uploads/c.jpg", "eventos")
            .unwrap();

        let (todas, total) = db.list_galeria(100, 0, None).unwrap();
        assert_eq!(total, 3);
        assert_eq!(todas.len(), 3);

        let (eventos, total) = db.list_galeria(100, 0, Some("eventos")).unwrap();
        assert_eq!(total, 2);
        assert!(eventos.iter().all(|i| i.categoria == "eventos"));

        assert_eq!(db.galeria_categorias().unwrap(), vec!["eventos", "general"]);
    }

    #[test]
    fn galeria_meta_update_can_clear_titulo() {
        let db = test_db();
        let id = Uuid::new_v4().to_string();
        db.create_galeria_imagen(&id, Some("Procesion"), "/uploads/p.jpg", "general")
            .unwrap();

        let updated = db
            .update_galeria_meta(&id, Some(""), Some("fiestas"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.titulo.as_deref(), Some(""));
        assert_eq!(updated.categoria, "fiestas");
        assert_eq!(updated.imagen, "/uploads/p.jpg");
    }

    #[test]
    fn contacto_read_flags() {
        let db = test_db();
        let primero = Uuid::new_v4().to_string();
        db.create_mensaje(&primero, "Ana", "ana@example.com", "Hola").unwrap();
        db.create_mensaje(&Uuid::new_v4().to_string(), "Luis", "luis@example.com", "Consulta")
            .unwrap();
        db.create_mensaje(&Uuid::new_v4().to_string(), "Marta", "marta@example.com", "Gracias")
            .unwrap();

        assert!(db.mark_mensaje_leido(&primero).unwrap());
        assert!(!db.mark_mensaje_leido("missing").unwrap());

        let (_, total, unread) = db.list_mensajes(100, 0, false).unwrap();
        assert_eq!(total, 3);
        assert_eq!(unread, 2);

        let (solo_no_leidos, total, _) = db.list_mensajes(100, 0, true).unwrap();
        assert_eq!(total, 2);
        assert!(solo_no_leidos.iter().all(|m| !m.leido));

        assert_eq!(db.mark_all_leidos().unwrap(), 2);
        assert_eq!(db.mark_all_leidos().unwrap(), 0);
        let (_, _, unread) = db.list_mensajes(100, 0, false).unwrap();
        assert_eq!(unread, 0);
    }

    #[test]
    fn stats_counts_everything() {
        let db = test_db();
        seed_noticia(&db, "n1", "2025-01-01 10:00:00", true);
        seed_noticia(&db, "n2", "2025-01-02 10:00:00", false);
        db.create_evento(&Uuid::new_v4().to_string(), "pasado", None, "2000-01-01 10:00:00", None, None)
            .unwrap();
        db.create_evento(&Uuid::new_v4().to_string(), "futuro", None, "2099-01-01 10:00:00", None, None)
            .unwrap();
        db.create_galeria_imagen(&Uuid::new_v4().to_string(), None, "/uploads/g.jpg", "general")
            .unwrap();
        let leido = Uuid::new_v4().to_string();
        db.create_mensaje(&leido, "Ana", "ana@example.com", "Hola").unwrap();
        db.create_mensaje(&Uuid::new_v4().to_string(), "Luis", "luis@example.com", "Otra")
            .unwrap();
        db.mark_mensaje_leido(&leido).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.noticias, 2);
        assert_eq!(stats.eventos, 2);
        assert_eq!(stats.eventos_proximos, 1);
        assert_eq!(stats.galeria, 1);
        assert_eq!(stats.mensajes_no_leidos, 1);
        assert_eq!(stats.mensajes_total, 2);
    }

    #[test]
    fn admin_password_update() {
        let db = test_db();
        let id = Uuid::new_v4().to_string();
        db.create_admin(&id, "admin", "hash-v1").unwrap();

        assert_eq!(db.count_admins().unwrap(), 1);
        assert!(db.update_admin_password(&id, "hash-v2").unwrap());
        assert!(!db.update_admin_password("missing", "hash-v3").unwrap());

        let row = db.get_admin_by_username("admin").unwrap().unwrap();
        assert_eq!(row.password_hash, "hash-v2");
        assert_eq!(row.id, id);
        assert!(db.get_admin_by_username("nadie").unwrap().is_none());
        assert_eq!(db.get_admin_by_id(&id).unwrap().unwrap().username, "admin");
    }
}
