use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    models::{Status, StatusInput},
};

/// Calendar colors must be hex (#RRGGBB or #RRGGBBAA).
pub fn validate_color(color: &str) -> Result<()> {
    if !color.starts_with('#') {
        bail!("Invalid color format. Must be hex (#RRGGBB)");
    }

    let hex_part = &color[1..];
    if hex_part.len() != 6 && hex_part.len() != 8 {
        bail!("Invalid color format. Must be hex (#RRGGBB or #RRGGBBAA)");
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color format. Must be hex (#RRGGBB)");
    }

    Ok(())
}

fn row_to_status(row: &Row) -> Result<Status> {
    Ok(Status {
        id: row.get("id")?,
        name: row.get("name")?,
        color_hex: row.get("color_hex")?,
    })
}

pub struct StatusRepository<'a> {
    conn: &'a Connection,
}

impl<'a> StatusRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, input: &StatusInput) -> Result<Status> {
        validate_color(&input.color_hex)?;

        self.conn.execute(
            "INSERT INTO statuses (name, color_hex) VALUES (?1, ?2)",
            params![input.name, input.color_hex],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("status not found after insert"))
    }

    pub fn update(&self, id: i64, input: &StatusInput) -> Result<Status> {
        validate_color(&input.color_hex)?;

        let affected = self.conn.execute(
            "UPDATE statuses SET name = ?1, color_hex = ?2 WHERE id = ?3",
            params![input.name, input.color_hex, id],
        )?;
        if affected == 0 {
            return Err(anyhow!("status {id} not found"));
        }

        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("status not found after update"))
    }

    /// Delete a status. Bookings referencing it keep existing with a null
    /// status (ON DELETE SET NULL).
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM statuses WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(anyhow!("status {id} not found"));
        }
        Ok(())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Status>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color_hex FROM statuses WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_status(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> Result<Vec<Status>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color_hex FROM statuses ORDER BY name")?;
        let mut rows = stmt.query([])?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next()? {
            statuses.push(row_to_status(row)?);
        }
        Ok(statuses)
    }
}

impl Database {
    pub async fn create_status(&self, input: StatusInput) -> Result<Status> {
        self.execute(move |conn| StatusRepository::new(conn).create(&input))
            .await
    }

    pub async fn update_status(&self, id: i64, input: StatusInput) -> Result<Status> {
        self.execute(move |conn| StatusRepository::new(conn).update(id, &input))
            .await
    }

    pub async fn delete_status(&self, id: i64) -> Result<()> {
        self.execute(move |conn| StatusRepository::new(conn).delete(id))
            .await
    }

    pub async fn list_statuses(&self) -> Result<Vec<Status>> {
        self.execute(|conn| StatusRepository::new(conn).list()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("in-memory DB");
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        run_migrations(&mut conn).expect("migrations");
        conn
    }

    #[test]
    fn default_statuses_are_seeded() {
        let conn = test_conn();
        let statuses = StatusRepository::new(&conn).list().unwrap();
        assert_eq!(statuses.len(), 8);
        let pendente = statuses.iter().find(|s| s.name == "Pendente").unwrap();
        assert_eq!(pendente.color_hex, "#ffc107");
    }

    #[test]
    fn rejects_malformed_colors() {
        let conn = test_conn();
        let repo = StatusRepository::new(&conn);

        for bad in ["ffc107", "#ffc10", "#ggg107", "#ffc1077"] {
            let result = repo.create(&StatusInput {
                name: format!("Teste {bad}"),
                color_hex: bad.into(),
            });
            assert!(result.is_err(), "color {bad} should be rejected");
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let conn = test_conn();
        let repo = StatusRepository::new(&conn);
        let result = repo.create(&StatusInput {
            name: "Pendente".into(),
            color_hex: "#000000".into(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn deleting_a_status_nulls_bookings() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO clients (name, send_mode, contact) VALUES ('Acme', 'Nosso', 'a@b.c')",
            [],
        )
        .unwrap();
        let client_id = conn.last_insert_rowid();
        let repo = StatusRepository::new(&conn);
        let status = repo
            .create(&StatusInput {
                name: "Provisório".into(),
                color_hex: "#123456".into(),
            })
            .unwrap();
        conn.execute(
            "INSERT INTO bookings (due_date, time_label, status_id, client_id, created_at, updated_at)
             VALUES ('2025-03-10', '09:30', ?1, ?2, '2025-03-01T00:00:00Z', '2025-03-01T00:00:00Z')",
            params![status.id, client_id],
        )
        .unwrap();

        repo.delete(status.id).unwrap();

        let status_id: Option<i64> = conn
            .query_row("SELECT status_id FROM bookings LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(status_id, None);
    }
}
