use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    models::{Client, ClientInput},
};

fn row_to_client(row: &Row) -> Result<Client> {
    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        send_mode: row.get("send_mode")?,
        contact: row.get("contact")?,
        issues_receipt: row.get::<_, i64>("issues_receipt")? != 0,
        counts_xmls: row.get::<_, i64>("counts_xmls")? != 0,
        tier: row.get("tier")?,
        notes: row.get("notes")?,
    })
}

const CLIENT_COLUMNS: &str =
    "id, name, send_mode, contact, issues_receipt, counts_xmls, tier, notes";

pub struct ClientRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ClientRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, input: &ClientInput) -> Result<Client> {
        self.conn.execute(
            "INSERT INTO clients (name, send_mode, contact, issues_receipt, counts_xmls, tier, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                input.name,
                input.send_mode,
                input.contact,
                input.issues_receipt as i64,
                input.counts_xmls as i64,
                input.tier,
                input.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("client not found after insert"))
    }

    pub fn update(&self, id: i64, input: &ClientInput) -> Result<Client> {
        let affected = self.conn.execute(
            "UPDATE clients
             SET name = ?1, send_mode = ?2, contact = ?3, issues_receipt = ?4,
                 counts_xmls = ?5, tier = ?6, notes = ?7
             WHERE id = ?8",
            params![
                input.name,
                input.send_mode,
                input.contact,
                input.issues_receipt as i64,
                input.counts_xmls as i64,
                input.tier,
                input.notes,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(anyhow!("client {id} not found"));
        }

        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("client not found after update"))
    }

    /// Delete a client. Bookings cascade at the schema level.
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(anyhow!("client {id} not found"));
        }
        Ok(())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_client(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> Result<Vec<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name"
        ))?;
        let mut rows = stmt.query([])?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(row_to_client(row)?);
        }
        Ok(clients)
    }

    /// Bulk insert used by the spreadsheet import dialog. Returns how many
    /// rows were inserted.
    pub fn create_many(&self, inputs: &[ClientInput]) -> Result<usize> {
        let mut inserted = 0;
        for input in inputs {
            self.create(input)?;
            inserted += 1;
        }
        Ok(inserted)
    }
}

impl Database {
    pub async fn create_client(&self, input: ClientInput) -> Result<Client> {
        self.execute(move |conn| ClientRepository::new(conn).create(&input))
            .await
    }

    pub async fn update_client(&self, id: i64, input: ClientInput) -> Result<Client> {
        self.execute(move |conn| ClientRepository::new(conn).update(id, &input))
            .await
    }

    pub async fn delete_client(&self, id: i64) -> Result<()> {
        self.execute(move |conn| ClientRepository::new(conn).delete(id))
            .await
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        self.execute(|conn| ClientRepository::new(conn).list()).await
    }

    pub async fn import_clients(&self, inputs: Vec<ClientInput>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let inserted = ClientRepository::new(&tx).create_many(&inputs)?;
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }
}
