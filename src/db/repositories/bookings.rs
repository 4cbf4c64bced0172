use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{date_str, parse_date, parse_datetime, parse_optional_datetime},
    models::{Booking, BookingDetails, BookingInput, BookingStatusRow},
};

use crate::scheduling::is_completed_status;

fn row_to_booking(row: &Row) -> Result<Booking> {
    let due_date: String = row.get("due_date")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let completed_at: Option<String> = row.get("completed_at")?;

    Ok(Booking {
        id: row.get("id")?,
        due_date: parse_date(&due_date, "due_date")?,
        time_label: row.get("time_label")?,
        status_id: row.get("status_id")?,
        client_id: row.get("client_id")?,
        responsible: row.get("responsible")?,
        notes: row.get("notes")?,
        is_rectification: row.get::<_, i64>("is_rectification")? != 0,
        completed_at: parse_optional_datetime(completed_at, "completed_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn row_to_details(row: &Row) -> Result<BookingDetails> {
    let due_date: String = row.get("due_date")?;

    Ok(BookingDetails {
        id: row.get("id")?,
        due_date: parse_date(&due_date, "due_date")?,
        time_label: row.get("time_label")?,
        status_id: row.get("status_id")?,
        client_id: row.get("client_id")?,
        responsible: row.get("responsible")?,
        notes: row.get("notes")?,
        is_rectification: row.get::<_, i64>("is_rectification")? != 0,
        client_name: row.get("client_name")?,
        contact: row.get("contact")?,
        send_mode: row.get("send_mode")?,
        status_name: row.get("status_name")?,
        status_color: row.get("status_color")?,
    })
}

const BOOKING_COLUMNS: &str = "id, due_date, time_label, status_id, client_id, responsible, \
     notes, is_rectification, completed_at, created_at, updated_at";

const DETAILS_QUERY: &str = "SELECT b.id, b.due_date, b.time_label, b.status_id, b.client_id, \
            b.responsible, b.notes, b.is_rectification, \
            c.name AS client_name, c.contact, c.send_mode, \
            s.name AS status_name, s.color_hex AS status_color \
     FROM bookings b \
     JOIN clients c ON b.client_id = c.id \
     LEFT JOIN statuses s ON b.status_id = s.id";

pub struct BookingRepository<'a> {
    conn: &'a Connection,
}

impl<'a> BookingRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new booking. Fails if the (due_date, time_label) slot is
    /// already taken (UNIQUE index), which keeps the shared pool consistent
    /// even if two writers raced past the availability check.
    pub fn create(&self, input: &BookingInput) -> Result<Booking> {
        let now = Utc::now();
        let completed_at = self
            .status_completes(input.status_id)?
            .then(|| now.to_rfc3339());

        self.conn.execute(
            "INSERT INTO bookings (due_date, time_label, status_id, client_id, responsible, \
                                   notes, is_rectification, completed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                date_str(input.due_date),
                input.time_label,
                input.status_id,
                input.client_id,
                input.responsible,
                input.notes,
                input.is_rectification as i64,
                completed_at,
                now.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("booking not found after insert"))
    }

    /// Update a booking. Sets `completed_at` when the new status is in the
    /// completed set (keeping an existing timestamp) and clears it otherwise.
    pub fn update(&self, id: i64, input: &BookingInput) -> Result<Booking> {
        let existing = self
            .get_by_id(id)?
            .ok_or_else(|| anyhow!("booking {id} not found"))?;

        let now = Utc::now();
        let completed_at = if self.status_completes(input.status_id)? {
            Some(
                existing
                    .completed_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| now.to_rfc3339()),
            )
        } else {
            None
        };

        self.conn.execute(
            "UPDATE bookings
             SET due_date = ?1, time_label = ?2, status_id = ?3, client_id = ?4,
                 responsible = ?5, notes = ?6, is_rectification = ?7,
                 completed_at = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                date_str(input.due_date),
                input.time_label,
                input.status_id,
                input.client_id,
                input.responsible,
                input.notes,
                input.is_rectification as i64,
                completed_at,
                now.to_rfc3339(),
                id,
            ],
        )?;

        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("booking not found after update"))
    }

    /// Delete exactly this booking; never touches other client data.
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(anyhow!("booking {id} not found"));
        }
        Ok(())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_booking(row)?)),
            None => Ok(None),
        }
    }

    /// Joined day agenda, ordered by time label.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DETAILS_QUERY} WHERE b.due_date = ?1 ORDER BY b.time_label"
        ))?;
        let mut rows = stmt.query(params![date_str(date)])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(row_to_details(row)?);
        }
        Ok(bookings)
    }

    /// Joined listing for a date range (inclusive), ordered by date then
    /// time. Feeds the month report.
    pub fn list_for_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DETAILS_QUERY} WHERE b.due_date BETWEEN ?1 AND ?2 \
             ORDER BY b.due_date, b.time_label"
        ))?;
        let mut rows = stmt.query(params![date_str(from), date_str(to)])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(row_to_details(row)?);
        }
        Ok(bookings)
    }

    /// Bookings on `date` whose time label falls within [from, to]. Used by
    /// the reminder poller.
    pub fn list_in_interval(
        &self,
        date: NaiveDate,
        from_label: &str,
        to_label: &str,
    ) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DETAILS_QUERY} WHERE b.due_date = ?1 AND b.time_label BETWEEN ?2 AND ?3 \
             ORDER BY b.time_label"
        ))?;
        let mut rows = stmt.query(params![date_str(date), from_label, to_label])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(row_to_details(row)?);
        }
        Ok(bookings)
    }

    /// Status projection for a date range, for the month status aggregation.
    pub fn status_rows_for_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BookingStatusRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.due_date, s.name AS status_name, s.color_hex
             FROM bookings b
             LEFT JOIN statuses s ON b.status_id = s.id
             WHERE b.due_date BETWEEN ?1 AND ?2",
        )?;
        let mut rows = stmt.query(params![date_str(from), date_str(to)])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let due_date: String = row.get("due_date")?;
            out.push(BookingStatusRow {
                due_date: parse_date(&due_date, "due_date")?,
                status_name: row.get("status_name")?,
                color_hex: row.get("color_hex")?,
            });
        }
        Ok(out)
    }

    /// Time labels already booked on `date`.
    pub fn booked_labels_for_date(&self, date: NaiveDate) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT time_label FROM bookings WHERE due_date = ?1")?;
        let mut rows = stmt.query(params![date_str(date)])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(row.get(0)?);
        }
        Ok(labels)
    }

    /// Any booking of this client whose status name is "Pendente"
    /// (case-insensitive). Multiple matches are a data anomaly; the first
    /// one is returned.
    pub fn find_pending_for_client(&self, client_id: i64) -> Result<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT b.{} FROM bookings b \
             JOIN statuses s ON b.status_id = s.id \
             WHERE b.client_id = ?1 AND LOWER(s.name) = LOWER(?2) \
             ORDER BY b.due_date \
             LIMIT 1",
            BOOKING_COLUMNS.replace(", ", ", b.")
        ))?;
        let mut rows = stmt.query(params![client_id, crate::scheduling::PENDING_STATUS])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_booking(row)?)),
            None => Ok(None),
        }
    }

    /// Delete every pending booking of this client dated strictly after
    /// `today`. Run before a recurrence batch insert so re-saving a rule
    /// does not accumulate duplicate future pending bookings.
    pub fn delete_future_pending(&self, client_id: i64, today: NaiveDate) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM bookings
             WHERE client_id = ?1 AND due_date > ?2
               AND status_id IN (SELECT id FROM statuses WHERE LOWER(name) = LOWER(?3))",
            params![client_id, date_str(today), crate::scheduling::PENDING_STATUS],
        )?;
        Ok(affected)
    }

    pub fn find_status_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM statuses WHERE LOWER(name) = LOWER(?1)",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn status_completes(&self, status_id: Option<i64>) -> Result<bool> {
        let Some(status_id) = status_id else {
            return Ok(false);
        };
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM statuses WHERE id = ?1",
                params![status_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name.as_deref().map_or(false, is_completed_status))
    }
}

impl Database {
    pub async fn create_booking(&self, input: BookingInput) -> Result<Booking> {
        self.execute(move |conn| BookingRepository::new(conn).create(&input))
            .await
    }

    pub async fn update_booking(&self, id: i64, input: BookingInput) -> Result<Booking> {
        self.execute(move |conn| BookingRepository::new(conn).update(id, &input))
            .await
    }

    pub async fn delete_booking(&self, id: i64) -> Result<()> {
        self.execute(move |conn| BookingRepository::new(conn).delete(id))
            .await
    }

    pub async fn get_booking(&self, id: i64) -> Result<Option<Booking>> {
        self.execute(move |conn| BookingRepository::new(conn).get_by_id(id))
            .await
    }

    pub async fn list_day_agenda(&self, date: NaiveDate) -> Result<Vec<BookingDetails>> {
        self.execute(move |conn| BookingRepository::new(conn).list_for_date(date))
            .await
    }

    pub async fn list_bookings_for_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BookingDetails>> {
        self.execute(move |conn| BookingRepository::new(conn).list_for_range(from, to))
            .await
    }

    pub async fn list_bookings_in_interval(
        &self,
        date: NaiveDate,
        from_label: String,
        to_label: String,
    ) -> Result<Vec<BookingDetails>> {
        self.execute(move |conn| {
            BookingRepository::new(conn).list_in_interval(date, &from_label, &to_label)
        })
        .await
    }

    pub async fn find_pending_for_client(&self, client_id: i64) -> Result<Option<Booking>> {
        self.execute(move |conn| BookingRepository::new(conn).find_pending_for_client(client_id))
            .await
    }
}
