use std::collections::HashSet;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{date_str, parse_date, parse_holiday_kind},
    models::{Holiday, HolidayInput, HolidayKind},
};

fn row_to_holiday(row: &Row) -> Result<Holiday> {
    let date: String = row.get("date")?;
    let kind: String = row.get("kind")?;

    Ok(Holiday {
        id: row.get("id")?,
        date: parse_date(&date, "date")?,
        kind: parse_holiday_kind(&kind)?,
        name: row.get("name")?,
    })
}

pub struct HolidayRepository<'a> {
    conn: &'a Connection,
}

impl<'a> HolidayRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or replace the holiday for a date (dates are unique).
    pub fn upsert(&self, input: &HolidayInput) -> Result<Holiday> {
        self.conn.execute(
            "INSERT INTO holidays (date, kind, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                 kind = excluded.kind,
                 name = excluded.name",
            params![date_str(input.date), input.kind.as_str(), input.name],
        )?;

        self.get_by_date(input.date)?
            .ok_or_else(|| anyhow!("holiday not found after upsert"))
    }

    pub fn delete(&self, date: NaiveDate) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM holidays WHERE date = ?1",
            params![date_str(date)],
        )?;
        if affected == 0 {
            return Err(anyhow!("no holiday on {date}"));
        }
        Ok(())
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, kind, name FROM holidays WHERE date = ?1")?;
        let mut rows = stmt.query(params![date_str(date)])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_holiday(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_for_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Holiday>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, kind, name FROM holidays
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date",
        )?;
        let mut rows = stmt.query(params![date_str(from), date_str(to)])?;
        let mut holidays = Vec::new();
        while let Some(row) = rows.next()? {
            holidays.push(row_to_holiday(row)?);
        }
        Ok(holidays)
    }

    /// The set of national holiday dates in [from, to], for the business-day
    /// predicate. Municipal holidays are advisory and excluded.
    pub fn national_dates_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM holidays WHERE kind = 'national' AND date BETWEEN ?1 AND ?2",
        )?;
        let mut rows = stmt.query(params![date_str(from), date_str(to)])?;
        let mut dates = HashSet::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            dates.insert(parse_date(&raw, "date")?);
        }
        Ok(dates)
    }
}

impl Database {
    pub async fn upsert_holiday(&self, input: HolidayInput) -> Result<Holiday> {
        self.execute(move |conn| HolidayRepository::new(conn).upsert(&input))
            .await
    }

    pub async fn delete_holiday(&self, date: NaiveDate) -> Result<()> {
        self.execute(move |conn| HolidayRepository::new(conn).delete(date))
            .await
    }

    pub async fn get_holiday(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        self.execute(move |conn| HolidayRepository::new(conn).get_by_date(date))
            .await
    }

    pub async fn list_holidays_for_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Holiday>> {
        self.execute(move |conn| HolidayRepository::new(conn).list_for_range(from, to))
            .await
    }
}
