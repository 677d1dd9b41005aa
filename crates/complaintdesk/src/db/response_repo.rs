//! Response repository: append-only access to the `responses` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{self, NewResponse, Response};

const SELECT: &str = "SELECT id, complaint_id, content, is_from_admin, created_at FROM responses";

fn from_row(row: &Row<'_>) -> Result<Response, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    Ok(Response {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        content: row.get(2)?,
        is_from_admin: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
    })
}

pub(super) fn insert_row(conn: &Connection, new: NewResponse) -> Result<Response, DatabaseError> {
    let at = model::now();
    conn.execute(
        "INSERT INTO responses (complaint_id, content, is_from_admin, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            new.complaint_id,
            new.content,
            new.is_from_admin,
            format_timestamp(&at)
        ],
    )?;
    Ok(Response {
        id: conn.last_insert_rowid(),
        complaint_id: new.complaint_id,
        content: new.content,
        is_from_admin: new.is_from_admin,
        created_at: at,
    })
}

/// Appends a response to a complaint's thread.
pub fn insert(db: &Database, new: NewResponse) -> Result<Response, DatabaseError> {
    db.with_conn(|conn| insert_row(conn, new))
}

/// Finds a response by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Response>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} WHERE id = ?1", SELECT);
        Ok(conn.query_row(&sql, params![id], from_row).optional()?)
    })
}

/// Returns every response in id order.
pub fn all(db: &Database) -> Result<Vec<Response>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} ORDER BY id", SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// The thread of one complaint, oldest first.
pub fn for_complaint(db: &Database, complaint_id: i64) -> Result<Vec<Response>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "{} WHERE complaint_id = ?1 ORDER BY created_at ASC, id ASC",
            SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![complaint_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
