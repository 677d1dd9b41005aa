//! Attachment repository: append-only access to the `attachments` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{self, Attachment, NewAttachment};

const SELECT: &str =
    "SELECT id, complaint_id, filename, original_name, mime_type, created_at FROM attachments";

fn from_row(row: &Row<'_>) -> Result<Attachment, rusqlite::Error> {
    let created_at: String = row.get(5)?;
    Ok(Attachment {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        filename: row.get(2)?,
        original_name: row.get(3)?,
        mime_type: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
    })
}

pub(super) fn insert_row(conn: &Connection, new: NewAttachment) -> Result<Attachment, DatabaseError> {
    let at = model::now();
    conn.execute(
        "INSERT INTO attachments (complaint_id, filename, original_name, mime_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.complaint_id,
            new.filename,
            new.original_name,
            new.mime_type,
            format_timestamp(&at),
        ],
    )?;
    Ok(Attachment {
        id: conn.last_insert_rowid(),
        complaint_id: new.complaint_id,
        filename: new.filename,
        original_name: new.original_name,
        mime_type: new.mime_type,
        created_at: at,
    })
}

/// Inserts attachment metadata for an existing complaint.
pub fn insert(db: &Database, new: NewAttachment) -> Result<Attachment, DatabaseError> {
    db.with_conn(|conn| insert_row(conn, new))
}

/// Finds an attachment by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Attachment>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} WHERE id = ?1", SELECT);
        Ok(conn.query_row(&sql, params![id], from_row).optional()?)
    })
}

/// Returns every attachment in id order.
pub fn all(db: &Database) -> Result<Vec<Attachment>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} ORDER BY id", SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Attachments belonging to one complaint, in id order.
pub fn for_complaint(db: &Database, complaint_id: i64) -> Result<Vec<Attachment>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} WHERE complaint_id = ?1 ORDER BY id", SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![complaint_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
