//! Complaint repository: operations on the `complaints` table.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{attachment_repo, format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{self, Attachment, AttachmentFile, Complaint, ComplaintStatus, NewComplaint};
use crate::store::{check_complaint_replacement, RecordKind, StoreError};

const COLUMNS: &str = "id, tracking_id, title, description, location, category_id, status,
     is_published, is_archived, name, nik, email, phone, address, access_token,
     rejection_reason, closed_at, created_at, updated_at";

fn from_row(row: &Row<'_>) -> Result<Complaint, rusqlite::Error> {
    let status_raw: String = row.get(6)?;
    let status = status_raw
        .parse::<ComplaintStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    let closed_at: Option<String> = row.get(16)?;
    let created_at: String = row.get(17)?;
    let updated_at: String = row.get(18)?;

    Ok(Complaint {
        id: row.get(0)?,
        tracking_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        category_id: row.get(5)?,
        status,
        is_published: row.get(7)?,
        is_archived: row.get(8)?,
        name: row.get(9)?,
        nik: row.get(10)?,
        email: row.get(11)?,
        phone: row.get(12)?,
        address: row.get(13)?,
        access_token: row.get(14)?,
        rejection_reason: row.get(15)?,
        closed_at: closed_at.map(|s| parse_timestamp(16, &s)).transpose()?,
        created_at: parse_timestamp(17, &created_at)?,
        updated_at: parse_timestamp(18, &updated_at)?,
    })
}

fn select_by_id(conn: &Connection, id: i64) -> Result<Option<Complaint>, DatabaseError> {
    let sql = format!("SELECT {} FROM complaints WHERE id = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], from_row).optional()?)
}

fn insert_row(conn: &Connection, new: NewComplaint) -> Result<Complaint, DatabaseError> {
    let at = model::now();
    let ts = format_timestamp(&at);
    conn.execute(
        "INSERT INTO complaints (tracking_id, title, description, location, category_id,
         status, is_published, is_archived, name, nik, email, phone, address, access_token,
         rejection_reason, closed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8, ?9, ?10, ?11, ?12, NULL, NULL, ?13, ?13)",
        params![
            new.tracking_id,
            new.title,
            new.description,
            new.location,
            new.category_id,
            ComplaintStatus::Pending.as_str(),
            new.name,
            new.nik,
            new.email,
            new.phone,
            new.address,
            new.access_token,
            ts,
        ],
    )?;
    Ok(new.into_complaint(conn.last_insert_rowid(), at))
}

pub(super) fn replace_row(
    conn: &Connection,
    id: i64,
    complaint: Complaint,
) -> Result<Complaint, StoreError> {
    let existing = select_by_id(conn, id)?.ok_or(StoreError::Missing {
        kind: RecordKind::Complaint,
        id,
    })?;
    check_complaint_replacement(id, &existing, &complaint)?;

    conn.execute(
        "UPDATE complaints SET title=?2, description=?3, location=?4, category_id=?5,
         status=?6, is_published=?7, is_archived=?8, name=?9, nik=?10, email=?11,
         phone=?12, address=?13, rejection_reason=?14, closed_at=?15, updated_at=?16
         WHERE id=?1",
        params![
            id,
            complaint.title,
            complaint.description,
            complaint.location,
            complaint.category_id,
            complaint.status.as_str(),
            complaint.is_published,
            complaint.is_archived,
            complaint.name,
            complaint.nik,
            complaint.email,
            complaint.phone,
            complaint.address,
            complaint.rejection_reason,
            complaint.closed_at.as_ref().map(format_timestamp),
            format_timestamp(&complaint.updated_at),
        ],
    )
    .map_err(DatabaseError::from)?;
    Ok(complaint)
}

/// Inserts a new complaint and returns the stored record.
pub fn insert(db: &Database, new: NewComplaint) -> Result<Complaint, DatabaseError> {
    db.with_conn(|conn| insert_row(conn, new))
}

/// Inserts a complaint and its attachment rows in one transaction.
pub fn insert_with_attachments(
    db: &Database,
    new: NewComplaint,
    files: Vec<AttachmentFile>,
) -> Result<(Complaint, Vec<Attachment>), StoreError> {
    db.in_transaction(|conn| {
        let complaint = insert_row(conn, new)?;
        let attachments = files
            .into_iter()
            .map(|f| attachment_repo::insert_row(conn, f.for_complaint(complaint.id)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((complaint, attachments))
    })
}

/// Overwrites every mutable column of an existing complaint.
///
/// The existence check, identity check and update run in one transaction.
pub fn replace(db: &Database, id: i64, complaint: Complaint) -> Result<Complaint, StoreError> {
    db.in_transaction(|conn| replace_row(conn, id, complaint))
}

/// Finds a complaint by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Complaint>, DatabaseError> {
    db.with_conn(|conn| select_by_id(conn, id))
}

/// Returns every complaint matching `predicate`, in id order.
pub fn find(
    db: &Database,
    predicate: &dyn Fn(&Complaint) -> bool,
) -> Result<Vec<Complaint>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("SELECT {} FROM complaints ORDER BY id ASC", COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter(|c| predicate(c)).collect())
    })
}

/// Looks a complaint up by access token using the column index.
pub fn find_by_token(db: &Database, token: &str) -> Result<Option<Complaint>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT {} FROM complaints WHERE access_token = ?1 ORDER BY id ASC LIMIT 1",
            COLUMNS
        );
        Ok(conn.query_row(&sql, params![token], from_row).optional()?)
    })
}
