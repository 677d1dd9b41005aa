//! Category repository: operations on the `categories` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::model::{Category, NewCategory};

fn from_row(row: &Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}

/// Inserts a new category.
pub fn insert(db: &Database, new: NewCategory) -> Result<Category, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO categories (name, description) VALUES (?1, ?2)",
            params![new.name, new.description],
        )?;
        Ok(Category {
            id: conn.last_insert_rowid(),
            name: new.name,
            description: new.description,
        })
    })
}

/// Finds a category by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Category>, DatabaseError> {
    db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT id, name, description FROM categories WHERE id = ?1",
                params![id],
                from_row,
            )
            .optional()?)
    })
}

/// Returns every category in id order.
pub fn all(db: &Database) -> Result<Vec<Category>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY id")?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
