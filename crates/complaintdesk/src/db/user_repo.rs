//! User repository: admin accounts in the `users` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DatabaseError};
use crate::model::{self, NewUser, User};

const SELECT: &str = "SELECT id, username, password_hash, name, role, created_at FROM users";

fn from_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    let created_at: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        role: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
    })
}

/// Inserts a user. Fails on a case-insensitive username collision.
pub fn insert(db: &Database, new: NewUser) -> Result<User, DatabaseError> {
    db.with_conn(|conn| {
        let at = model::now();
        conn.execute(
            "INSERT INTO users (username, password_hash, name, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.username,
                new.password_hash,
                new.name,
                new.role,
                format_timestamp(&at)
            ],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: new.username,
            password_hash: new.password_hash,
            name: new.name,
            role: new.role,
            created_at: at,
        })
    })
}

/// Finds a user by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<User>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} WHERE id = ?1", SELECT);
        Ok(conn.query_row(&sql, params![id], from_row).optional()?)
    })
}

/// Case-insensitive lookup backed by the NOCASE unique index.
pub fn find_by_username(db: &Database, username: &str) -> Result<Option<User>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} WHERE username = ?1 COLLATE NOCASE", SELECT);
        Ok(conn.query_row(&sql, params![username], from_row).optional()?)
    })
}

/// Returns every user in id order.
pub fn all(db: &Database) -> Result<Vec<User>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!("{} ORDER BY id", SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_username_ignores_case() {
        let db = Database::open_in_memory().unwrap();
        insert(
            &db,
            NewUser {
                username: "Admin".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                name: "Administrator".to_string(),
                role: "admin".to_string(),
            },
        )
        .unwrap();

        let found = find_by_username(&db, "aDmIn").unwrap().unwrap();
        assert_eq!(found.username, "Admin");
        assert!(find_by_username(&db, "nobody").unwrap().is_none());
    }
}
