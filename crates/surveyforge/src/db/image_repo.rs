//! Image metadata rows. The bytes live on disk under the image store;
//! the database only records the relative path and alt text.

use rusqlite::{params, Connection, OptionalExtension};

use super::DatabaseError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub id: i64,
    pub path: String,
    pub alt: Option<String>,
}

pub fn insert(conn: &Connection, path: &str, alt: Option<&str>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO image (path, alt) VALUES (?1, ?2)",
        params![path, alt],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<ImageRow>, DatabaseError> {
    let row = conn
        .query_row("SELECT id, path, alt FROM image WHERE id = ?1", [id], |r| {
            Ok(ImageRow {
                id: r.get(0)?,
                path: r.get(1)?,
                alt: r.get(2)?,
            })
        })
        .optional()?;
    Ok(row)
}

pub fn update_path(conn: &Connection, id: i64, path: &str) -> Result<(), DatabaseError> {
    conn.execute("UPDATE image SET path=?2 WHERE id=?1", params![id, path])?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM image WHERE id = ?1", [id])?;
    Ok(())
}

/// Whether no configuration node references this image any more.
///
/// Reference counting is deliberately avoided; a row scan over the six
/// referencing columns is cheap at the scale of a configuration.
pub fn is_unused(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let referenced: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM config        WHERE icon_id  = ?1)
             OR EXISTS(SELECT 1 FROM info_card     WHERE icon_id  = ?1)
             OR EXISTS(SELECT 1 FROM form_question WHERE image_id = ?1)
             OR EXISTS(SELECT 1 FROM form_option   WHERE image_id = ?1)
             OR EXISTS(SELECT 1 FROM test_question WHERE image_id = ?1)
             OR EXISTS(SELECT 1 FROM test_option   WHERE image_id = ?1)",
        [id],
        |r| r.get(0),
    )?;
    Ok(!referenced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{config_repo, Database};

    #[test]
    fn test_is_unused_tracks_references() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let img = insert(conn, "images/config/a.png", None).unwrap();
            assert!(is_unused(conn, img).unwrap());

            config_repo::insert(
                conn,
                &config_repo::ConfigRow {
                    version: 1,
                    title: "t".into(),
                    subtitle: None,
                    description: None,
                    anonymous: false,
                    informed_consent: None,
                    icon_id: Some(img),
                    pattern_id: None,
                },
            )
            .unwrap();
            assert!(!is_unused(conn, img).unwrap());

            config_repo::delete_by_version(conn, 1).unwrap();
            assert!(is_unused(conn, img).unwrap());
            Ok(())
        })
        .unwrap();
    }
}
