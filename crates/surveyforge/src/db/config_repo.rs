//! Configuration repository — the versioned config root, username patterns
//! and translations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

/// A configuration version row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRow {
    pub version: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub anonymous: bool,
    pub informed_consent: Option<String>,
    pub icon_id: Option<i64>,
    pub pattern_id: Option<i64>,
}

impl ConfigRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            version: row.get("version")?,
            title: row.get("title")?,
            subtitle: row.get("subtitle")?,
            description: row.get("description")?,
            anonymous: row.get("anonymous")?,
            informed_consent: row.get("informed_consent")?,
            icon_id: row.get("icon_id")?,
            pattern_id: row.get("pattern_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternRow {
    pub id: i64,
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationKeyRow {
    pub id: i64,
    pub key: String,
    pub description: Option<String>,
    pub arguments_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationValueRow {
    pub id: i64,
    pub config_version: i64,
    pub key_id: i64,
    pub value: String,
}

pub fn insert(conn: &Connection, config: &ConfigRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO config (version, title, subtitle, description, anonymous,
         informed_consent, icon_id, pattern_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            config.version,
            config.title,
            config.subtitle,
            config.description,
            config.anonymous,
            config.informed_consent,
            config.icon_id,
            config.pattern_id,
        ],
    )?;
    Ok(())
}

pub fn find_by_version(
    conn: &Connection,
    version: i64,
) -> Result<Option<ConfigRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM config WHERE version = ?1",
            [version],
            ConfigRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Returns the highest configuration version, if any configuration exists.
pub fn find_latest(conn: &Connection) -> Result<Option<ConfigRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM config ORDER BY version DESC LIMIT 1",
            [],
            ConfigRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Overwrites the general fields of a configuration version.
pub fn update(conn: &Connection, config: &ConfigRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE config SET title=?2, subtitle=?3, description=?4, anonymous=?5,
         informed_consent=?6, icon_id=?7, pattern_id=?8
         WHERE version=?1",
        params![
            config.version,
            config.title,
            config.subtitle,
            config.description,
            config.anonymous,
            config.informed_consent,
            config.icon_id,
            config.pattern_id,
        ],
    )?;
    Ok(())
}

pub fn delete_by_version(conn: &Connection, version: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM config WHERE version = ?1", [version])?;
    Ok(())
}

/// Whether any test attempt references a group of this configuration
/// version. Such versions must not be deleted or destructively edited.
pub fn has_attempts(conn: &Connection, version: i64) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM attempt_log a
            JOIN test_group g ON g.id = a.group_id
            WHERE g.config_version = ?1
        )",
        [version],
        |r| r.get(0),
    )?;
    Ok(exists)
}

// ---- username patterns ----

pub fn find_pattern(conn: &Connection, id: i64) -> Result<Option<PatternRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, regex FROM pattern WHERE id = ?1",
            [id],
            |r| {
                Ok(PatternRow {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    regex: r.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn insert_pattern(conn: &Connection, name: &str, regex: &str) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO pattern (name, regex) VALUES (?1, ?2)",
        params![name, regex],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_pattern(
    conn: &Connection,
    id: i64,
    name: &str,
    regex: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE pattern SET name=?2, regex=?3 WHERE id=?1",
        params![id, name, regex],
    )?;
    Ok(())
}

// ---- translations ----

pub fn find_all_translation_keys(
    conn: &Connection,
) -> Result<Vec<TranslationKeyRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, key, description, arguments_json FROM translation_key")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(TranslationKeyRow {
                id: r.get(0)?,
                key: r.get(1)?,
                description: r.get(2)?,
                arguments_json: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_translation_key(
    conn: &Connection,
    key: &str,
    description: Option<&str>,
    arguments_json: Option<&str>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO translation_key (key, description, arguments_json) VALUES (?1, ?2, ?3)",
        params![key, description, arguments_json],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_translation_values(
    conn: &Connection,
    config_version: i64,
) -> Result<Vec<TranslationValueRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, config_version, key_id, value FROM translation_value
         WHERE config_version = ?1",
    )?;
    let rows = stmt
        .query_map([config_version], |r| {
            Ok(TranslationValueRow {
                id: r.get(0)?,
                config_version: r.get(1)?,
                key_id: r.get(2)?,
                value: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_translation_value(
    conn: &Connection,
    config_version: i64,
    key_id: i64,
    value: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO translation_value (config_version, key_id, value) VALUES (?1, ?2, ?3)",
        params![config_version, key_id, value],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_translation_value(
    conn: &Connection,
    id: i64,
    value: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE translation_value SET value=?2 WHERE id=?1",
        params![id, value],
    )?;
    Ok(())
}

/// Key/value map for one configuration version, joined through the key table.
pub fn translation_map(
    conn: &Connection,
    config_version: i64,
) -> Result<Vec<(String, String)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT k.key, v.value FROM translation_value v
         JOIN translation_key k ON k.id = v.key_id
         WHERE v.config_version = ?1
         ORDER BY k.key",
    )?;
    let rows = stmt
        .query_map([config_version], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
