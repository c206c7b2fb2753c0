//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order. Some migrations (ALTER TABLE ADD COLUMN)
//! are handled conditionally to support idempotent execution.

use rusqlite::Connection;

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    /// Whether this migration needs conditional handling
    /// (e.g. ADD COLUMN that may already exist).
    kind: MigrationKind,
}

enum MigrationKind {
    /// Execute the SQL directly.
    Standard,
    /// ALTER TABLE ADD COLUMN — skip if column already exists.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_config_tables",
        sql: include_str!("sql/001_create_config_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_form_tables",
        sql: include_str!("sql/002_create_form_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "create_test_tables",
        sql: include_str!("sql/003_create_test_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 4,
        description: "create_translation_tables",
        sql: include_str!("sql/004_create_translation_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 5,
        description: "create_attempt_log_tables",
        sql: include_str!("sql/005_create_attempt_log_tables.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 6,
        description: "add_greeting_to_test_group",
        sql: include_str!("sql/006_add_greeting_to_test_group.sql"),
        kind: MigrationKind::AddColumn {
            table: "test_group",
            column: "greeting",
        },
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version     INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  TEXT NOT NULL
        )",
        [],
    )?;

    for migration in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = ?1)",
            [migration.version],
            |r| r.get(0),
        )?;

        if already_applied {
            continue;
        }

        apply(conn, migration)?;

        conn.execute(
            "INSERT INTO _migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                migration.description,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        log::debug!(
            "Applied migration {} ({})",
            migration.version,
            migration.description
        );
    }

    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    match migration.kind {
        MigrationKind::Standard => {
            conn.execute_batch(migration.sql)
                .map_err(|e| DatabaseError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })
        }
        MigrationKind::AddColumn { table, column } => {
            if column_exists(conn, table, column)? {
                return Ok(());
            }
            conn.execute_batch(migration.sql)
                .map_err(|e| DatabaseError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })
        }
    }
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
