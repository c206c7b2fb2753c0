//! Attempt and answer logs.
//!
//! Besides inserting log rows, this module answers the existence
//! queries used to decide whether a piece of test structure is frozen:
//! once participant data references a node, that node (and its
//! ancestors) must not be destructively edited.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::DatabaseError;

pub fn insert_attempt(
    conn: &Connection,
    group_id: i64,
    username: Option<&str>,
    started_at: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO attempt_log (group_id, username, started_at) VALUES (?1, ?2, ?3)",
        params![group_id, username, started_at.to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_answer(
    conn: &Connection,
    attempt_id: i64,
    question_id: i64,
    option_id: Option<i64>,
    event: &str,
    timestamp: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO answer_log (attempt_id, question_id, option_id, event, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            attempt_id,
            question_id,
            option_id,
            event,
            timestamp.to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ---- structural freeze queries ----

pub fn group_has_attempts(conn: &Connection, group_id: i64) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM attempt_log WHERE group_id = ?1)",
        [group_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

pub fn phase_has_answers(conn: &Connection, phase_id: i64) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM answer_log a
            JOIN test_question q ON q.id = a.question_id
            WHERE q.phase_id = ?1
        )",
        [phase_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

pub fn question_has_answers(conn: &Connection, question_id: i64) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM answer_log WHERE question_id = ?1)",
        [question_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}

pub fn option_has_answers(conn: &Connection, option_id: i64) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM answer_log WHERE option_id = ?1)",
        [option_id],
        |r| r.get(0),
    )?;
    Ok(exists)
}
