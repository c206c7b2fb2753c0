//! Structural immutability checks.
//!
//! Once participants have produced data against a piece of test
//! structure, that piece may no longer be deleted: deleting it would
//! orphan attempt or answer rows. Each check matches the log level that
//! references the node; a group check covers its whole subtree because
//! answers can only exist under attempts of the same group.
//!
//! Appending new nodes is always allowed, so these checks only run for
//! deletions.

use rusqlite::Connection;

use crate::db::log_repo;
use crate::error::{Result, SurveyError};

pub fn ensure_group_deletable(conn: &Connection, group_id: i64) -> Result<()> {
    if log_repo::group_has_attempts(conn, group_id)? {
        return Err(SurveyError::Conflict(format!(
            "group {group_id} has recorded attempts and cannot be deleted"
        )));
    }
    Ok(())
}

pub fn ensure_phase_deletable(conn: &Connection, phase_id: i64) -> Result<()> {
    if log_repo::phase_has_answers(conn, phase_id)? {
        return Err(SurveyError::Conflict(format!(
            "phase {phase_id} has recorded answers and cannot be deleted"
        )));
    }
    Ok(())
}

pub fn ensure_question_deletable(conn: &Connection, question_id: i64) -> Result<()> {
    if log_repo::question_has_answers(conn, question_id)? {
        return Err(SurveyError::Conflict(format!(
            "question {question_id} has recorded answers and cannot be deleted"
        )));
    }
    Ok(())
}

pub fn ensure_option_deletable(conn: &Connection, option_id: i64) -> Result<()> {
    if log_repo::option_has_answers(conn, option_id)? {
        return Err(SurveyError::Conflict(format!(
            "option {option_id} has recorded answers and cannot be deleted"
        )));
    }
    Ok(())
}
