//! Test repository — experiment groups, phases, questions and options.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

#[derive(Debug, Clone, PartialEq)]
pub struct TestGroupRow {
    pub id: i64,
    pub config_version: i64,
    pub ord: i64,
    pub label: String,
    pub probability: i64,
    pub greeting: Option<String>,
    pub allow_previous_phase: bool,
    pub allow_previous_question: bool,
    pub allow_skip_question: bool,
    pub randomize_phases: bool,
}

impl TestGroupRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            config_version: row.get("config_version")?,
            ord: row.get("ord")?,
            label: row.get("label")?,
            probability: row.get("probability")?,
            greeting: row.get("greeting")?,
            allow_previous_phase: row.get("allow_previous_phase")?,
            allow_previous_question: row.get("allow_previous_question")?,
            allow_skip_question: row.get("allow_skip_question")?,
            randomize_phases: row.get("randomize_phases")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestPhaseRow {
    pub id: i64,
    pub group_id: i64,
    pub ord: i64,
    pub randomize_questions: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestQuestionRow {
    pub id: i64,
    pub phase_id: i64,
    pub ord: i64,
    pub text: Option<String>,
    pub image_id: Option<i64>,
    pub randomize_options: bool,
}

impl TestQuestionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            phase_id: row.get("phase_id")?,
            ord: row.get("ord")?,
            text: row.get("text")?,
            image_id: row.get("image_id")?,
            randomize_options: row.get("randomize_options")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestOptionRow {
    pub id: i64,
    pub question_id: i64,
    pub ord: i64,
    pub text: Option<String>,
    pub correct: bool,
    pub image_id: Option<i64>,
}

impl TestOptionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            question_id: row.get("question_id")?,
            ord: row.get("ord")?,
            text: row.get("text")?,
            correct: row.get("correct")?,
            image_id: row.get("image_id")?,
        })
    }
}

// ---- groups ----

pub fn find_groups(
    conn: &Connection,
    config_version: i64,
) -> Result<Vec<TestGroupRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM test_group WHERE config_version = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([config_version], TestGroupRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_group(conn: &Connection, id: i64) -> Result<Option<TestGroupRow>, DatabaseError> {
    let row = conn
        .query_row("SELECT * FROM test_group WHERE id = ?1", [id], TestGroupRow::from_row)
        .optional()?;
    Ok(row)
}

pub fn insert_group(conn: &Connection, group: &TestGroupRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO test_group
            (config_version, ord, label, probability, greeting,
             allow_previous_phase, allow_previous_question,
             allow_skip_question, randomize_phases)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            group.config_version,
            group.ord,
            group.label,
            group.probability,
            group.greeting,
            group.allow_previous_phase,
            group.allow_previous_question,
            group.allow_skip_question,
            group.randomize_phases,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_group(conn: &Connection, group: &TestGroupRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE test_group SET
            ord=?2, label=?3, probability=?4, greeting=?5,
            allow_previous_phase=?6, allow_previous_question=?7,
            allow_skip_question=?8, randomize_phases=?9
         WHERE id=?1",
        params![
            group.id,
            group.ord,
            group.label,
            group.probability,
            group.greeting,
            group.allow_previous_phase,
            group.allow_previous_question,
            group.allow_skip_question,
            group.randomize_phases,
        ],
    )?;
    Ok(())
}

pub fn delete_group(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM test_group WHERE id = ?1", [id])?;
    Ok(())
}

// ---- phases ----

pub fn find_phases(conn: &Connection, group_id: i64) -> Result<Vec<TestPhaseRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, group_id, ord, randomize_questions FROM test_phase
         WHERE group_id = ?1 ORDER BY ord",
    )?;
    let rows = stmt
        .query_map([group_id], |r| {
            Ok(TestPhaseRow {
                id: r.get(0)?,
                group_id: r.get(1)?,
                ord: r.get(2)?,
                randomize_questions: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_phase(conn: &Connection, id: i64) -> Result<Option<TestPhaseRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, group_id, ord, randomize_questions FROM test_phase WHERE id = ?1",
            [id],
            |r| {
                Ok(TestPhaseRow {
                    id: r.get(0)?,
                    group_id: r.get(1)?,
                    ord: r.get(2)?,
                    randomize_questions: r.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn insert_phase(conn: &Connection, phase: &TestPhaseRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO test_phase (group_id, ord, randomize_questions) VALUES (?1, ?2, ?3)",
        params![phase.group_id, phase.ord, phase.randomize_questions],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_phase(conn: &Connection, phase: &TestPhaseRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE test_phase SET ord=?2, randomize_questions=?3 WHERE id=?1",
        params![phase.id, phase.ord, phase.randomize_questions],
    )?;
    Ok(())
}

pub fn delete_phase(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM test_phase WHERE id = ?1", [id])?;
    Ok(())
}

// ---- questions ----

pub fn find_questions(
    conn: &Connection,
    phase_id: i64,
) -> Result<Vec<TestQuestionRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM test_question WHERE phase_id = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([phase_id], TestQuestionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_question(
    conn: &Connection,
    id: i64,
) -> Result<Option<TestQuestionRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM test_question WHERE id = ?1",
            [id],
            TestQuestionRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn insert_question(conn: &Connection, q: &TestQuestionRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO test_question (phase_id, ord, text, image_id, randomize_options)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![q.phase_id, q.ord, q.text, q.image_id, q.randomize_options],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_question(conn: &Connection, q: &TestQuestionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE test_question SET ord=?2, text=?3, image_id=?4, randomize_options=?5
         WHERE id=?1",
        params![q.id, q.ord, q.text, q.image_id, q.randomize_options],
    )?;
    Ok(())
}

pub fn delete_question(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM test_question WHERE id = ?1", [id])?;
    Ok(())
}

// ---- options ----

pub fn find_options(
    conn: &Connection,
    question_id: i64,
) -> Result<Vec<TestOptionRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM test_option WHERE question_id = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([question_id], TestOptionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_option(conn: &Connection, id: i64) -> Result<Option<TestOptionRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM test_option WHERE id = ?1",
            [id],
            TestOptionRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn insert_option(conn: &Connection, opt: &TestOptionRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO test_option (question_id, ord, text, correct, image_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![opt.question_id, opt.ord, opt.text, opt.correct, opt.image_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_option(conn: &Connection, opt: &TestOptionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE test_option SET ord=?2, text=?3, correct=?4, image_id=?5 WHERE id=?1",
        params![opt.id, opt.ord, opt.text, opt.correct, opt.image_id],
    )?;
    Ok(())
}

pub fn delete_option(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM test_option WHERE id = ?1", [id])?;
    Ok(())
}
