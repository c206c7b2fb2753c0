//! Form repository — pre/post-test forms, their questions, options and
//! slider labels.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

/// Which of the two per-version forms a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Pre,
    Post,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Pre => "pre",
            FormKind::Post => "post",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub id: i64,
    pub config_version: i64,
    pub kind: String,
    pub title: Option<String>,
}

/// A form question row. The nullable columns are only meaningful for
/// some question kinds (e.g. `min`/`max`/`step` for sliders).
#[derive(Debug, Clone, PartialEq)]
pub struct FormQuestionRow {
    pub id: i64,
    pub form_id: i64,
    pub ord: i64,
    pub kind: String,
    pub category: Option<String>,
    pub text: Option<String>,
    pub image_id: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub step: Option<i64>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub placeholder: Option<String>,
    pub other: bool,
}

impl FormQuestionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            form_id: row.get("form_id")?,
            ord: row.get("ord")?,
            kind: row.get("kind")?,
            category: row.get("category")?,
            text: row.get("text")?,
            image_id: row.get("image_id")?,
            min: row.get("min")?,
            max: row.get("max")?,
            step: row.get("step")?,
            min_length: row.get("min_length")?,
            max_length: row.get("max_length")?,
            placeholder: row.get("placeholder")?,
            other: row.get("other")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormOptionRow {
    pub id: i64,
    pub question_id: i64,
    pub ord: i64,
    pub text: Option<String>,
    pub image_id: Option<i64>,
}

impl FormOptionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            question_id: row.get("question_id")?,
            ord: row.get("ord")?,
            text: row.get("text")?,
            image_id: row.get("image_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderLabelRow {
    pub id: i64,
    pub question_id: i64,
    pub value: i64,
    pub label: String,
}

// ---- forms ----

pub fn find_form(
    conn: &Connection,
    config_version: i64,
    kind: FormKind,
) -> Result<Option<FormRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, config_version, kind, title FROM form
             WHERE config_version = ?1 AND kind = ?2",
            params![config_version, kind.as_str()],
            |r| {
                Ok(FormRow {
                    id: r.get(0)?,
                    config_version: r.get(1)?,
                    kind: r.get(2)?,
                    title: r.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn insert_form(
    conn: &Connection,
    config_version: i64,
    kind: FormKind,
    title: Option<&str>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO form (config_version, kind, title) VALUES (?1, ?2, ?3)",
        params![config_version, kind.as_str(), title],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_form_title(
    conn: &Connection,
    id: i64,
    title: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute("UPDATE form SET title=?2 WHERE id=?1", params![id, title])?;
    Ok(())
}

pub fn delete_form(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM form WHERE id = ?1", [id])?;
    Ok(())
}

// ---- questions ----

pub fn find_questions(
    conn: &Connection,
    form_id: i64,
) -> Result<Vec<FormQuestionRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM form_question WHERE form_id = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([form_id], FormQuestionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_question(
    conn: &Connection,
    id: i64,
) -> Result<Option<FormQuestionRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM form_question WHERE id = ?1",
            [id],
            FormQuestionRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn insert_question(conn: &Connection, q: &FormQuestionRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO form_question
            (form_id, ord, kind, category, text, image_id,
             min, max, step, min_length, max_length, placeholder, other)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            q.form_id,
            q.ord,
            q.kind,
            q.category,
            q.text,
            q.image_id,
            q.min,
            q.max,
            q.step,
            q.min_length,
            q.max_length,
            q.placeholder,
            q.other,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_question(conn: &Connection, q: &FormQuestionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE form_question SET
            ord=?2, kind=?3, category=?4, text=?5, image_id=?6,
            min=?7, max=?8, step=?9, min_length=?10, max_length=?11,
            placeholder=?12, other=?13
         WHERE id=?1",
        params![
            q.id,
            q.ord,
            q.kind,
            q.category,
            q.text,
            q.image_id,
            q.min,
            q.max,
            q.step,
            q.min_length,
            q.max_length,
            q.placeholder,
            q.other,
        ],
    )?;
    Ok(())
}

pub fn delete_question(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM form_question WHERE id = ?1", [id])?;
    Ok(())
}

// ---- options ----

pub fn find_options(
    conn: &Connection,
    question_id: i64,
) -> Result<Vec<FormOptionRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM form_option WHERE question_id = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([question_id], FormOptionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_option(conn: &Connection, id: i64) -> Result<Option<FormOptionRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM form_option WHERE id = ?1",
            [id],
            FormOptionRow::from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn insert_option(conn: &Connection, opt: &FormOptionRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO form_option (question_id, ord, text, image_id) VALUES (?1, ?2, ?3, ?4)",
        params![opt.question_id, opt.ord, opt.text, opt.image_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_option(conn: &Connection, opt: &FormOptionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE form_option SET ord=?2, text=?3, image_id=?4 WHERE id=?1",
        params![opt.id, opt.ord, opt.text, opt.image_id],
    )?;
    Ok(())
}

pub fn delete_option(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM form_option WHERE id = ?1", [id])?;
    Ok(())
}

// ---- slider labels ----

pub fn find_slider_labels(
    conn: &Connection,
    question_id: i64,
) -> Result<Vec<SliderLabelRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, question_id, value, label FROM slider_label
         WHERE question_id = ?1 ORDER BY value",
    )?;
    let rows = stmt
        .query_map([question_id], |r| {
            Ok(SliderLabelRow {
                id: r.get(0)?,
                question_id: r.get(1)?,
                value: r.get(2)?,
                label: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_slider_label(
    conn: &Connection,
    label: &SliderLabelRow,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO slider_label (question_id, value, label) VALUES (?1, ?2, ?3)",
        params![label.question_id, label.value, label.label],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_slider_label(
    conn: &Connection,
    label: &SliderLabelRow,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE slider_label SET value=?2, label=?3 WHERE id=?1",
        params![label.id, label.value, label.label],
    )?;
    Ok(())
}

pub fn delete_slider_label(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM slider_label WHERE id = ?1", [id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{config_repo, Database};

    fn seed(conn: &Connection) -> i64 {
        config_repo::insert(
            conn,
            &config_repo::ConfigRow {
                version: 1,
                title: "t".into(),
                subtitle: None,
                description: None,
                anonymous: false,
                informed_consent: None,
                icon_id: None,
                pattern_id: None,
            },
        )
        .unwrap();
        insert_form(conn, 1, FormKind::Pre, Some("Pre-test")).unwrap()
    }

    #[test]
    fn test_form_unique_per_kind() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            seed(conn);
            assert!(insert_form(conn, 1, FormKind::Pre, None).is_err());
            assert!(insert_form(conn, 1, FormKind::Post, None).is_ok());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_question_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let form_id = seed(conn);
            let mut q = FormQuestionRow {
                id: 0,
                form_id,
                ord: 0,
                kind: "slider".into(),
                category: Some("demographics".into()),
                text: Some("How tired are you?".into()),
                image_id: None,
                min: Some(0),
                max: Some(10),
                step: Some(1),
                min_length: None,
                max_length: None,
                placeholder: None,
                other: false,
            };
            q.id = insert_question(conn, &q).unwrap();
            let found = find_question(conn, q.id).unwrap().unwrap();
            assert_eq!(found, q);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_cascade_deletes_children() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let form_id = seed(conn);
            let q = FormQuestionRow {
                id: 0,
                form_id,
                ord: 0,
                kind: "select-one".into(),
                category: None,
                text: None,
                image_id: None,
                min: None,
                max: None,
                step: None,
                min_length: None,
                max_length: None,
                placeholder: None,
                other: false,
            };
            let qid = insert_question(conn, &q).unwrap();
            insert_option(
                conn,
                &FormOptionRow {
                    id: 0,
                    question_id: qid,
                    ord: 0,
                    text: Some("Yes".into()),
                    image_id: None,
                },
            )
            .unwrap();

            delete_form(conn, form_id).unwrap();
            assert!(find_question(conn, qid).unwrap().is_none());
            assert!(find_options(conn, qid).unwrap().is_empty());
            Ok(())
        })
        .unwrap();
    }
}
