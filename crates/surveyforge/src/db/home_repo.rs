//! Home-page repository — information cards and FAQ entries.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

#[derive(Debug, Clone, PartialEq)]
pub struct InfoCardRow {
    pub id: i64,
    pub config_version: i64,
    pub ord: i64,
    pub title: String,
    pub description: Option<String>,
    pub color: i64,
    pub icon_id: Option<i64>,
}

impl InfoCardRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            config_version: row.get("config_version")?,
            ord: row.get("ord")?,
            title: row.get("title")?,
            description: row.get("description")?,
            color: row.get("color")?,
            icon_id: row.get("icon_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaqRow {
    pub id: i64,
    pub config_version: i64,
    pub ord: i64,
    pub question: String,
    pub answer: String,
}

impl FaqRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            config_version: row.get("config_version")?,
            ord: row.get("ord")?,
            question: row.get("question")?,
            answer: row.get("answer")?,
        })
    }
}

// ---- information cards ----

pub fn find_info_cards(
    conn: &Connection,
    config_version: i64,
) -> Result<Vec<InfoCardRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM info_card WHERE config_version = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([config_version], InfoCardRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_info_card(conn: &Connection, id: i64) -> Result<Option<InfoCardRow>, DatabaseError> {
    let row = conn
        .query_row("SELECT * FROM info_card WHERE id = ?1", [id], InfoCardRow::from_row)
        .optional()?;
    Ok(row)
}

pub fn insert_info_card(conn: &Connection, card: &InfoCardRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO info_card (config_version, ord, title, description, color, icon_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            card.config_version,
            card.ord,
            card.title,
            card.description,
            card.color,
            card.icon_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_info_card(conn: &Connection, card: &InfoCardRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE info_card SET ord=?2, title=?3, description=?4, color=?5, icon_id=?6
         WHERE id=?1",
        params![
            card.id,
            card.ord,
            card.title,
            card.description,
            card.color,
            card.icon_id,
        ],
    )?;
    Ok(())
}

pub fn delete_info_card(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM info_card WHERE id = ?1", [id])?;
    Ok(())
}

// ---- FAQ ----

pub fn find_faqs(conn: &Connection, config_version: i64) -> Result<Vec<FaqRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM faq WHERE config_version = ?1 ORDER BY ord")?;
    let rows = stmt
        .query_map([config_version], FaqRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_faq(conn: &Connection, id: i64) -> Result<Option<FaqRow>, DatabaseError> {
    let row = conn
        .query_row("SELECT * FROM faq WHERE id = ?1", [id], FaqRow::from_row)
        .optional()?;
    Ok(row)
}

pub fn insert_faq(conn: &Connection, faq: &FaqRow) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO faq (config_version, ord, question, answer) VALUES (?1, ?2, ?3, ?4)",
        params![faq.config_version, faq.ord, faq.question, faq.answer],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_faq(conn: &Connection, faq: &FaqRow) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE faq SET ord=?2, question=?3, answer=?4 WHERE id=?1",
        params![faq.id, faq.ord, faq.question, faq.answer],
    )?;
    Ok(())
}

pub fn delete_faq(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM faq WHERE id = ?1", [id])?;
    Ok(())
}

pub fn delete_all_faqs(conn: &Connection, config_version: i64) -> Result<usize, DatabaseError> {
    let n = conn.execute("DELETE FROM faq WHERE config_version = ?1", [config_version])?;
    Ok(n)
}
