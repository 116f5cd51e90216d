//! Database row types, decoded by column name from a [`Row`].
//! Distinct from foodjournal-types API models to keep the DB layer independent.

use crate::error::Failure;
use crate::row::Row;
use crate::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRow {
    pub id: i64,
    pub user_id: i64,
    /// NULL only for rows written before an image was attached.
    pub image: Option<String>,
    pub description: String,
    pub date: String,
    pub category: String,
}

/// Input for a new entry. `date` is set once here and never updated.
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub user_id: i64,
    pub image: String,
    pub description: String,
    pub category: String,
    pub date: String,
}

/// The only fields an update may replace.
#[derive(Debug, Clone)]
pub struct JournalUpdate {
    pub image: String,
    pub description: String,
    pub category: String,
}

impl TryFrom<&Row> for UserRow {
    type Error = Failure;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(UserRow {
            id: integer(row, "id")?,
            email: text(row, "email")?,
            password: text(row, "password")?,
        })
    }
}

impl TryFrom<&Row> for JournalRow {
    type Error = Failure;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(JournalRow {
            id: integer(row, "id")?,
            user_id: integer(row, "userId")?,
            image: optional_text(row, "image")?,
            description: text(row, "description")?,
            date: text(row, "date")?,
            category: text(row, "category")?,
        })
    }
}

fn integer(row: &Row, column: &str) -> Result<i64, Failure> {
    row.integer(column).ok_or_else(|| decode_error(row, column, "integer"))
}

fn text(row: &Row, column: &str) -> Result<String, Failure> {
    row.text(column)
        .map(str::to_owned)
        .ok_or_else(|| decode_error(row, column, "text"))
}

fn optional_text(row: &Row, column: &str) -> Result<Option<String>, Failure> {
    match row.get(column) {
        Some(Value::Null) => Ok(None),
        _ => text(row, column).map(Some),
    }
}

fn decode_error(row: &Row, column: &str, expected: &str) -> Failure {
    let reason = match row.get(column) {
        None => "missing".to_string(),
        Some(value) => format!("expected {expected}, found {:?}", value.data_type()),
    };
    Failure::Decode {
        column: column.to_string(),
        reason,
    }
}
