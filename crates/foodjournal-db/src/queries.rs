use crate::error::{Result, StoreError};
use crate::models::{JournalRow, JournalUpdate, NewJournal, UserRow};
use crate::row::Row;
use crate::{Store, Value};

impl Store {
    // -- Users --

    /// Insert a user and return the assigned id. The password is stored as given.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<i64> {
        let outcome = self
            .execute_write(
                "INSERT INTO users (email, password) VALUES (?, ?)",
                vec![text(email), text(password)],
            )
            .await?;
        Ok(outcome.last_insert_id)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let rows = self
            .execute_read(
                "SELECT id, email, password FROM users WHERE email = ?",
                vec![text(email)],
            )
            .await?;
        first(&rows)
    }

    /// Credential check: `Some` only when both email and password match.
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<Option<UserRow>> {
        let rows = self
            .execute_read(
                "SELECT id, email, password FROM users WHERE email = ? AND password = ?",
                vec![text(email), text(password)],
            )
            .await?;
        first(&rows)
    }

    // -- Journals --

    pub async fn insert_journal(&self, journal: &NewJournal) -> Result<i64> {
        let outcome = self
            .execute_write(
                "INSERT INTO journals (userId, image, description, category, date) VALUES (?, ?, ?, ?, ?)",
                vec![
                    Value::Integer(journal.user_id),
                    text(&journal.image),
                    text(&journal.description),
                    text(&journal.category),
                    text(&journal.date),
                ],
            )
            .await?;
        Ok(outcome.last_insert_id)
    }

    pub async fn get_journal(&self, id: i64) -> Result<Option<JournalRow>> {
        let rows = self
            .execute_read("SELECT * FROM journals WHERE id = ?", vec![Value::Integer(id)])
            .await?;
        first(&rows)
    }

    /// All entries for a user, newest first. Dates are compared as instants,
    /// so `...:00Z` and `...:00.500Z` order correctly; ties go to the later id.
    pub async fn list_journals(&self, user_id: i64) -> Result<Vec<JournalRow>> {
        let rows = self
            .execute_read(
                "SELECT * FROM journals WHERE userId = ? ORDER BY julianday(date) DESC, id DESC",
                vec![Value::Integer(user_id)],
            )
            .await?;
        rows.iter()
            .map(|row| JournalRow::try_from(row).map_err(StoreError::Query))
            .collect()
    }

    /// Replace image, description and category. Returns whether a row matched.
    pub async fn update_journal(&self, id: i64, update: &JournalUpdate) -> Result<bool> {
        let outcome = self
            .execute_write(
                "UPDATE journals SET image = ?, description = ?, category = ? WHERE id = ?",
                vec![
                    text(&update.image),
                    text(&update.description),
                    text(&update.category),
                    Value::Integer(id),
                ],
            )
            .await?;
        Ok(outcome.is_single_row())
    }

    pub async fn delete_journal(&self, id: i64) -> Result<bool> {
        let outcome = self
            .execute_write("DELETE FROM journals WHERE id = ?", vec![Value::Integer(id)])
            .await?;
        Ok(outcome.is_single_row())
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

fn first<'a, T>(rows: &'a [Row]) -> Result<Option<T>>
where
    T: TryFrom<&'a Row, Error = crate::error::Failure>,
{
    rows.first()
        .map(T::try_from)
        .transpose()
        .map_err(StoreError::Query)
}
