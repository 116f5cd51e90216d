//! Store behaviour against a real database file in a temp dir.

use foodjournal_db::{JournalUpdate, NewJournal, Store, StoreError, StoreState, Value};
use tempfile::TempDir;

fn new_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path());
    (dir, store)
}

fn entry(user_id: i64, description: &str, category: &str, date: &str) -> NewJournal {
    NewJournal {
        user_id,
        image: format!("file://{description}.jpg"),
        description: description.to_string(),
        category: category.to_string(),
        date: date.to_string(),
    }
}

#[tokio::test]
async fn test_initialize_twice_keeps_schema() {
    let (_dir, store) = new_store();
    store.initialize().await.unwrap();
    store.initialize().await.unwrap();
    assert_eq!(store.state(), StoreState::Ready);

    let rows = store
        .execute_read(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'journals') ORDER BY name",
            vec![],
        )
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().filter_map(|r| r.text("name")).collect();
    assert_eq!(names, vec!["journals", "users"]);
}

#[tokio::test]
async fn test_reopening_existing_file_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Store::new(dir.path());
        store.create_user("a@b.com", "x").await.unwrap();
    }
    let store = Store::new(dir.path());
    assert!(store.find_user_by_email("a@b.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_pragmas_applied() {
    let (_dir, store) = new_store();
    let fk = store.execute_read("PRAGMA foreign_keys", vec![]).await.unwrap();
    assert_eq!(fk[0].integer("foreign_keys"), Some(1));

    let mode = store.execute_read("PRAGMA journal_mode", vec![]).await.unwrap();
    assert_eq!(mode[0].text("journal_mode"), Some("wal"));
}

#[tokio::test]
async fn test_journal_with_unknown_user_violates_foreign_key() {
    let (_dir, store) = new_store();
    let err = store
        .insert_journal(&entry(42, "Ghost", "Lunch", "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");

    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    let id = store
        .insert_journal(&entry(user_id, "Real", "Lunch", "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();
    assert!(id > 0);
}

#[tokio::test]
async fn test_duplicate_email_violates_unique() {
    let (_dir, store) = new_store();
    store.create_user("a@b.com", "x").await.unwrap();
    let err = store.create_user("a@b.com", "y").await.unwrap_err();
    assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn test_malformed_statements_are_typed() {
    let (_dir, store) = new_store();
    let err = store.execute_read("SELEC * FROM journals", vec![]).await.unwrap_err();
    assert!(matches!(err, StoreError::Query(_)));

    let err = store
        .execute_write("INSERT INTO nowhere (x) VALUES (?)", vec![Value::Integer(1)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Write(_)));
    assert!(!err.is_constraint_violation());
}

#[tokio::test]
async fn test_journal_round_trip() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    let new = NewJournal {
        user_id,
        image: "file://a.jpg".to_string(),
        description: "Oatmeal".to_string(),
        category: "Breakfast".to_string(),
        date: "2024-03-05T07:30:00.000Z".to_string(),
    };
    let id = store.insert_journal(&new).await.unwrap();

    let row = store.get_journal(id).await.unwrap().unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.user_id, user_id);
    assert_eq!(row.image.as_deref(), Some("file://a.jpg"));
    assert_eq!(row.description, "Oatmeal");
    assert_eq!(row.category, "Breakfast");
    assert_eq!(row.date, "2024-03-05T07:30:00.000Z");
}

#[tokio::test]
async fn test_update_preserves_identity() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    let id = store
        .insert_journal(&entry(user_id, "Toast", "Breakfast", "2024-01-02T08:00:00.000Z"))
        .await
        .unwrap();

    let updated = store
        .update_journal(
            id,
            &JournalUpdate {
                image: "file://new.jpg".to_string(),
                description: "Burger".to_string(),
                category: "Dinner".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let row = store.get_journal(id).await.unwrap().unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.user_id, user_id);
    assert_eq!(row.date, "2024-01-02T08:00:00.000Z");
    assert_eq!(row.description, "Burger");
    assert_eq!(row.category, "Dinner");
    assert_eq!(row.image.as_deref(), Some("file://new.jpg"));
}

#[tokio::test]
async fn test_update_missing_entry_reports_no_row() {
    let (_dir, store) = new_store();
    let updated = store
        .update_journal(
            99,
            &JournalUpdate {
                image: "i".to_string(),
                description: "d".to_string(),
                category: "Lunch".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_row() {
    let (_dir, store) = new_store();
    let alice = store.create_user("alice@example.com", "x").await.unwrap();
    let bob = store.create_user("bob@example.com", "y").await.unwrap();

    let a1 = store
        .insert_journal(&entry(alice, "Soup", "Lunch", "2024-01-01T12:00:00.000Z"))
        .await
        .unwrap();
    store
        .insert_journal(&entry(alice, "Salad", "Dinner", "2024-01-01T19:00:00.000Z"))
        .await
        .unwrap();
    store
        .insert_journal(&entry(bob, "Chips", "Snacks", "2024-01-01T15:00:00.000Z"))
        .await
        .unwrap();

    assert!(store.delete_journal(a1).await.unwrap());
    assert!(store.get_journal(a1).await.unwrap().is_none());
    assert!(!store.delete_journal(a1).await.unwrap());

    assert_eq!(store.list_journals(alice).await.unwrap().len(), 1);
    assert_eq!(store.list_journals(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_is_newest_first_and_filterable() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    let other = store.create_user("c@d.com", "x").await.unwrap();

    let seed = [
        ("Eggs", "Breakfast", "2024-01-03T07:00:00.000Z"),
        ("Pasta", "Dinner", "2024-01-01T19:00:00.000Z"),
        ("Apple", "Snacks", "2024-01-04T16:00:00.000Z"),
        ("Wrap", "Lunch", "2024-01-02T12:00:00.000Z"),
        ("Steak", "Dinner", "2024-01-05T20:00:00.000Z"),
    ];
    for (description, category, date) in seed {
        store
            .insert_journal(&entry(user_id, description, category, date))
            .await
            .unwrap();
    }
    store
        .insert_journal(&entry(other, "Not mine", "Dinner", "2024-02-01T00:00:00.000Z"))
        .await
        .unwrap();

    let rows = store.list_journals(user_id).await.unwrap();
    assert_eq!(rows.len(), seed.len());
    assert!(rows.iter().all(|r| r.user_id == user_id));
    assert!(rows.windows(2).all(|w| w[0].date >= w[1].date));
    assert_eq!(rows[0].description, "Steak");

    let dinners: Vec<_> = rows.iter().filter(|r| r.category == "Dinner").collect();
    assert_eq!(dinners.len(), 2);
    assert_eq!(dinners[0].description, "Steak");
    assert_eq!(dinners[1].description, "Pasta");
}

#[tokio::test]
async fn test_read_preserves_engine_order() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    for (i, date) in ["2024-01-01", "2024-01-03", "2024-01-02"].iter().enumerate() {
        store
            .insert_journal(&entry(user_id, &format!("e{i}"), "Lunch", date))
            .await
            .unwrap();
    }

    let rows = store
        .execute_read(
            "SELECT id, description FROM journals ORDER BY date ASC",
            vec![],
        )
        .await
        .unwrap();
    let got: Vec<&str> = rows.iter().filter_map(|r| r.text("description")).collect();
    assert_eq!(got, vec!["e0", "e2", "e1"]);
    assert_eq!(rows[0].columns().to_vec(), vec!["id".to_string(), "description".to_string()]);
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() {
    let (_dir, store) = new_store();
    assert!(store.list_journals(1).await.unwrap().is_empty());
    assert!(store.get_journal(1).await.unwrap().is_none());
    assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_check_credentials() {
    let (_dir, store) = new_store();
    let id = store.create_user("a@b.com", "secret").await.unwrap();

    let user = store.check_credentials("a@b.com", "secret").await.unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.email, "a@b.com");
    assert!(store.check_credentials("a@b.com", "wrong").await.unwrap().is_none());
    assert!(store.check_credentials("x@b.com", "secret").await.unwrap().is_none());
}

#[tokio::test]
async fn test_end_to_end_example() {
    let (_dir, store) = new_store();

    let user = store
        .execute_write(
            "INSERT INTO users (email, password) VALUES (?, ?)",
            vec![Value::from("a@b.com".to_string()), Value::from("x".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(user.last_insert_id, 1);

    let journal = store
        .execute_write(
            "INSERT INTO journals (userId, image, description, category, date) VALUES (?, ?, ?, ?, ?)",
            vec![
                Value::Integer(1),
                Value::from("img1".to_string()),
                Value::from("Pizza".to_string()),
                Value::from("Dinner".to_string()),
                Value::from("2024-01-01T00:00:00Z".to_string()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(journal.last_insert_id, 1);
    assert_eq!(journal.rows_affected, 1);

    let rows = store
        .execute_read(
            "SELECT * FROM journals WHERE userId = ? ORDER BY date DESC",
            vec![Value::Integer(1)],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].integer("id"), Some(1));
    assert_eq!(rows[0].text("description"), Some("Pizza"));
    assert_eq!(rows[0].text("category"), Some("Dinner"));

    let deleted = store
        .execute_write("DELETE FROM journals WHERE id = ?", vec![Value::Integer(1)])
        .await
        .unwrap();
    assert_eq!(deleted.rows_affected, 1);

    let rows = store
        .execute_read(
            "SELECT * FROM journals WHERE userId = ? ORDER BY date DESC",
            vec![Value::Integer(1)],
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_concurrent_writes_from_fresh_store_all_land() {
    let (_dir, store) = new_store();
    let (a, b) = tokio::join!(
        store.create_user("one@example.com", "x"),
        store.create_user("two@example.com", "y"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a, b);
    assert!(store.find_user_by_email("one@example.com").await.unwrap().is_some());
    assert!(store.find_user_by_email("two@example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_tolerates_entry_without_image() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    store
        .execute_write(
            "INSERT INTO journals (userId, image, description, category, date) VALUES (?, NULL, 'Draft', 'Lunch', '2024-01-01T12:00:00.000Z')",
            vec![Value::Integer(user_id)],
        )
        .await
        .unwrap();
    store
        .insert_journal(&entry(user_id, "Soup", "Lunch", "2024-01-02T12:00:00.000Z"))
        .await
        .unwrap();

    let rows = store.list_journals(user_id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].image.as_deref(), Some("file://Soup.jpg"));
    assert_eq!(rows[1].description, "Draft");
    assert_eq!(rows[1].image, None);
}

#[tokio::test]
async fn test_list_orders_mixed_precision_dates_chronologically() {
    let (_dir, store) = new_store();
    let user_id = store.create_user("a@b.com", "x").await.unwrap();
    store
        .insert_journal(&entry(user_id, "Earlier", "Lunch", "2024-01-01T00:00:00Z"))
        .await
        .unwrap();
    store
        .insert_journal(&entry(user_id, "Later", "Lunch", "2024-01-01T00:00:00.500Z"))
        .await
        .unwrap();
    store
        .insert_journal(&entry(user_id, "Oldest", "Lunch", "2023-12-31T23:59:59.999Z"))
        .await
        .unwrap();

    let rows = store.list_journals(user_id).await.unwrap();
    let got: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(got, vec!["Later", "Earlier", "Oldest"]);
    // Stored text is left exactly as written.
    assert_eq!(rows[1].date, "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_open_attempts_counts_one_open_per_store() {
    let (_dir, store) = new_store();
    assert_eq!(store.open_attempts(), 0);
    let (a, b) = tokio::join!(store.initialize(), store.list_journals(1));
    a.unwrap();
    b.unwrap();
    store.initialize().await.unwrap();
    assert_eq!(store.open_attempts(), 1);
}
