use rusqlite::Connection;
use tracing::info;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        email       TEXT UNIQUE,
        password    TEXT
    );

    CREATE TABLE IF NOT EXISTS journals (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        userId      INTEGER,
        image       TEXT,
        description TEXT,
        date        TEXT,
        category    TEXT,
        FOREIGN KEY(userId) REFERENCES users(id)
    );
";

/// Apply connection pragmas. Must run before any schema or data statement:
/// `foreign_keys` is a no-op inside a transaction and off by default.
pub fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(())
}

/// Create both tables in one transaction. Either both exist afterwards or,
/// on error, the transaction rolls back and neither was added.
pub fn run(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;

    info!("Database schema ready");
    Ok(())
}
