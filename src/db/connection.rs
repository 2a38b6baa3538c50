use crate::error::LedgerResult;
use rusqlite::Connection;
use std::path::PathBuf;

/// Where the ledger lives on disk. Passed in explicitly at construction
/// time; nothing in the core reads ambient state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

/// Opens the ledger file and makes sure the schema exists. Safe to call on
/// every process start.
pub fn establish_connection(config: &StoreConfig) -> LedgerResult<Connection> {
    let conn = Connection::open(&config.db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

// AUTOINCREMENT keeps deleted ids from ever being handed out again.
fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense', 'investment')),
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            note TEXT
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
pub fn establish_test_connection() -> LedgerResult<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}
