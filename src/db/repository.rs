use crate::error::LedgerResult;
use crate::models::transaction::{Transaction, TransactionPatch, TransactionType};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::str::FromStr;
use tracing::debug;

pub(crate) fn map_transaction_row(row: &Row) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(1)?;
    let type_str: String = row.get(2)?;
    let amount: f64 = row.get(3)?;

    Ok(Transaction {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
        transaction_type: TransactionType::from_str(&type_str)
            .map_err(rusqlite::Error::InvalidParameterName)?,
        amount: Decimal::from_f64(amount).ok_or_else(|| {
            rusqlite::Error::InvalidParameterName(format!("Non-finite amount {}", amount))
        })?,
        category: row.get(4)?,
        note: row.get(5)?,
    })
}

/// Inserts a transaction dated today and returns its assigned id.
pub fn insert_transaction(
    conn: &Connection,
    transaction_type: TransactionType,
    amount: Decimal,
    category: &str,
    note: Option<&str>,
) -> LedgerResult<i64> {
    insert_transaction_on(
        conn,
        Local::now().date_naive(),
        transaction_type,
        amount,
        category,
        note,
    )
}

/// Same as `insert_transaction` but with an explicit date. Backs the
/// date-sensitive reports in tests and any future backfill command.
pub fn insert_transaction_on(
    conn: &Connection,
    date: NaiveDate,
    transaction_type: TransactionType,
    amount: Decimal,
    category: &str,
    note: Option<&str>,
) -> LedgerResult<i64> {
    conn.execute(
        "INSERT INTO transactions (date, type, amount, category, note)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            date.to_string(),
            transaction_type.as_str(),
            amount.to_f64().unwrap_or(0.0),
            category,
            note,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, %transaction_type, "inserted transaction");
    Ok(id)
}

pub fn get_transaction_by_id(conn: &Connection, id: i64) -> LedgerResult<Option<Transaction>> {
    let transaction = conn
        .query_row(
            "SELECT id, date, type, amount, category, note FROM transactions WHERE id = ?1",
            [id],
            map_transaction_row,
        )
        .optional()?;
    Ok(transaction)
}

/// Hard delete. Returns whether a row existed and was removed.
pub fn delete_transaction_by_id(conn: &Connection, id: i64) -> LedgerResult<bool> {
    let rows = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    debug!(id, deleted = rows > 0, "delete transaction");
    Ok(rows > 0)
}

/// Applies the provided fields only, each as an independent update.
/// Returns false (touching nothing) when the id does not exist.
pub fn update_transaction_by_id(
    conn: &Connection,
    id: i64,
    patch: &TransactionPatch,
) -> LedgerResult<bool> {
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM transactions WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;
    if exists.is_none() {
        return Ok(false);
    }

    if let Some(amount) = patch.amount {
        conn.execute(
            "UPDATE transactions SET amount = ?1 WHERE id = ?2",
            params![amount.to_f64().unwrap_or(0.0), id],
        )?;
    }
    if let Some(category) = &patch.category {
        conn.execute(
            "UPDATE transactions SET category = ?1 WHERE id = ?2",
            params![category, id],
        )?;
    }
    if let Some(note) = &patch.note {
        conn.execute(
            "UPDATE transactions SET note = ?1 WHERE id = ?2",
            params![note, id],
        )?;
    }
    debug!(id, "updated transaction");
    Ok(true)
}

pub fn list_all_transactions(conn: &Connection) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, type, amount, category, note FROM transactions ORDER BY date DESC",
    )?;
    let iter = stmt.query_map([], map_transaction_row)?;

    let mut transactions = Vec::new();
    for transaction in iter {
        transactions.push(transaction?);
    }
    Ok(transactions)
}

/// Most recently dated first; the id tie-break keeps same-day rows in
/// most-recently-added order. Zero counts are the caller's problem.
pub fn list_recent_transactions(conn: &Connection, n: u32) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, type, amount, category, note FROM transactions
         ORDER BY date DESC, id DESC LIMIT ?1",
    )?;
    let iter = stmt.query_map([n], map_transaction_row)?;

    let mut transactions = Vec::new();
    for transaction in iter {
        transactions.push(transaction?);
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_insert_then_get_round_trip() {
        let conn = establish_test_connection().unwrap();
        let id = insert_transaction(
            &conn,
            TransactionType::Expense,
            Decimal::new(50050, 2),
            "food",
            Some("lunch"),
        )
        .unwrap();

        let tx = get_transaction_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.amount, Decimal::new(50050, 2));
        assert_eq!(tx.category, "food");
        assert_eq!(tx.note.as_deref(), Some("lunch"));
        assert_eq!(tx.date, Local::now().date_naive());
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let conn = establish_test_connection().unwrap();
        assert!(get_transaction_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let conn = establish_test_connection().unwrap();
        let id = insert_transaction(
            &conn,
            TransactionType::Income,
            Decimal::new(2000, 0),
            "salary",
            None,
        )
        .unwrap();

        assert!(delete_transaction_by_id(&conn, id).unwrap());
        assert!(get_transaction_by_id(&conn, id).unwrap().is_none());
        assert!(!delete_transaction_by_id(&conn, id).unwrap());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let conn = establish_test_connection().unwrap();
        let first = insert_transaction(
            &conn,
            TransactionType::Expense,
            Decimal::ONE,
            "misc",
            None,
        )
        .unwrap();
        delete_transaction_by_id(&conn, first).unwrap();

        let second = insert_transaction(
            &conn,
            TransactionType::Expense,
            Decimal::ONE,
            "misc",
            None,
        )
        .unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let conn = establish_test_connection().unwrap();
        let id = insert_transaction(
            &conn,
            TransactionType::Expense,
            Decimal::new(300, 0),
            "food",
            Some("dinner"),
        )
        .unwrap();

        let updated = update_transaction_by_id(
            &conn,
            id,
            &TransactionPatch {
                amount: Some(Decimal::new(450, 0)),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(updated);

        let tx = get_transaction_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(tx.amount, Decimal::new(450, 0));
        assert_eq!(tx.category, "food");
        assert_eq!(tx.note.as_deref(), Some("dinner"));
    }

    #[test]
    fn test_update_missing_id_returns_false() {
        let conn = establish_test_connection().unwrap();
        let patch = TransactionPatch {
            category: Some("rent".to_string()),
            ..Default::default()
        };
        assert!(!update_transaction_by_id(&conn, 99, &patch).unwrap());
        assert!(list_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_list_recent_orders_and_truncates() {
        let conn = establish_test_connection().unwrap();
        let older = insert_transaction_on(
            &conn,
            date("2024-01-10"),
            TransactionType::Expense,
            Decimal::ONE,
            "a",
            None,
        )
        .unwrap();
        let same_day_first = insert_transaction_on(
            &conn,
            date("2024-01-15"),
            TransactionType::Expense,
            Decimal::ONE,
            "b",
            None,
        )
        .unwrap();
        let same_day_second = insert_transaction_on(
            &conn,
            date("2024-01-15"),
            TransactionType::Income,
            Decimal::ONE,
            "c",
            None,
        )
        .unwrap();

        let recent = list_recent_transactions(&conn, 2).unwrap();
        assert_eq!(recent.len(), 2);
        // Same date resolves to the most recently added row first.
        assert_eq!(recent[0].id, same_day_second);
        assert_eq!(recent[1].id, same_day_first);

        let all = list_recent_transactions(&conn, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, older);
    }
}
