use crate::db::repository::map_transaction_row;
use crate::error::{LedgerError, LedgerResult};
use crate::models::transaction::Transaction;
use chrono::NaiveDate;
use rusqlite::{Connection, params_from_iter};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

/// How expense rows are grouped. A closed set: the SELECT/GROUP BY text is
/// derived from this enum alone, never from caller-supplied strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseGrouping {
    Total,
    ByCategory,
    ByMonth,
}

/// Per-type totals over the whole ledger or a date range. Absent types
/// stay at zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
}

impl Summary {
    pub fn savings(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Expense report over an explicit inclusive date range. `transactions`
/// carries every type; `total` and `by_category` are expense-only.
#[derive(Debug, Clone)]
pub struct RangeReport {
    pub total: Decimal,
    pub transactions: Vec<Transaction>,
    pub by_category: Vec<(String, Decimal)>,
}

pub fn parse_iso_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| LedgerError::InvalidDate(s.to_string()))
}

/// Parses and orders a range. Both reports and the summary CLI path go
/// through here so validation failures look the same everywhere.
pub fn parse_date_range(start: &str, end: &str) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let start = parse_iso_date(start)?;
    let end = parse_iso_date(end)?;
    if start > end {
        return Err(LedgerError::StartAfterEnd { start, end });
    }
    Ok((start, end))
}

// Year and month filters compare components of the stored ISO date string,
// which stays consistent with the lexicographic date ordering used for
// recency. The grouped variants are deterministic: category ties fall back
// to lexical order, months sort by their two-digit code.
fn expense_query(
    year: Option<i32>,
    month: Option<u32>,
    grouping: ExpenseGrouping,
) -> (String, Vec<String>) {
    let select = match grouping {
        ExpenseGrouping::Total => "IFNULL(SUM(amount), 0)",
        ExpenseGrouping::ByCategory => "category, SUM(amount)",
        ExpenseGrouping::ByMonth => "strftime('%m', date), SUM(amount)",
    };

    let mut sql = format!("SELECT {} FROM transactions WHERE type = 'expense'", select);
    let mut params = Vec::new();

    if let Some(year) = year {
        sql.push_str(" AND strftime('%Y', date) = ?");
        params.push(format!("{:04}", year));
    }
    if let Some(month) = month {
        sql.push_str(" AND strftime('%m', date) = ?");
        params.push(format!("{:02}", month));
    }

    match grouping {
        ExpenseGrouping::Total => {}
        ExpenseGrouping::ByCategory => {
            sql.push_str(" GROUP BY category ORDER BY SUM(amount) DESC, category ASC");
        }
        ExpenseGrouping::ByMonth => {
            sql.push_str(" GROUP BY strftime('%m', date) ORDER BY strftime('%m', date) ASC");
        }
    }

    (sql, params)
}

fn decimal_from_sum(sum: f64) -> LedgerResult<Decimal> {
    Decimal::from_f64(sum).ok_or_else(|| {
        LedgerError::Storage(rusqlite::Error::InvalidParameterName(format!(
            "Non-finite sum {}",
            sum
        )))
    })
}

fn fetch_grouped_expenses(
    conn: &Connection,
    year: Option<i32>,
    month: Option<u32>,
    grouping: ExpenseGrouping,
) -> LedgerResult<Vec<(String, Decimal)>> {
    let (sql, params) = expense_query(year, month, grouping);
    debug!(%sql, "grouped expense query");

    let mut stmt = conn.prepare(&sql)?;
    let iter = stmt.query_map(params_from_iter(params.iter()), |row| {
        let label: String = row.get(0)?;
        let sum: f64 = row.get(1)?;
        Ok((label, sum))
    })?;

    let mut groups = Vec::new();
    for entry in iter {
        let (label, sum) = entry?;
        groups.push((label, decimal_from_sum(sum)?));
    }
    Ok(groups)
}

/// Total income/expense/investment, optionally restricted to an inclusive
/// date range. One grouped query; each type sums on its own branch.
pub fn summary(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> LedgerResult<Summary> {
    let mut sql = String::from("SELECT type, IFNULL(SUM(amount), 0) FROM transactions");
    let mut params = Vec::new();
    if let Some((start, end)) = range {
        sql.push_str(" WHERE date BETWEEN ? AND ?");
        params.push(start.to_string());
        params.push(end.to_string());
    }
    sql.push_str(" GROUP BY type");

    let mut stmt = conn.prepare(&sql)?;
    let iter = stmt.query_map(params_from_iter(params.iter()), |row| {
        let type_str: String = row.get(0)?;
        let sum: f64 = row.get(1)?;
        Ok((type_str, sum))
    })?;

    let mut result = Summary::default();
    for entry in iter {
        let (type_str, sum) = entry?;
        let amount = decimal_from_sum(sum)?;
        match type_str.as_str() {
            "income" => result.income = amount,
            "expense" => result.expense = amount,
            "investment" => result.investment = amount,
            // The CHECK constraint keeps anything else out.
            _ => {}
        }
    }
    Ok(result)
}

/// Total expense for a year, narrowed to one month when given. Zero when
/// nothing matches.
pub fn expense_total(conn: &Connection, year: i32, month: Option<u32>) -> LedgerResult<Decimal> {
    let (sql, params) = expense_query(Some(year), month, ExpenseGrouping::Total);
    let sum: f64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
    decimal_from_sum(sum)
}

/// Expense totals grouped by category, largest first.
pub fn expense_by_category(
    conn: &Connection,
    year: Option<i32>,
    month: Option<u32>,
) -> LedgerResult<Vec<(String, Decimal)>> {
    fetch_grouped_expenses(conn, year, month, ExpenseGrouping::ByCategory)
}

/// Expense totals per calendar month of a year, keyed by two-digit month
/// code ascending. Months without expenses are omitted.
pub fn expense_by_month(conn: &Connection, year: i32) -> LedgerResult<Vec<(String, Decimal)>> {
    fetch_grouped_expenses(conn, Some(year), None, ExpenseGrouping::ByMonth)
}

/// Validates the range, then gathers the expense total, every transaction
/// in range (any type) and the expense category breakdown.
pub fn range_report(conn: &Connection, start: &str, end: &str) -> LedgerResult<RangeReport> {
    let (start_date, end_date) = parse_date_range(start, end)?;
    let bounds = [start_date.to_string(), end_date.to_string()];

    let total: f64 = conn.query_row(
        "SELECT IFNULL(SUM(amount), 0) FROM transactions
         WHERE type = 'expense' AND date BETWEEN ?1 AND ?2",
        bounds.clone(),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, date, type, amount, category, note FROM transactions
         WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC, id ASC",
    )?;
    let iter = stmt.query_map(bounds.clone(), map_transaction_row)?;
    let mut transactions = Vec::new();
    for transaction in iter {
        transactions.push(transaction?);
    }

    let mut stmt = conn.prepare(
        "SELECT category, SUM(amount) FROM transactions
         WHERE type = 'expense' AND date BETWEEN ?1 AND ?2
         GROUP BY category ORDER BY SUM(amount) DESC, category ASC",
    )?;
    let iter = stmt.query_map(bounds, |row| {
        let category: String = row.get(0)?;
        let sum: f64 = row.get(1)?;
        Ok((category, sum))
    })?;
    let mut by_category = Vec::new();
    for entry in iter {
        let (category, sum) = entry?;
        by_category.push((category, decimal_from_sum(sum)?));
    }

    Ok(RangeReport {
        total: decimal_from_sum(total)?,
        transactions,
        by_category,
    })
}
