use crate::db::aggregate::{
    self, RangeReport, expense_by_category, expense_by_month, expense_total,
};
use crate::error::LedgerResult;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Expense total and category breakdown for one calendar month.
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub total: Decimal,
    pub by_category: Vec<(String, Decimal)>,
}

/// Expense total plus category and month breakdowns for a full year.
/// `by_month` carries human-readable labels ("Jan".."Dec"), sparse.
#[derive(Debug, Clone)]
pub struct YearlyReport {
    pub total: Decimal,
    pub by_category: Vec<(String, Decimal)>,
    pub by_month: Vec<(String, Decimal)>,
}

pub fn monthly_report(conn: &Connection, month: u32, year: i32) -> LedgerResult<MonthlyReport> {
    Ok(MonthlyReport {
        total: expense_total(conn, year, Some(month))?,
        by_category: expense_by_category(conn, Some(year), Some(month))?,
    })
}

pub fn yearly_report(conn: &Connection, year: i32) -> LedgerResult<YearlyReport> {
    let by_month = expense_by_month(conn, year)?
        .into_iter()
        .map(|(code, amount)| (month_label(&code).to_string(), amount))
        .collect();

    Ok(YearlyReport {
        total: expense_total(conn, year, None)?,
        by_category: expense_by_category(conn, Some(year), None)?,
        by_month,
    })
}

/// Pass-through to the range aggregation; validation errors surface
/// unchanged.
pub fn date_range_report(conn: &Connection, start: &str, end: &str) -> LedgerResult<RangeReport> {
    aggregate::range_report(conn, start, end)
}

/// Unknown codes come back as-is rather than failing the whole report.
pub fn month_label(code: &str) -> &str {
    match code {
        "01" => "Jan",
        "02" => "Feb",
        "03" => "Mar",
        "04" => "Apr",
        "05" => "May",
        "06" => "Jun",
        "07" => "Jul",
        "08" => "Aug",
        "09" => "Sep",
        "10" => "Oct",
        "11" => "Nov",
        "12" => "Dec",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::db::repository::insert_transaction_on;
    use crate::models::transaction::TransactionType;
    use chrono::NaiveDate;

    fn seed(conn: &Connection, day: &str, t: TransactionType, amount: i64, category: &str) {
        insert_transaction_on(
            conn,
            NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            t,
            Decimal::new(amount, 0),
            category,
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_month_label_mapping() {
        assert_eq!(month_label("01"), "Jan");
        assert_eq!(month_label("12"), "Dec");
        assert_eq!(month_label("00"), "00");
    }

    #[test]
    fn test_monthly_report_scopes_to_month() {
        let conn = establish_test_connection().unwrap();
        seed(&conn, "2024-01-10", TransactionType::Expense, 500, "food");
        seed(&conn, "2024-01-15", TransactionType::Expense, 300, "food");
        seed(&conn, "2024-02-05", TransactionType::Expense, 60, "rent");

        let report = monthly_report(&conn, 1, 2024).unwrap();
        assert_eq!(report.total, Decimal::new(800, 0));
        assert_eq!(
            report.by_category,
            vec![("food".to_string(), Decimal::new(800, 0))]
        );
    }

    #[test]
    fn test_yearly_report_labels_months_and_omits_empty() {
        let conn = establish_test_connection().unwrap();
        seed(&conn, "2024-01-10", TransactionType::Expense, 800, "food");
        seed(&conn, "2024-03-02", TransactionType::Expense, 150, "rent");
        seed(&conn, "2024-05-01", TransactionType::Income, 2000, "salary");

        let report = yearly_report(&conn, 2024).unwrap();
        assert_eq!(report.total, Decimal::new(950, 0));
        assert_eq!(
            report.by_month,
            vec![
                ("Jan".to_string(), Decimal::new(800, 0)),
                ("Mar".to_string(), Decimal::new(150, 0)),
            ]
        );
        assert_eq!(report.by_category[0].0, "food");
    }

    #[test]
    fn test_date_range_report_surfaces_validation_error() {
        let conn = establish_test_connection().unwrap();
        let err = date_range_report(&conn, "2024-02-10", "2024-01-05").unwrap_err();
        assert!(err.is_validation());
    }
}
