mod db;
mod error;
mod models;
mod operations;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use db::aggregate::{self, parse_date_range};
use db::connection::{StoreConfig, establish_connection};
use db::repository;
use models::transaction::{Transaction, TransactionPatch, TransactionType};
use operations::chart::{ChartKind, render_chart};
use operations::report;

#[derive(Parser)]
#[command(name = "finledger", about = "Personal finance ledger")]
struct Cli {
    /// Path to the ledger database file
    #[arg(long, env = "FINLEDGER_DB", default_value = "finledger.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an income/expense/investment transaction dated today
    Add {
        /// Transaction type (income, expense or investment)
        transaction_type: TransactionType,
        /// Amount
        amount: Decimal,
        /// Category (food, rent, etc)
        category: String,
        /// Short note
        note: Vec<String>,
    },
    /// Show total income, expense, investment and savings
    Summary {
        /// Start date (YYYY-MM-DD); requires --to
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD); requires --from
        #[arg(long)]
        to: Option<String>,
    },
    /// List all transactions
    List,
    /// Show the most recent transactions
    Recent {
        /// Number of transactions to show
        #[arg(long, default_value_t = 5)]
        n: u32,
    },
    /// Monthly expense report
    MonReport {
        /// Month (1-12)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Year (e.g. 2024)
        year: i32,
        /// Render a category chart
        #[arg(long)]
        plot: bool,
    },
    /// Yearly expense report
    YrReport {
        /// Year (e.g. 2024)
        year: i32,
        /// Show the category breakdown
        #[arg(long)]
        cat: bool,
        /// Show the month-by-month breakdown
        #[arg(long)]
        monthly: bool,
        /// Render charts for the requested breakdowns
        #[arg(long)]
        plot: bool,
    },
    /// Expense report for an explicit date range
    Report {
        /// Start date (YYYY-MM-DD)
        #[arg(long = "from")]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long = "to")]
        end: String,
        /// Show the category breakdown
        #[arg(long)]
        cat: bool,
        /// Render a category chart
        #[arg(long)]
        plot: bool,
    },
    /// Delete a transaction by id
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Update fields of a transaction by id
    Update {
        id: i64,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::new(cli.db);
    let conn = establish_connection(&config)?;

    match cli.command {
        Command::Add {
            transaction_type,
            amount,
            category,
            note,
        } => {
            let note = note.join(" ");
            let note = if note.is_empty() {
                None
            } else {
                Some(note.as_str())
            };
            let id = repository::insert_transaction(&conn, transaction_type, amount, &category, note)?;
            println!("Transaction {} added.", id);
        }
        Command::Summary { from, to } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(parse_date_range(&from, &to)?),
                (None, None) => None,
                _ => bail!("--from and --to must be given together"),
            };
            let summary = aggregate::summary(&conn, range)?;
            println!("{:15}  {:>12}", "Total Income", summary.income);
            println!("{:15}  {:>12}", "Total Expense", summary.expense);
            println!("{:15}  {:>12}", "Investment", summary.investment);
            println!("{:15}  {:>12}", "Savings", summary.savings());
        }
        Command::List => {
            let transactions = repository::list_all_transactions(&conn)?;
            print_transactions("All Transactions", &transactions);
        }
        Command::Recent { n } => {
            if n == 0 {
                bail!("Please provide a positive number of transactions");
            }
            let transactions = repository::list_recent_transactions(&conn, n)?;
            print_transactions(&format!("Recent {} Transactions", n), &transactions);
        }
        Command::MonReport { month, year, plot } => {
            let report = report::monthly_report(&conn, month, year)?;
            if report.by_category.is_empty() {
                println!("No transactions found for this month.");
                return Ok(());
            }
            println!("Total Expense: {}", report.total);
            print_breakdown(
                &format!("Monthly Report - {}/{}", month, year),
                &report.by_category,
            );
            if plot {
                render_chart(
                    &format!("Expense Distribution - {}/{}", month, year),
                    &report.by_category,
                    ChartKind::Doughnut,
                )?;
            }
        }
        Command::YrReport {
            year,
            cat,
            monthly,
            plot,
        } => {
            let report = report::yearly_report(&conn, year)?;
            if report.by_month.is_empty() {
                println!("No transactions found for this year.");
                return Ok(());
            }
            println!("Total Expense: {}", report.total);
            if cat {
                print_breakdown(
                    &format!("Yearly Report - {} (Category-wise)", year),
                    &report.by_category,
                );
                if plot {
                    render_chart(
                        &format!("Expense Distribution - {}", year),
                        &report.by_category,
                        ChartKind::Doughnut,
                    )?;
                }
            }
            if monthly {
                print_breakdown(
                    &format!("Yearly Report - {} (Month-wise)", year),
                    &report.by_month,
                );
                if plot {
                    render_chart(
                        &format!("Monthly Expense Distribution - {}", year),
                        &report.by_month,
                        ChartKind::Bar,
                    )?;
                }
            }
        }
        Command::Report {
            start,
            end,
            cat,
            plot,
        } => {
            let report = report::date_range_report(&conn, &start, &end)?;
            if report.transactions.is_empty() {
                println!("No transactions found for this date range.");
                return Ok(());
            }
            println!("Total Expense: {}", report.total);
            print_transactions(
                &format!("Transactions from {} to {}", start, end),
                &report.transactions,
            );
            if cat {
                print_breakdown(
                    &format!("Expense by Category from {} to {}", start, end),
                    &report.by_category,
                );
                if plot {
                    render_chart(
                        &format!("Expense Distribution from {} to {}", start, end),
                        &report.by_category,
                        ChartKind::Doughnut,
                    )?;
                }
            }
        }
        Command::Delete { id, yes } => {
            let Some(transaction) = repository::get_transaction_by_id(&conn, id)? else {
                bail!("Transaction ID {} not found", id);
            };
            print_transactions("Transaction to delete:", &[transaction]);
            if !yes && !confirm("Confirm deletion")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
            if repository::delete_transaction_by_id(&conn, id)? {
                println!("Transaction {} deleted.", id);
            }
        }
        Command::Update {
            id,
            amount,
            category,
            note,
        } => {
            let patch = TransactionPatch {
                amount,
                category,
                note,
            };
            if patch.is_empty() {
                bail!("Provide at least one of --amount, --category, --note");
            }
            if repository::update_transaction_by_id(&conn, id, &patch)? {
                println!("Transaction updated successfully.");
            } else {
                bail!("Transaction ID {} not found", id);
            }
        }
    }

    Ok(())
}

fn print_transactions(title: &str, transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }
    println!("{}", title);
    println!(
        "{:>5}  {:10}  {:10}  {:>12}  {:15}  Note",
        "ID", "Date", "Type", "Amount", "Category"
    );
    for tx in transactions {
        println!(
            "{:>5}  {:10}  {:10}  {:>12}  {:15}  {}",
            tx.id,
            tx.date.to_string(),
            tx.transaction_type.to_string(),
            tx.amount.to_string(),
            tx.category,
            tx.note.as_deref().unwrap_or("")
        );
    }
}

fn print_breakdown(title: &str, rows: &[(String, Decimal)]) {
    println!("{}", title);
    for (label, amount) in rows {
        println!("{:15}  {:>12}", label, amount.to_string());
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} (y/n): ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
