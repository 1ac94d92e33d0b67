use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::{
    ExpenseTracker, HashScheme, LedgerService, QuickLedger, Session, parse_amount, parse_date,
};
use crate::config::{Config, DEFAULT_DATABASE};
use crate::domain::{CategorySet, DATE_FORMAT, ExpenseId, format_cents};
use crate::storage::ExpenseFilter;

/// Spendlog - Personal Expense Tracker
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "Track personal expenses in a local per-user ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPENDLOG_DATABASE", default_value = DEFAULT_DATABASE, global = true)]
    pub database: String,

    /// Password hashing scheme for new users: argon2, sha256
    #[arg(long, env = "SPENDLOG_HASH_SCHEME", default_value = "argon2", global = true)]
    pub hash_scheme: HashScheme,

    /// Comma-separated list of accepted categories
    #[arg(long, env = "SPENDLOG_CATEGORIES", global = true)]
    pub categories: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials for commands acting on a user's ledger
#[derive(clap::Args)]
pub struct Credentials {
    /// Username
    #[arg(short, long)]
    pub user: String,

    /// Password
    #[arg(short, long, env = "SPENDLOG_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new user
    Register {
        /// Username (must be unique)
        username: String,

        /// Password
        #[arg(short, long, env = "SPENDLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Check a username and password
    Login {
        /// Username
        username: String,

        /// Password
        #[arg(short, long, env = "SPENDLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Record an expense
    Add {
        #[command(flatten)]
        credentials: Credentials,

        /// Amount spent (e.g., "12.50" or "12")
        amount: String,

        /// Category (see `spendlog categories`)
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List expenses, newest first
    List {
        #[command(flatten)]
        credentials: Credentials,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter from date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to_date: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Change an existing expense
    Update {
        #[command(flatten)]
        credentials: Credentials,

        /// Expense ID
        id: ExpenseId,

        /// New amount
        amount: String,

        /// New category
        #[arg(short, long)]
        category: String,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// New note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Delete an expense
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        /// Expense ID
        id: ExpenseId,
    },

    /// Spending per category and per month
    Report {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Export expenses to CSV or JSON
    Export {
        #[command(flatten)]
        credentials: Credentials,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Import expenses from a date,category,amount,note CSV
    Import {
        #[command(flatten)]
        credentials: Credentials,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the accepted categories
    Categories,

    /// Single-user flat-file mode (no login, add and list only)
    #[command(subcommand)]
    Quick(QuickCommands),
}

#[derive(Subcommand)]
pub enum QuickCommands {
    /// Append an expense to the flat file
    Add {
        /// Amount spent
        amount: String,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Flat file path
        #[arg(short, long, default_value = "expenses.csv")]
        file: String,
    },

    /// List the expenses in the flat file
    List {
        /// Flat file path
        #[arg(short, long, default_value = "expenses.csv")]
        file: String,
    },
}

impl Cli {
    /// Collect the configuration flags.
    pub fn config(&self) -> Config {
        let categories = match &self.categories {
            Some(list) => CategorySet::parse_list(list),
            None => CategorySet::default(),
        };
        Config::new(&self.database)
            .with_hash_scheme(self.hash_scheme)
            .with_categories(categories)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();

        match self.command {
            Commands::Init => {
                let tracker = ExpenseTracker::init(&config).await?;
                tracker.close().await;
                println!("Database initialized: {}", config.database);
            }

            Commands::Register { username, password } => {
                let tracker = ExpenseTracker::connect(&config).await?;
                tracker.register(&username, &password).await?;
                println!("Registered user: {}", username.trim());
            }

            Commands::Login { username, password } => {
                let tracker = ExpenseTracker::connect(&config).await?;
                if tracker.login(&username, &password).await? {
                    println!("Login successful");
                } else {
                    anyhow::bail!("Invalid username or password");
                }
            }

            Commands::Add {
                credentials,
                amount,
                category,
                date,
                note,
            } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                let amount_cents = parse_amount(&amount)?;
                let date = date.unwrap_or_else(today);
                let id = tracker
                    .add_expense(session.username(), &date, &category, amount_cents, &note)
                    .await?;
                println!("Added expense #{}: {} ({})", id, format_cents(amount_cents), date);
            }

            Commands::List {
                credentials,
                category,
                from_date,
                to_date,
                limit,
            } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                let filter = ExpenseFilter {
                    category,
                    from_date: from_date.map(|s| parse_date(&s)).transpose()?,
                    to_date: to_date.map(|s| parse_date(&s)).transpose()?,
                    limit,
                };
                run_list_command(tracker.ledger(), &session, &filter).await?;
            }

            Commands::Update {
                credentials,
                id,
                amount,
                category,
                date,
                note,
            } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                let amount_cents = parse_amount(&amount)?;
                tracker
                    .update_expense(
                        session.username(),
                        id,
                        &date,
                        &category,
                        amount_cents,
                        &note,
                    )
                    .await?;
                println!("Updated expense #{}", id);
            }

            Commands::Delete { credentials, id } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                tracker.delete_expense(session.username(), id).await?;
                println!("Deleted expense #{}", id);
            }

            Commands::Report { credentials } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                run_report_command(tracker.ledger(), &session).await?;
            }

            Commands::Export {
                credentials,
                output,
                format,
            } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                run_export_command(tracker.ledger(), &session, output.as_deref(), &format).await?;
            }

            Commands::Import {
                credentials,
                input,
                dry_run,
            } => {
                let (tracker, session) = open_session(&config, &credentials).await?;
                run_import_command(tracker.ledger(), &session, input.as_deref(), dry_run).await?;
            }

            Commands::Categories => {
                if config.categories.is_unrestricted() {
                    println!("Any non-empty category is accepted.");
                } else {
                    for name in config.categories.names() {
                        println!("{}", name);
                    }
                }
            }

            Commands::Quick(quick_cmd) => {
                run_quick_command(&config, quick_cmd)?;
            }
        }

        Ok(())
    }
}

/// Connect and authenticate, returning the session every ledger call uses.
async fn open_session(
    config: &Config,
    credentials: &Credentials,
) -> Result<(ExpenseTracker, Session)> {
    let tracker = ExpenseTracker::connect(config).await?;
    let session = tracker
        .authenticate(&credentials.user, &credentials.password)
        .await?;
    Ok((tracker, session))
}

async fn run_list_command(
    service: &LedgerService,
    session: &Session,
    filter: &ExpenseFilter,
) -> Result<()> {
    let listing = service
        .get_expenses_filtered(session.username(), filter)
        .await?;

    if listing.expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!(
        "{:>6} {:<12} {:<12} {:>10} NOTE",
        "ID", "DATE", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(60));
    for expense in &listing.expenses {
        println!(
            "{:>6} {:<12} {:<12} {:>10} {}",
            expense.id,
            expense.date.format(DATE_FORMAT),
            truncate(&expense.category, 12),
            format_cents(expense.amount_cents),
            truncate(&expense.note, 30)
        );
    }
    println!("{}", "-".repeat(60));
    println!(
        "Total: {}  Count: {}  Average: {}",
        format_cents(listing.summary.total),
        listing.summary.count,
        format_cents(listing.summary.average)
    );
    Ok(())
}

async fn run_report_command(service: &LedgerService, session: &Session) -> Result<()> {
    let categories = service.category_breakdown(session.username()).await?;
    if categories.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!("Spending by category");
    println!(
        "{:<15} {:>10} {:>6} {:>10} {:>7}",
        "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "SHARE"
    );
    println!("{}", "-".repeat(52));
    for summary in &categories {
        println!(
            "{:<15} {:>10} {:>6} {:>10} {:>6.1}%",
            truncate(&summary.category, 15),
            format_cents(summary.total),
            summary.count,
            format_cents(summary.average),
            summary.percentage
        );
    }

    let months = service.monthly_totals(session.username()).await?;
    println!();
    println!("Spending by month");
    println!("{:<10} {:>10} {:>6}", "MONTH", "TOTAL", "COUNT");
    println!("{}", "-".repeat(28));
    for month in &months {
        println!(
            "{:<10} {:>10} {:>6}",
            month.month,
            format_cents(month.total),
            month.count
        );
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    session: &Session,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => {
            exporter
                .export_expenses_csv(session.username(), writer)
                .await?
        }
        "json" => {
            exporter
                .export_expenses_json(session.username(), writer)
                .await?
                .expenses
                .len()
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    };

    if output.is_some() {
        eprintln!("Exported {} expenses", count);
    }
    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    session: &Session,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::Importer;
    use std::fs::File;
    use std::io::{Read, stdin};

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = Importer::new(service)
        .import_expenses_csv(session.username(), reader, dry_run)
        .await?;

    if dry_run {
        println!("Validation complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!("  Line {}: {}", error.line, error.message);
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }
    Ok(())
}

fn run_quick_command(config: &Config, cmd: QuickCommands) -> Result<()> {
    match cmd {
        QuickCommands::Add {
            amount,
            category,
            note,
            date,
            file,
        } => {
            let ledger = QuickLedger::new(file, config.categories.clone());
            let date = date.unwrap_or_else(today);
            ledger.add(&date, &category, parse_amount(&amount)?, &note)?;
            println!("Expense added to {}", ledger.path().display());
        }

        QuickCommands::List { file } => {
            let records = QuickLedger::new(file, config.categories.clone()).list()?;
            if records.is_empty() {
                println!("No expenses found.");
            } else {
                println!("{:<12} {:<12} {:>10} NOTE", "DATE", "CATEGORY", "AMOUNT");
                println!("{}", "-".repeat(60));
                for record in &records {
                    println!(
                        "{:<12} {:<12} {:>10} {}",
                        record.date.format(DATE_FORMAT),
                        truncate(&record.category, 12),
                        format_cents(record.amount_cents),
                        truncate(&record.note, 30)
                    );
                }
            }
        }
    }
    Ok(())
}

fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
