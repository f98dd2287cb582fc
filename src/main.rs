//! Poultry Ledger CLI - batch lifecycle and closing audit from the terminal.
//!
//! # Usage
//!
//! ```bash
//! poultry-ledger create B-01
//! poultry-ledger arrive B-01 --date 10/01/2024 --chicks 100 --price 50
//! poultry-ledger feed B-01 --date 12/01/2024 --bags 10 --price 400 --feed-type Starter
//! poultry-ledger sales B-01 --date 20/02/2024 --price-per-kg 150 --trip 20:10,16:8
//! poultry-ledger audit B-01
//! poultry-ledger finalize B-01 --confirm
//! ```
//!
//! Configuration is read from `--config`, then `POULTRY_LEDGER_CONFIG`,
//! then defaults (SQLite under the user data directory).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use poultry_ledger::app::AppState;
use poultry_ledger::config::ConfigManager;
use poultry_ledger::domain::{
    ArrivalDetails, ClosingAuditView, ContainerInput, ExpenseInput, FeedAction, FeedInput,
    LogKind, MortalityInput, SalesGrid, TripInput,
};
use poultry_ledger::i18n::{self, t, t_with_args};
use poultry_ledger::store::parse_date_cell;
use poultry_ledger::{logging, SessionContext, SessionStatus};

#[derive(Parser)]
#[command(name = "poultry-ledger")]
#[command(author, version, about = "Broiler batch ledger: lifecycle, event logs, closing audit")]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every batch
    Batches,
    /// Create a batch (Pre-Arrival)
    Create { batch_id: String },
    /// Show a batch's status and which logs are writable
    Status { batch_id: String },
    /// Record chick arrival (Pre-Arrival -> Active)
    Arrive {
        batch_id: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        chicks: i64,
        /// Price per chick
        #[arg(long)]
        price: Decimal,
    },
    /// Log a feed purchase (or return with --return)
    Feed {
        batch_id: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        bags: i64,
        /// Price per bag
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value = "")]
        feed_type: String,
        /// Bags returned to the supplier
        #[arg(long = "return")]
        is_return: bool,
    },
    /// Log bird deaths
    Mortality {
        batch_id: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        count: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Log a sales submission: one --trip per trip, containers as weight:birds
    Sales {
        batch_id: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        price_per_kg: Decimal,
        #[arg(long = "trip", value_parser = parse_trip, required = true)]
        trips: Vec<TripInput>,
    },
    /// Log an expense (category must be configured)
    Expense {
        batch_id: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        category: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        description: Option<String>,
    },
    /// Print a batch's entries from one log (feed, mortality, sales, expense)
    Show { batch_id: String, log: String },
    /// Compute the closing audit
    Audit { batch_id: String },
    /// Finalize a batch after reviewing its closing audit
    Finalize {
        batch_id: String,
        /// Without this flag only the audit is printed
        #[arg(long)]
        confirm: bool,
    },
    /// Import an exported .xlsx workbook (one sheet per log)
    ImportWorkbook { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("loading configuration")?;
    logging::init_with_format(config.log_format);
    i18n::set_locale(&config.locale);

    tracing::debug!(version = poultry_ledger::VERSION, "starting");
    let state = AppState::new(config).context("opening row store")?;
    run(&state, cli.command, cli.json)
}

fn run(state: &AppState, command: Commands, json: bool) -> Result<()> {
    let ledger = &state.ledger;
    match command {
        Commands::Batches => {
            let batches = ledger.list_batches()?;
            if json {
                return print_json(&batches);
            }
            if batches.is_empty() {
                println!("{}", t("cli.no_batches"));
            }
            for batch in batches {
                let arrival = batch
                    .arrival_date
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<12} {:<14} {:>6} {}",
                    batch.batch_id,
                    i18n::status_label(batch.status),
                    batch.chick_count,
                    arrival
                );
            }
        }
        Commands::Create { batch_id } => {
            let batch = ledger.create_batch(&batch_id)?;
            report(json, &batch, t_with_args("cli.batch_created", &[("batch_id", batch.batch_id.as_str())]))?;
        }
        Commands::Status { batch_id } => {
            let session = ledger.open_session(&SessionContext::for_batch(&batch_id))?;
            let permissions = ledger.permissions(&batch_id)?;
            if json {
                return print_json(&permissions);
            }
            let label = match session.status {
                SessionStatus::New => t("status.new"),
                SessionStatus::Batch(status) => i18n::status_label(status),
            };
            println!("{}: {}", batch_id, label);
            for log in LogKind::EVENT_LOGS {
                let mark = if permissions.can_write(log) { "rw" } else { "r-" };
                println!("  {:<10} {}", t(&format!("log.{}", log.as_str())), mark);
            }
            if let Some(key) = &permissions.notice_key {
                println!("{}", t(key));
            }
        }
        Commands::Arrive {
            batch_id,
            date,
            chicks,
            price,
        } => {
            let batch =
                ledger.record_arrival(&batch_id, &ArrivalDetails::new(date, chicks, price))?;
            report(json, &batch, t_with_args("cli.arrival_recorded", &[("batch_id", batch.batch_id.as_str())]))?;
        }
        Commands::Feed {
            batch_id,
            date,
            bags,
            price,
            feed_type,
            is_return,
        } => {
            let input = FeedInput {
                date,
                action: if is_return {
                    FeedAction::Return
                } else {
                    FeedAction::Purchase
                },
                feed_type,
                bags,
                price_per_bag: price,
            };
            let entry = ledger.append_feed(&batch_id, &input)?;
            report(json, &entry, saved(LogKind::Feed))?;
        }
        Commands::Mortality {
            batch_id,
            date,
            count,
            reason,
        } => {
            let entry =
                ledger.append_mortality(&batch_id, &MortalityInput { date, count, reason })?;
            report(json, &entry, saved(LogKind::Mortality))?;
        }
        Commands::Sales {
            batch_id,
            date,
            price_per_kg,
            trips,
        } => {
            let grid = SalesGrid {
                date,
                price_per_kg,
                trips,
            };
            let entries = ledger.append_sales_grid(&batch_id, &grid)?;
            let count = entries.len().to_string();
            let log = t("log.sales");
            report(
                json,
                &entries,
                t_with_args("cli.rows_saved", &[("count", count.as_str()), ("log", log.as_str())]),
            )?;
        }
        Commands::Expense {
            batch_id,
            date,
            category,
            item,
            amount,
            description,
        } => {
            let input = ExpenseInput {
                date,
                category,
                item_name: item,
                description,
                amount,
            };
            let entry = ledger.append_expense(&batch_id, &input)?;
            report(json, &entry, saved(LogKind::Expense))?;
        }
        Commands::Show { batch_id, log } => {
            let kind = LogKind::from_name(&log)
                .with_context(|| format!("unknown log {log:?}"))?;
            match kind {
                LogKind::Dashboard => print_json(&ledger.get_batch(&batch_id)?)?,
                LogKind::Feed => print_json(&ledger.list_feed(&batch_id)?)?,
                LogKind::Mortality => print_json(&ledger.list_mortality(&batch_id)?)?,
                LogKind::Sales => print_json(&ledger.list_sales(&batch_id)?)?,
                LogKind::Expense => print_json(&ledger.list_expenses(&batch_id)?)?,
            }
        }
        Commands::Audit { batch_id } => {
            let view = ledger.closing_audit(&batch_id)?;
            if json {
                return print_json(&view);
            }
            print_audit(&view);
        }
        Commands::Finalize { batch_id, confirm } => {
            let view = ledger.closing_audit(&batch_id)?;
            if !confirm {
                if json {
                    return print_json(&view);
                }
                print_audit(&view);
                println!();
                println!("{}", t("audit.confirm_required"));
                return Ok(());
            }
            if !view.is_complete() {
                print_audit(&view);
                bail!("closing audit for {batch_id} is incomplete; not finalizing");
            }
            let batch = ledger.finalize_batch(&batch_id, &view)?;
            report(json, &batch, t_with_args("cli.batch_finalized", &[("batch_id", batch.batch_id.as_str())]))?;
        }
        Commands::ImportWorkbook { path } => {
            let report_data = state
                .import_workbook(&path)
                .with_context(|| format!("importing {}", path.display()))?;
            let count = report_data.total_rows().to_string();
            report(json, &report_data, t_with_args("cli.imported", &[("count", count.as_str())]))?;
            for sheet in &report_data.missing_sheets {
                tracing::warn!(sheet = %sheet, "worksheet not found in workbook");
            }
        }
    }
    Ok(())
}

// ==========================================
// Argument parsers
// ==========================================

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date_cell(raw)
}

/// "20:10,16.5:8" -> two containers (weight_kg:bird_count)
fn parse_trip(raw: &str) -> Result<TripInput, String> {
    let containers = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (weight, birds) = part
                .split_once(':')
                .ok_or_else(|| format!("container {part:?} must be weight:birds"))?;
            let weight_kg = weight
                .trim()
                .parse::<Decimal>()
                .map_err(|e| format!("weight {weight:?}: {e}"))?;
            let bird_count = birds
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("birds {birds:?}: {e}"))?;
            Ok(ContainerInput {
                bird_count,
                weight_kg,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    Ok(TripInput { containers })
}

// ==========================================
// Output
// ==========================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report<T: Serialize + ?Sized>(json: bool, value: &T, message: String) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{message}");
        Ok(())
    }
}

fn saved(log: LogKind) -> String {
    let name = t(&format!("log.{}", log.as_str()));
    t_with_args("cli.entry_saved", &[("log", name.as_str())])
}

fn print_audit(view: &ClosingAuditView) {
    let audit = &view.audit;
    println!("{}", t_with_args("audit.title", &[("batch_id", audit.batch_id.as_str())]));

    let rows: Vec<(&str, String)> = vec![
        ("audit.initial_chicks", audit.initial_chick_count.to_string()),
        ("audit.initial_investment", audit.initial_investment.to_string()),
        ("audit.total_feed_bags", audit.total_feed_bags.to_string()),
        ("audit.total_mortality", audit.total_mortality.to_string()),
        ("audit.total_birds_sold", audit.total_birds_sold.to_string()),
        ("audit.remaining_inventory", audit.remaining_inventory.to_string()),
        ("audit.total_revenue", audit.total_revenue.to_string()),
        ("audit.total_feed_cost", audit.total_feed_cost.to_string()),
        ("audit.net_total", audit.net_total.to_string()),
    ];
    for (key, value) in rows {
        println!("  {:<28} {:>14}", t(key), value);
    }
    for category in &audit.expense_totals {
        println!("  {:<28} {:>14}", category.category, category.total);
    }
    if !audit.other_expenses_total.is_zero() {
        println!("  {:<28} {:>14}", t("audit.other_expenses"), audit.other_expenses_total);
    }

    if audit.has_inventory_deficit() {
        let count = (-audit.remaining_inventory).to_string();
        println!("{}", t_with_args("audit.inventory_deficit", &[("count", count.as_str())]));
    }
    for failure in &view.read_failures {
        let log = t(&format!("log.{}", failure.log.as_str()));
        println!(
            "{}",
            t_with_args(
                "audit.read_failure",
                &[("log", log.as_str()), ("message", failure.message.as_str())]
            )
        );
    }
}
