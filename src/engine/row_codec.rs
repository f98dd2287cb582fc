// ==========================================
// Poultry Ledger - Row codec
// ==========================================
// Entries <-> row fields, in persisted column order.
// Encoding never fails; decoding reports the offending header.
// ==========================================

use crate::config::ledger_schema::BATCH_ID_COLUMN;
use crate::domain::batch::Batch;
use crate::domain::entries::{ExpenseEntry, FeedEntry, MortalityEntry, SalesEntry};
use crate::domain::types::BatchStatus;
use crate::store::record::{format_date, Record};

// ==========================================
// Encoding
// ==========================================

pub fn encode_batch(batch: &Batch) -> Vec<String> {
    vec![
        batch.batch_id.clone(),
        batch.arrival_date.map(format_date).unwrap_or_default(),
        batch.chick_count.to_string(),
        batch.price_per_chick.to_string(),
        batch.initial_investment.to_string(),
        batch.status.to_db_str().to_string(),
    ]
}

pub fn encode_feed(entry: &FeedEntry) -> Vec<String> {
    vec![
        format_date(entry.date),
        entry.feed_type.clone(),
        entry.bags.to_string(),
        entry.price_per_bag.to_string(),
        entry.line_total.to_string(),
        entry.batch_id.clone(),
    ]
}

pub fn encode_mortality(entry: &MortalityEntry) -> Vec<String> {
    vec![
        format_date(entry.date),
        entry.count.to_string(),
        entry.batch_id.clone(),
        entry.reason.clone().unwrap_or_default(),
    ]
}

pub fn encode_sales(entry: &SalesEntry) -> Vec<String> {
    vec![
        format_date(entry.date),
        entry.trip_no.to_string(),
        entry.container_no.to_string(),
        entry.bird_count.to_string(),
        entry.weight_kg.to_string(),
        entry.price_per_kg.to_string(),
        entry.line_revenue.to_string(),
        entry.batch_id.clone(),
    ]
}

pub fn encode_expense(entry: &ExpenseEntry) -> Vec<String> {
    vec![
        format_date(entry.date),
        entry.category.clone(),
        entry.item_name.clone(),
        entry.description.clone().unwrap_or_default(),
        entry.amount.to_string(),
        entry.batch_id.clone(),
    ]
}

// ==========================================
// Decoding
// ==========================================

pub fn decode_batch(record: &Record) -> Result<Batch, String> {
    let status_cell = record.text("Status");
    let status = BatchStatus::from_db_str(status_cell)
        .ok_or_else(|| format!("Status: unknown label {:?}", status_cell))?;

    Ok(Batch {
        batch_id: record.text(BATCH_ID_COLUMN).to_string(),
        arrival_date: record.optional_date("Arrival_Date")?,
        chick_count: record.int("Chick_Count")?,
        price_per_chick: record.decimal("Price_Per_Chick")?,
        initial_investment: record.decimal("Initial_Investment")?,
        status,
    })
}

pub fn decode_feed(record: &Record) -> Result<FeedEntry, String> {
    Ok(FeedEntry {
        date: record.date("Date")?,
        feed_type: record.text("Feed_Type").to_string(),
        bags: record.int("Bags")?,
        price_per_bag: record.decimal("Price_Per_Bag")?,
        line_total: record.decimal("Daily_Total")?,
        batch_id: record.text(BATCH_ID_COLUMN).to_string(),
    })
}

pub fn decode_mortality(record: &Record) -> Result<MortalityEntry, String> {
    Ok(MortalityEntry {
        date: record.date("Date")?,
        count: record.int("Mortality_Count")?,
        batch_id: record.text(BATCH_ID_COLUMN).to_string(),
        reason: record.optional_text("Reason"),
    })
}

pub fn decode_sales(record: &Record) -> Result<SalesEntry, String> {
    let position = |header: &str| -> Result<u32, String> {
        let n = record.int(header)?;
        u32::try_from(n).map_err(|_| format!("{}: out of range {}", header, n))
    };

    Ok(SalesEntry {
        date: record.date("Date")?,
        trip_no: position("Trip_No")?,
        container_no: position("Container_No")?,
        bird_count: record.int("Bird_Count")?,
        weight_kg: record.decimal("Weight_Kg")?,
        price_per_kg: record.decimal("Price_Per_Kg")?,
        line_revenue: record.decimal("Total_Revenue")?,
        batch_id: record.text(BATCH_ID_COLUMN).to_string(),
    })
}

pub fn decode_expense(record: &Record) -> Result<ExpenseEntry, String> {
    Ok(ExpenseEntry {
        date: record.date("Date")?,
        category: record.text("Category").to_string(),
        item_name: record.text("Item_Name").to_string(),
        description: record.optional_text("Description"),
        amount: record.decimal("Price")?,
        batch_id: record.text(BATCH_ID_COLUMN).to_string(),
    })
}

/// Decode the rows tagged with `batch_id`.
///
/// Rows of other batches are skipped without being parsed, so a bad row
/// elsewhere in the log cannot break this batch. Matching is exact and
/// case-sensitive on the trimmed cell.
///
/// # Returns
/// - Err((row_index, message)) for the first row of this batch that fails
pub fn decode_for_batch<T>(
    records: &[Record],
    batch_id: &str,
    decode: fn(&Record) -> Result<T, String>,
) -> Result<Vec<T>, (usize, String)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.text(BATCH_ID_COLUMN) == batch_id)
        .map(|(i, record)| decode(record).map_err(|e| (i, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ledger_schema::{
        DASHBOARD_COLUMNS, EXPENSE_COLUMNS, FEED_COLUMNS, MORTALITY_COLUMNS, SALES_COLUMNS,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_new_batch_row_layout() {
        let row = encode_batch(&Batch::pre_arrival("B-01"));
        assert_eq!(row, vec!["B-01", "", "0", "0", "0", "Pre-Arrival"]);
        assert_eq!(row.len(), DASHBOARD_COLUMNS.len());
    }

    #[test]
    fn test_feed_row_layout() {
        let entry = FeedEntry {
            date: date(),
            feed_type: "Starter".into(),
            bags: 10,
            price_per_bag: Decimal::from(400),
            line_total: Decimal::from(4000),
            batch_id: "B-01".into(),
        };
        let row = encode_feed(&entry);
        assert_eq!(row, vec!["01/02/2024", "Starter", "10", "400", "4000", "B-01"]);

        let record = Record::from_row(&FEED_COLUMNS, &row);
        assert_eq!(decode_feed(&record).unwrap(), entry);
    }

    #[test]
    fn test_mortality_reason_is_optional() {
        let record = Record::from_row(&MORTALITY_COLUMNS, &["01/02/2024", "3", "B-01"]);
        let entry = decode_mortality(&record).unwrap();
        assert_eq!(entry.count, 3);
        assert!(entry.reason.is_none());
        assert_eq!(encode_mortality(&entry)[3], "");
    }

    #[test]
    fn test_sales_and_expense_rows() {
        let sales = SalesEntry {
            date: date(),
            trip_no: 1,
            container_no: 2,
            bird_count: 8,
            weight_kg: Decimal::from(16),
            price_per_kg: Decimal::from(150),
            line_revenue: Decimal::from(2400),
            batch_id: "B-01".into(),
        };
        let row = encode_sales(&sales);
        assert_eq!(row.len(), SALES_COLUMNS.len());
        assert_eq!(row[7], "B-01");
        assert_eq!(decode_sales(&Record::from_row(&SALES_COLUMNS, &row)).unwrap(), sales);

        let expense = ExpenseEntry {
            date: date(),
            category: "Medicine".into(),
            item_name: "Vaccine".into(),
            description: Some("Lasota".into()),
            amount: Decimal::new(12550, 2),
            batch_id: "B-01".into(),
        };
        let row = encode_expense(&expense);
        assert_eq!(row[4], "125.50");
        assert_eq!(
            decode_expense(&Record::from_row(&EXPENSE_COLUMNS, &row)).unwrap(),
            expense
        );
    }

    #[test]
    fn test_decode_batch_rejects_unknown_status() {
        let record = Record::from_row(&DASHBOARD_COLUMNS, &["B-01", "", "0", "0", "0", "Closed"]);
        let err = decode_batch(&record).unwrap_err();
        assert!(err.contains("Status"));
    }

    #[test]
    fn test_decode_batch_accepts_spreadsheet_cells() {
        let record = Record::from_row(
            &DASHBOARD_COLUMNS,
            &["B-01", "2024-01-10", "100.0", "50", "5000", "Active"],
        );
        let batch = decode_batch(&record).unwrap();
        assert_eq!(batch.chick_count, 100);
        assert_eq!(batch.arrival_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(batch.status, BatchStatus::Active);
    }

    #[test]
    fn test_decode_for_batch_skips_other_batches() {
        let records = vec![
            Record::from_row(&MORTALITY_COLUMNS, &["01/02/2024", "2", "B-01"]),
            Record::from_row(&MORTALITY_COLUMNS, &["garbage", "x", "B-02"]),
            Record::from_row(&MORTALITY_COLUMNS, &["02/02/2024", "1", "b-01"]),
            Record::from_row(&MORTALITY_COLUMNS, &["03/02/2024", "4", "B-01"]),
        ];

        let entries = decode_for_batch(&records, "B-01", decode_mortality).unwrap();
        assert_eq!(entries.iter().map(|e| e.count).collect::<Vec<_>>(), vec![2, 4]);

        let (row, _) = decode_for_batch(&records, "B-02", decode_mortality).unwrap_err();
        assert_eq!(row, 1);
    }
}
