// ==========================================
// Poultry Ledger - Event log entries
// ==========================================
// Four append-only logs, each row tagged with a batch id and a date.
// Entries are never edited; corrections are new compensating rows.
// ==========================================

use crate::domain::types::FeedAction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// FeedEntry
// ==========================================
// Feed_Log: [Date, Feed_Type, Bags, Price_Per_Bag, Daily_Total, Batch_ID]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub date: NaiveDate,
    pub feed_type: String,
    pub bags: i64, // negative for returns
    pub price_per_bag: Decimal,
    pub line_total: Decimal, // bags x price_per_bag
    pub batch_id: String,
}

impl FeedEntry {
    pub fn action(&self) -> FeedAction {
        FeedAction::from_signed_bags(self.bags)
    }
}

/// Operator input for a feed row, before the sign and line total are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedInput {
    pub date: NaiveDate,
    pub action: FeedAction,
    pub feed_type: String,
    pub bags: i64,
    pub price_per_bag: Decimal,
}

// ==========================================
// MortalityEntry
// ==========================================
// Mortality_Log: [Date, Mortality_Count, Batch_ID, Reason]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityEntry {
    pub date: NaiveDate,
    pub count: i64,
    pub batch_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityInput {
    pub date: NaiveDate,
    pub count: i64,
    pub reason: Option<String>,
}

// ==========================================
// SalesEntry
// ==========================================
// Sales_Log:
// [Date, Trip_No, Container_No, Bird_Count, Weight_Kg, Price_Per_Kg, Total_Revenue, Batch_ID]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesEntry {
    pub date: NaiveDate,
    pub trip_no: u32,
    pub container_no: u32,
    pub bird_count: i64,
    pub weight_kg: Decimal,
    pub price_per_kg: Decimal,
    pub line_revenue: Decimal, // weight_kg x price_per_kg
    pub batch_id: String,
}

/// One container within a sales trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerInput {
    pub bird_count: i64,
    pub weight_kg: Decimal,
}

/// A sales trip: containers in loading order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripInput {
    pub containers: Vec<ContainerInput>,
}

/// Grid submission: several trips sharing one date and one price per kg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesGrid {
    pub date: NaiveDate,
    pub price_per_kg: Decimal,
    pub trips: Vec<TripInput>,
}

impl SalesGrid {
    /// Number of (trip, container) pairs, i.e. rows the grid expands to
    pub fn container_count(&self) -> usize {
        self.trips.iter().map(|t| t.containers.len()).sum()
    }
}

// ==========================================
// ExpenseEntry
// ==========================================
// Expenses_Log: [Date, Category, Item_Name, Description, Price, Batch_ID]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub date: NaiveDate,
    pub category: String,
    pub item_name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub batch_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub category: String,
    pub item_name: String,
    pub description: Option<String>,
    pub amount: Decimal,
}
