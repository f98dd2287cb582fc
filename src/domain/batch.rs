// ==========================================
// Poultry Ledger - Batch domain model
// ==========================================
// One flock cycle, tracked from chick arrival to the closing audit
// Aligned with the Dashboard log:
// [Batch_ID, Arrival_Date, Chick_Count, Price_Per_Chick, Initial_Investment, Status]
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Batch
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String, // immutable once created

    // ===== Arrival details (unset until Active) =====
    pub arrival_date: Option<NaiveDate>,
    pub chick_count: i64,
    pub price_per_chick: Decimal,
    pub initial_investment: Decimal, // chick_count x price_per_chick

    pub status: BatchStatus,
}

impl Batch {
    /// A freshly created batch: only the identifier is known
    pub fn pre_arrival(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            arrival_date: None,
            chick_count: 0,
            price_per_chick: Decimal::ZERO,
            initial_investment: Decimal::ZERO,
            status: BatchStatus::PreArrival,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }

    pub fn is_finalized(&self) -> bool {
        self.status == BatchStatus::Finalized
    }
}

// ==========================================
// ArrivalDetails - input for PreArrival -> Active
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalDetails {
    pub arrival_date: NaiveDate,
    pub chick_count: i64,
    pub price_per_chick: Decimal,
}

impl ArrivalDetails {
    pub fn new(arrival_date: NaiveDate, chick_count: i64, price_per_chick: Decimal) -> Self {
        Self {
            arrival_date,
            chick_count,
            price_per_chick,
        }
    }

    /// Initial investment = count x price; None when it does not fit a Decimal
    pub fn initial_investment(&self) -> Option<Decimal> {
        Decimal::from(self.chick_count).checked_mul(self.price_per_chick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_arrival_batch_has_no_arrival_details() {
        let batch = Batch::pre_arrival("B-01");
        assert_eq!(batch.status, BatchStatus::PreArrival);
        assert!(batch.arrival_date.is_none());
        assert_eq!(batch.chick_count, 0);
        assert_eq!(batch.initial_investment, Decimal::ZERO);
    }

    #[test]
    fn test_initial_investment_is_count_times_price() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let arrival = ArrivalDetails::new(date, 100, Decimal::new(505, 1));
        assert_eq!(arrival.initial_investment(), Some(Decimal::from(5050)));
    }
}
