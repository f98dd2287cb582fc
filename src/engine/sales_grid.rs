// ==========================================
// Poultry Ledger - Sales grid expansion
// ==========================================
// One submission = trips x containers; every (trip, container) pair becomes
// its own Sales_Log row sharing the date and price per kg.
// The whole grid is validated before any row is produced.
// ==========================================

use crate::domain::entries::{SalesEntry, SalesGrid};
use crate::engine::rules::{invalid, RuleResult};
use rust_decimal::Decimal;

pub struct SalesGridExpander;

impl SalesGridExpander {
    /// Validate every container of the grid
    ///
    /// # Errors
    /// - Validation naming the first offending trip/container (1-based)
    pub fn validate(grid: &SalesGrid) -> RuleResult<()> {
        if grid.price_per_kg < Decimal::ZERO {
            return invalid("price per kg must not be negative");
        }
        if grid.trips.is_empty() {
            return invalid("sales submission has no trips");
        }

        for (t, trip) in grid.trips.iter().enumerate() {
            let trip_no = t + 1;
            if trip.containers.is_empty() {
                return invalid(format!("trip {} has no containers", trip_no));
            }
            for (c, container) in trip.containers.iter().enumerate() {
                let container_no = c + 1;
                if container.bird_count < 1 {
                    return invalid(format!(
                        "trip {} container {}: bird count must be at least 1",
                        trip_no, container_no
                    ));
                }
                if container.weight_kg <= Decimal::ZERO {
                    return invalid(format!(
                        "trip {} container {}: weight must be positive",
                        trip_no, container_no
                    ));
                }
                if container.weight_kg.checked_mul(grid.price_per_kg).is_none() {
                    return invalid(format!(
                        "trip {} container {}: revenue (weight x price per kg) is too large",
                        trip_no, container_no
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate and expand the grid into Sales_Log entries, in trip then
    /// container order
    pub fn expand(grid: &SalesGrid, batch_id: &str) -> RuleResult<Vec<SalesEntry>> {
        Self::validate(grid)?;

        let mut entries = Vec::with_capacity(grid.container_count());
        for (trip_no, trip) in (1u32..).zip(&grid.trips) {
            for (container_no, container) in (1u32..).zip(&trip.containers) {
                let Some(line_revenue) = container.weight_kg.checked_mul(grid.price_per_kg) else {
                    return invalid(format!(
                        "trip {} container {}: revenue is too large",
                        trip_no, container_no
                    ));
                };
                entries.push(SalesEntry {
                    date: grid.date,
                    trip_no,
                    container_no,
                    bird_count: container.bird_count,
                    weight_kg: container.weight_kg,
                    price_per_kg: grid.price_per_kg,
                    line_revenue,
                    batch_id: batch_id.to_string(),
                });
            }
        }
        Ok(entries)
    }
}
