// ==========================================
// Poultry Ledger - Entry validation
// ==========================================
// Turns operator input into a log entry with its computed line value.
// Runs before any store call; a rejected input writes nothing.
// ==========================================

use crate::config::LedgerSchema;
use crate::domain::entries::{
    ExpenseEntry, ExpenseInput, FeedEntry, FeedInput, MortalityEntry, MortalityInput,
};
use crate::engine::rules::{invalid, RuleResult};
use rust_decimal::Decimal;

pub struct EntryRules;

impl EntryRules {
    /// Feed purchase or return. Returns carry negative bags and total.
    ///
    /// # Errors
    /// - Validation: bags < 1, negative price, or a line total too large to
    ///   represent
    pub fn feed(input: &FeedInput, batch_id: &str) -> RuleResult<FeedEntry> {
        if input.bags < 1 {
            return invalid(format!("bags must be at least 1 (got {})", input.bags));
        }
        if input.price_per_bag < Decimal::ZERO {
            return invalid("price per bag must not be negative");
        }

        let bags = input.bags * input.action.sign();
        let Some(line_total) = Decimal::from(bags).checked_mul(input.price_per_bag) else {
            return invalid(format!(
                "feed line total ({} bags x {}) is too large",
                input.bags, input.price_per_bag
            ));
        };
        Ok(FeedEntry {
            date: input.date,
            feed_type: input.feed_type.trim().to_string(),
            bags,
            price_per_bag: input.price_per_bag,
            line_total,
            batch_id: batch_id.to_string(),
        })
    }

    pub fn mortality(input: &MortalityInput, batch_id: &str) -> RuleResult<MortalityEntry> {
        if input.count < 1 {
            return invalid(format!(
                "mortality count must be at least 1 (got {})",
                input.count
            ));
        }

        Ok(MortalityEntry {
            date: input.date,
            count: input.count,
            batch_id: batch_id.to_string(),
            reason: non_blank(input.reason.as_deref()),
        })
    }

    /// # Errors
    /// - Validation: category not configured, blank item name, amount <= 0
    pub fn expense(
        input: &ExpenseInput,
        batch_id: &str,
        schema: &LedgerSchema,
    ) -> RuleResult<ExpenseEntry> {
        let category = input.category.trim();
        if !schema.is_expense_category(category) {
            return invalid(format!(
                "unknown expense category {:?} (expected one of {})",
                category,
                schema.expense_categories.join(", ")
            ));
        }
        let item_name = input.item_name.trim();
        if item_name.is_empty() {
            return invalid("item name must not be empty");
        }
        if input.amount <= Decimal::ZERO {
            return invalid("expense amount must be positive");
        }

        Ok(ExpenseEntry {
            date: input.date,
            category: category.to_string(),
            item_name: item_name.to_string(),
            description: non_blank(input.description.as_deref()),
            amount: input.amount,
            batch_id: batch_id.to_string(),
        })
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
