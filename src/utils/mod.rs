//! Display formatting helpers
//!
//! Rounding lives here and only here: aggregation and valuation always run
//! on unrounded values, and tables/totals round at the last moment.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to two decimal places for display, midpoint away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a number the way the report tables expect: two decimals, no
/// trailing-zero stripping surprises.
pub fn display_number(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}
