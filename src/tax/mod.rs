//! Tax aggregation
//!
//! Sums per-record P/L into category totals and applies the category tax
//! rates. Aggregation runs on unrounded values; rounding to two decimal
//! places happens only at display time.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::records::Batch;
use crate::valuation::DIVIDEND_TAX_RATE;

/// Tax rate on realized trade P/L and on included unrealized position P/L
pub const TRADING_TAX_RATE: Decimal = Decimal::from_parts(24, 0, 0, false, 2);

/// Cash transaction type whose `out` counts as dividend income
const DIVIDENDS_TYPE: &str = "Dividends";

/// Category incomes, taxes, and grand totals for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    pub dividends_income: Decimal,
    pub dividends_tax: Decimal,
    pub trades_income: Decimal,
    pub trades_tax: Decimal,
    pub positions_income: Decimal,
    pub positions_tax: Decimal,
    pub total_income: Decimal,
    pub total_tax: Decimal,
}

/// Aggregate a valued batch into category and grand totals.
///
/// Records without derived values (unrecognized category, skipped during
/// valuation) contribute zero. Positions count only while their inclusion
/// flag is on.
pub fn summarize(batch: &Batch) -> TaxSummary {
    let dividends_income: Decimal = batch
        .transactions
        .iter()
        .filter(|t| t.text("type") == Some(DIVIDENDS_TYPE))
        .filter_map(|t| t.number("out"))
        .sum();
    let dividends_tax = dividends_income * DIVIDEND_TAX_RATE;

    let trades_income: Decimal = batch.trades.iter().filter_map(|t| t.number("pl")).sum();
    let trades_tax = trades_income * TRADING_TAX_RATE;

    let positions_income: Decimal = batch
        .positions
        .iter()
        .filter(|p| p.checked)
        .filter_map(|p| p.record.number("pl"))
        .sum();
    let positions_tax = positions_income * TRADING_TAX_RATE;

    TaxSummary {
        dividends_income,
        dividends_tax,
        trades_income,
        trades_tax,
        positions_income,
        positions_tax,
        total_income: dividends_income + trades_income + positions_income,
        total_tax: dividends_tax + trades_tax + positions_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Position, Record, Value};
    use rust_decimal_macros::dec;

    fn transaction(kind: &str, out: Decimal) -> Record {
        let mut record = Record::new();
        record.set("type", Value::Text(kind.to_string()));
        record.set("out", Value::Number(out));
        record
    }

    fn with_pl(pl: Decimal) -> Record {
        let mut record = Record::new();
        record.set("pl", Value::Number(pl));
        record
    }

    #[test]
    fn test_empty_batch_is_all_zero() {
        let summary = summarize(&Batch::new());
        assert_eq!(summary.total_income, Decimal::ZERO);
        assert_eq!(summary.total_tax, Decimal::ZERO);
        assert_eq!(summary.dividends_income, Decimal::ZERO);
        assert_eq!(summary.positions_tax, Decimal::ZERO);
    }

    #[test]
    fn test_only_dividend_transactions_count() {
        let mut batch = Batch::new();
        batch.transactions.push(transaction("Dividends", dec!(2750)));
        batch
            .transactions
            .push(transaction("Withholding Tax", dec!(-400)));

        let summary = summarize(&batch);
        assert_eq!(summary.dividends_income, dec!(2750));
        assert_eq!(summary.dividends_tax, dec!(385.0000));
    }

    #[test]
    fn test_trades_income_sums_all_lots() {
        let mut batch = Batch::new();
        batch.trades.push(with_pl(dec!(2350)));
        batch.trades.push(with_pl(dec!(-150)));
        // Unvalued lot (no pl) counts as zero
        batch.trades.push(Record::new());

        let summary = summarize(&batch);
        assert_eq!(summary.trades_income, dec!(2200));
        assert_eq!(summary.trades_tax, dec!(528.0000));
    }

    #[test]
    fn test_unchecked_positions_are_excluded() {
        let mut batch = Batch::new();
        batch.positions.push(Position::new(with_pl(dec!(1000))));
        batch.positions.push(Position::new(with_pl(dec!(500))));

        let summary = summarize(&batch);
        assert_eq!(summary.positions_income, Decimal::ZERO);
    }

    #[test]
    fn test_toggle_moves_totals_by_exactly_that_position() {
        let mut batch = Batch::new();
        batch.transactions.push(transaction("Dividends", dec!(100)));
        batch.trades.push(with_pl(dec!(200)));
        batch.positions.push(Position::new(with_pl(dec!(1000))));
        batch.positions.push(Position::new(with_pl(dec!(-300))));

        let before = summarize(&batch);
        batch.positions[0].checked = true;
        let after = summarize(&batch);

        assert_eq!(after.positions_income - before.positions_income, dec!(1000));
        assert_eq!(
            after.positions_tax - before.positions_tax,
            dec!(1000) * TRADING_TAX_RATE
        );
        assert_eq!(after.dividends_income, before.dividends_income);
        assert_eq!(after.trades_income, before.trades_income);
    }

    #[test]
    fn test_totals_are_three_way_sums() {
        let mut batch = Batch::new();
        batch.transactions.push(transaction("Dividends", dec!(100)));
        batch.trades.push(with_pl(dec!(200)));
        let mut position = Position::new(with_pl(dec!(-50)));
        position.checked = true;
        batch.positions.push(position);

        let summary = summarize(&batch);
        assert_eq!(
            summary.total_income,
            summary.dividends_income + summary.trades_income + summary.positions_income
        );
        assert_eq!(
            summary.total_tax,
            summary.dividends_tax + summary.trades_tax + summary.positions_tax
        );
        assert_eq!(summary.total_income, dec!(250));
    }
}
