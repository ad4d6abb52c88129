//! Valuation engine
//!
//! Pure per-record functions that convert statement amounts to UAH and
//! derive entry value (`in`), exit value (`out`), and profit/loss (`pl`)
//! per asset category. Depends only on a resolved [`RateLookup`]; the
//! resolver's barrier guarantees every needed rate is present.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::rates::RateLookup;
use crate::records::{AssetCategory, Batch, BuySell, Record, Value};

/// Withholding rate applied per dividend transaction row
pub const DIVIDEND_TAX_RATE: Decimal = Decimal::from_parts(14, 0, 0, false, 2);

/// Options carry a fixed 100-share contract multiplier; equities do not.
const CONTRACT_MULTIPLIER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Derive `rate`, `out`, and `tax` for a cash transaction.
pub fn value_transaction(record: &mut Record, rates: &impl RateLookup) -> Result<()> {
    let currency = required_text(record, "currency")?;
    let date = required_date(record, "dateTime")?;
    let amount = required_number(record, "amount")?;

    let rate = rates.rate(&currency, date)?;
    let out = amount * rate;

    record.set("rate", Value::Number(rate));
    record.set("out", Value::Number(out));
    record.set("tax", Value::Number(out * DIVIDEND_TAX_RATE));
    Ok(())
}

/// Derive `openRate`, `closeRate`, `in`, `out`, and `pl` for a closed trade
/// lot.
///
/// An unrecognized asset category (or an option lot with an unrecognized
/// buySell) is a diagnostic, not a failure: the rates are recorded, the
/// derived values stay unset, and totals later count the lot as zero.
pub fn value_trade(record: &mut Record, rates: &impl RateLookup) -> Result<()> {
    let currency = required_text(record, "currency")?;
    let close_date = required_date(record, "dateTime")?;
    let open_date = required_date(record, "openDateTime")?;

    let open_rate = rates.rate(&currency, open_date)?;
    let close_rate = rates.rate(&currency, close_date)?;
    record.set("openRate", Value::Number(open_rate));
    record.set("closeRate", Value::Number(close_rate));

    let category = record.text("assetCategory").unwrap_or_default().to_string();
    let (entry, exit) = match category.parse::<AssetCategory>() {
        Ok(AssetCategory::Stock) => {
            let cost = required_number(record, "cost")?;
            let fifo_pnl = required_number(record, "fifoPnlRealized")?;
            ((cost - fifo_pnl) * open_rate, cost * close_rate)
        }
        Ok(AssetCategory::Option) => {
            let cost = required_number(record, "cost")?;
            let fifo_pnl = required_number(record, "fifoPnlRealized")?;
            match record.text("buySell").unwrap_or_default().parse::<BuySell>() {
                // A bought option's cost flips sign relative to a stock lot
                Ok(BuySell::Buy) => ((-cost - fifo_pnl) * open_rate, -cost * close_rate),
                Ok(BuySell::Sell) => (cost * open_rate, (cost + fifo_pnl) * close_rate),
                Err(()) => {
                    warn!(
                        buy_sell = record.text("buySell").unwrap_or_default(),
                        "unknown buySell on option lot, leaving lot unvalued"
                    );
                    return Ok(());
                }
            }
        }
        Err(()) => {
            warn!(
                asset_category = %category,
                "unknown assetCategory on trade lot, leaving lot unvalued"
            );
            return Ok(());
        }
    };

    record.set("in", Value::Number(entry));
    record.set("out", Value::Number(exit));
    record.set("pl", Value::Number(exit - entry));
    Ok(())
}

/// Derive `openRate`, `closeRate`, `in`, `out`, and `pl` for an open
/// position, marking to market with today's rate and the mark price.
pub fn value_position(
    record: &mut Record,
    rates: &impl RateLookup,
    today: NaiveDate,
) -> Result<()> {
    let currency = required_text(record, "currency")?;
    let open_date = required_date(record, "openDateTime")?;

    let open_rate = rates.rate(&currency, open_date)?;
    let close_rate = rates.rate(&currency, today)?;
    record.set("openRate", Value::Number(open_rate));
    record.set("closeRate", Value::Number(close_rate));

    let category = record.text("assetCategory").unwrap_or_default().to_string();
    let (entry, exit) = match category.parse::<AssetCategory>() {
        Ok(AssetCategory::Stock) => {
            let quantity = required_number(record, "position")?;
            let open_price = required_number(record, "openPrice")?;
            let mark_price = required_number(record, "markPrice")?;
            (
                quantity * open_price * open_rate,
                quantity * mark_price * close_rate,
            )
        }
        Ok(AssetCategory::Option) => {
            let quantity = required_number(record, "position")?;
            let open_price = required_number(record, "openPrice")?;
            let mark_price = required_number(record, "markPrice")?;
            let mark_leg = mark_price * CONTRACT_MULTIPLIER * quantity * close_rate;
            let open_leg = open_price * CONTRACT_MULTIPLIER * quantity * open_rate;
            // A written (Short) option inverts the economics of a held one
            match record.text("side") {
                Some("Long") => (mark_leg, open_leg),
                _ => (-mark_leg, -open_leg),
            }
        }
        Err(()) => {
            warn!(
                asset_category = %category,
                "unknown assetCategory on open position, leaving position unvalued"
            );
            return Ok(());
        }
    };

    record.set("in", Value::Number(entry));
    record.set("out", Value::Number(exit));
    record.set("pl", Value::Number(exit - entry));
    Ok(())
}

/// Value every record of a batch in place.
///
/// Per-record failures (missing fields, rate misses) are logged and skipped
/// so one bad record degrades to a zero contribution instead of aborting
/// the batch.
pub fn value_batch(batch: &mut Batch, rates: &impl RateLookup, today: NaiveDate) {
    for transaction in &mut batch.transactions {
        if let Err(e) = value_transaction(transaction, rates) {
            warn!("skipping unvaluable cash transaction: {:#}", e);
        }
    }
    for trade in &mut batch.trades {
        if let Err(e) = value_trade(trade, rates) {
            warn!("skipping unvaluable trade lot: {:#}", e);
        }
    }
    for position in &mut batch.positions {
        if let Err(e) = value_position(&mut position.record, rates, today) {
            warn!("skipping unvaluable open position: {:#}", e);
        }
    }
}

fn required_text(record: &Record, field: &str) -> Result<String> {
    record
        .text(field)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing {} field", field))
}

fn required_number(record: &Record, field: &str) -> Result<Decimal> {
    record
        .number(field)
        .ok_or_else(|| anyhow!("missing numeric {} field", field))
}

fn required_date(record: &Record, field: &str) -> Result<NaiveDate> {
    record
        .date(field)
        .ok_or_else(|| anyhow!("missing date {} field", field))
}
