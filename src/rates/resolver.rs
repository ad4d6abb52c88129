//! Batch rate resolver
//!
//! Scans every record of a batch, reserves the complete set of
//! (currency, date) legs in the cache, and fetches them concurrently.
//! Returns only once every dispatched fetch has settled, so valuation
//! never reads a partially resolved cache.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::error::StatementError;
use crate::rates::nbu::RateProvider;
use crate::rates::RateCache;
use crate::records::{Batch, Record, Value};

/// Date fields that carry their own exchange-rate leg
const LEG_DATE_FIELDS: [&str; 2] = ["dateTime", "openDateTime"];

/// Populate the cache with every rate the batch needs.
///
/// For each record's currency this requires today's rate (mark-to-market of
/// open positions) plus one rate per present leg date field. Each key is
/// fetched exactly once; a single failed fetch aborts the whole batch
/// (propagate-and-abort - callers wanting partial tolerance must substitute
/// a fallback at the provider boundary).
pub async fn resolve_rates(
    cache: &RateCache,
    provider: &dyn RateProvider,
    batch: &Batch,
    today: NaiveDate,
) -> Result<()> {
    let mut wanted: Vec<(String, NaiveDate)> = Vec::new();

    for record in batch.all_records() {
        let currency = match record.text("currency") {
            Some(currency) => currency,
            None => {
                warn!("record without currency field, skipping rate legs");
                continue;
            }
        };

        wanted.push((currency.to_string(), today));
        for field in LEG_DATE_FIELDS {
            if let Some(date) = leg_date(record, field)? {
                wanted.push((currency.to_string(), date));
            }
        }
    }

    let mut fetches = Vec::new();
    for (currency, date) in wanted {
        if cache.reserve(&currency, date) {
            fetches.push(async move {
                let rate = provider
                    .fetch_rate(&currency, date)
                    .await
                    .with_context(|| format!("rate fetch failed for {} on {}", currency, date))?;
                cache.set(&currency, date, rate);
                Ok::<(), anyhow::Error>(())
            });
        }
    }

    debug!("resolving {} distinct rate legs", fetches.len());
    try_join_all(fetches).await?;
    Ok(())
}

/// Extract a leg date field, rejecting present-but-malformed values.
fn leg_date(record: &Record, field: &str) -> Result<Option<NaiveDate>> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::Date(date)) => Ok(Some(*date)),
        Some(Value::Text(raw)) => {
            Err(StatementError::InvalidDateFormat(format!("{}={}", field, raw)).into())
        }
        Some(Value::Number(raw)) => {
            Err(StatementError::InvalidDateFormat(format!("{}={}", field, raw)).into())
        }
    }
}
