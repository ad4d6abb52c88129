// Rates module - NBU exchange-rate cache, provider, and batch resolver

pub mod nbu;
pub mod resolver;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StatementError;

/// State of one (currency, date) cache slot
#[derive(Debug, Clone, Copy, PartialEq)]
enum RateSlot {
    /// Reserved: a fetch for this key is in flight. Blocks duplicates.
    Pending,
    Resolved(Decimal),
}

/// Memoizes exchange-rate lookups by (currency, date) for one batch.
///
/// Constructed per batch and passed by reference to the resolver, valuation
/// engine, and aggregator. For a given key, exactly one fetch is issued for
/// the lifetime of the cache: `reserve` wins only for the first caller, and
/// every reader observes the same resolved value after the resolver's
/// barrier. The mutex makes reservation/set safe on a multi-threaded
/// runtime.
#[derive(Debug, Default)]
pub struct RateCache {
    slots: Mutex<HashMap<(String, NaiveDate), RateSlot>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved rate for the key, if any. Pending slots read as absent.
    pub fn get(&self, currency: &str, date: NaiveDate) -> Option<Decimal> {
        let slots = self.slots.lock().unwrap();
        match slots.get(&(currency.to_string(), date)) {
            Some(RateSlot::Resolved(rate)) => Some(*rate),
            _ => None,
        }
    }

    /// Mark a key as pending before its fetch starts.
    ///
    /// Returns true only for the first caller; a scan that discovers the
    /// same requirement twice gets false and must not dispatch a fetch.
    pub fn reserve(&self, currency: &str, date: NaiveDate) -> bool {
        let mut slots = self.slots.lock().unwrap();
        match slots.entry((currency.to_string(), date)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(RateSlot::Pending);
                true
            }
        }
    }

    /// Resolve a pending key with its fetched rate.
    pub fn set(&self, currency: &str, date: NaiveDate, rate: Decimal) {
        let mut slots = self.slots.lock().unwrap();
        slots.insert((currency.to_string(), date), RateSlot::Resolved(rate));
    }

    /// Number of reserved or resolved keys.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().unwrap().is_empty()
    }
}

/// Read-only rate lookup the valuation engine depends on.
///
/// Seam between the cache and the pure valuation functions; tests substitute
/// a fixed map.
pub trait RateLookup {
    fn rate(&self, currency: &str, date: NaiveDate) -> crate::error::Result<Decimal>;
}

impl RateLookup for RateCache {
    fn rate(&self, currency: &str, date: NaiveDate) -> crate::error::Result<Decimal> {
        self.get(currency, date).ok_or_else(|| {
            StatementError::RateUnavailable {
                currency: currency.to_string(),
                date,
            }
            .into()
        })
    }
}
