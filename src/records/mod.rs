//! Record data model shared by positions, trades, and cash transactions
//!
//! Statement elements arrive as flat attribute maps. Field values are typed
//! once at parse time into a tagged [`Value`] so downstream code never
//! re-infers string vs number vs date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// ISO date prefix as it appears in Flex attributes (`2024-01-02`,
/// `2024-01-02;093000`, full timestamps).
static ISO_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").expect("valid regex"));

/// A statement attribute value, typed at parse time
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Decimal),
    Text(String),
    /// Date prefix of a date or datetime attribute. Only the day is ever
    /// used: rates are daily and tables render the `YYYY-MM-DD` slice.
    Date(NaiveDate),
}

impl Value {
    /// Infer the value type from a raw attribute string.
    ///
    /// Numbers win over dates because no decimal-parseable string matches
    /// the dashed ISO prefix.
    pub fn infer(raw: &str) -> Value {
        if let Ok(n) = Decimal::from_str(raw) {
            return Value::Number(n);
        }
        if let Some(caps) = ISO_DATE_PREFIX.captures(raw) {
            if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
                return Value::Date(date);
            }
        }
        Value::Text(raw.to_string())
    }
}

/// A flat, ordered field map for one statement element.
///
/// Order is preserved so report tables show columns in statement order,
/// with derived fields appended after the source fields.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace a field, appending new fields at the end.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<Decimal> {
        match self.get(name) {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Asset categories supported by the valuation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Stock,
    Option,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Stock => "STK",
            AssetCategory::Option => "OPT",
        }
    }
}

impl FromStr for AssetCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STK" => Ok(AssetCategory::Stock),
            "OPT" => Ok(AssetCategory::Option),
            _ => Err(()),
        }
    }
}

/// Trade direction, reported for option lots only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuySell {
    Buy,
    Sell,
}

impl FromStr for BuySell {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(BuySell::Buy),
            "SELL" => Ok(BuySell::Sell),
            _ => Err(()),
        }
    }
}

/// An open position row plus its user-toggled inclusion flag.
///
/// `checked` gates whether the position's unrealized P/L counts toward the
/// positions tax totals. It defaults to off and lives only for the batch.
#[derive(Debug, Clone)]
pub struct Position {
    pub record: Record,
    pub checked: bool,
}

impl Position {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            checked: false,
        }
    }
}

/// One ingestion run's worth of statement records.
///
/// Rebuilt fully per batch of input files; nothing persists across runs.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub positions: Vec<Position>,
    pub trades: Vec<Record>,
    pub transactions: Vec<Record>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of the batch, for whole-batch scans.
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.positions
            .iter()
            .map(|p| &p.record)
            .chain(self.trades.iter())
            .chain(self.transactions.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.trades.is_empty() && self.transactions.is_empty()
    }
}
