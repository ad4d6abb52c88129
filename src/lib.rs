//! Zvit - Interactive Brokers Flex statement tax report calculator
//!
//! This library ingests Flex XML statement exports, converts positions,
//! trades, and cash transactions to UAH using historical NBU exchange
//! rates, and computes realized/unrealized P/L with tax totals.

pub mod error;
pub mod importers;
pub mod rates;
pub mod records;
pub mod tax;
pub mod utils;
pub mod valuation;
