//! Output formatting module for CLI display
//!
//! Renders valued records as dynamic-column tables (columns follow the
//! statement's own attribute order, derived fields last) and the tax
//! summary as a totals block. Presentation only; nothing here mutates
//! records or recomputes values.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Style},
};

use zvit::records::{Position, Record, Value};
use zvit::tax::TaxSummary;
use zvit::utils::{display_number, round2};

/// Render one cell. Dates show their `YYYY-MM-DD` slice; numbers are
/// rounded to two decimals; the P/L column is colored by sign.
fn format_cell(name: &str, value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Date(date) => date.format("%Y-%m-%d").to_string(),
        Value::Number(number) => {
            let rendered = display_number(*number);
            if name == "pl" {
                if *number >= Decimal::ZERO {
                    rendered.green().to_string()
                } else {
                    rendered.red().to_string()
                }
            } else {
                rendered
            }
        }
    }
}

/// Union of field names across records, in first-seen order.
fn column_names<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in record.iter() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// Format the closed trades table.
pub fn format_trades_table(trades: &[Record]) -> String {
    if trades.is_empty() {
        return format!("{} No trades in statement\n", "ℹ".blue().bold());
    }

    let columns = column_names(trades.iter());
    let mut builder = Builder::default();
    builder.push_record(columns.clone());
    for trade in trades {
        builder.push_record(columns.iter().map(|name| {
            trade
                .get(name)
                .map(|value| format_cell(name, value))
                .unwrap_or_default()
        }));
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Rows::new(1..), Alignment::right());
    table.to_string()
}

/// Format the open positions table, with a row index and inclusion flag
/// column in front of the statement fields.
pub fn format_positions_table(positions: &[Position]) -> String {
    if positions.is_empty() {
        return format!("{} No open positions in statement\n", "ℹ".blue().bold());
    }

    let columns = column_names(positions.iter().map(|p| &p.record));
    let mut builder = Builder::default();

    let mut header = vec!["#".to_string(), "inc".to_string()];
    header.extend(columns.clone());
    builder.push_record(header);

    for (idx, position) in positions.iter().enumerate() {
        let mut row = vec![
            idx.to_string(),
            if position.checked { "[x]" } else { "[ ]" }.to_string(),
        ];
        row.extend(columns.iter().map(|name| {
            position
                .record
                .get(name)
                .map(|value| format_cell(name, value))
                .unwrap_or_default()
        }));
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Rows::new(1..), Alignment::right());
    table.to_string()
}

/// Format the six category scalars plus combined totals.
pub fn format_totals(summary: &TaxSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{} Totals (UAH)\n", "━".repeat(40).bright_black()));

    let rows = [
        ("Dividends income:", summary.dividends_income),
        ("Dividends tax:", summary.dividends_tax),
        ("Trades income:", summary.trades_income),
        ("Trades tax:", summary.trades_tax),
        ("Positions income:", summary.positions_income),
        ("Positions tax:", summary.positions_tax),
    ];
    for (label, value) in rows {
        output.push_str(&format!("{:<20} {}\n", label.bold(), display_number(value)));
    }

    let income_colored = if summary.total_income >= Decimal::ZERO {
        display_number(summary.total_income).green()
    } else {
        display_number(summary.total_income).red()
    };
    output.push_str(&format!("{:<20} {}\n", "Total income:".bold(), income_colored));
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total tax:".bold(),
        display_number(summary.total_tax)
    ));
    output
}

/// Format the summary for JSON output. Scalars are rounded the same way
/// the tables are; consumers wanting exact values use the library.
pub fn format_totals_json(summary: &TaxSummary) -> String {
    #[derive(Serialize)]
    struct JsonSummary {
        dividends_income: Decimal,
        dividends_tax: Decimal,
        trades_income: Decimal,
        trades_tax: Decimal,
        positions_income: Decimal,
        positions_tax: Decimal,
        total_income: Decimal,
        total_tax: Decimal,
    }

    let rounded = JsonSummary {
        dividends_income: round2(summary.dividends_income),
        dividends_tax: round2(summary.dividends_tax),
        trades_income: round2(summary.trades_income),
        trades_tax: round2(summary.trades_tax),
        positions_income: round2(summary.positions_income),
        positions_tax: round2(summary.positions_tax),
        total_income: round2(summary.total_income),
        total_tax: round2(summary.total_tax),
    };

    serde_json::to_string_pretty(&rounded)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}
