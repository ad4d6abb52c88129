mod cli;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use cli::Cli;
use tracing::info;

use zvit::importers;
use zvit::rates::nbu::NbuProvider;
use zvit::rates::{resolver, RateCache};
use zvit::records::Batch;
use zvit::tax;
use zvit::valuation;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let today = match &cli.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --date value: {}", raw))?,
        None => Utc::now().date_naive(),
    };

    let mut batch = importers::import_statements(&cli.files)?;
    info!(
        "Batch: {} positions, {} trades, {} cash transactions",
        batch.positions.len(),
        batch.trades.len(),
        batch.transactions.len()
    );

    apply_inclusion_flags(&mut batch, &cli.include)?;

    // Per-batch cache: resolve every rate leg before any valuation
    let cache = RateCache::new();
    let provider = NbuProvider::new()?;
    resolver::resolve_rates(&cache, &provider, &batch, today).await?;

    valuation::value_batch(&mut batch, &cache, today);
    let summary = tax::summarize(&batch);

    if cli.json {
        println!("{}", cli::formatters::format_totals_json(&summary));
    } else {
        println!("\nTrades");
        println!("{}", cli::formatters::format_trades_table(&batch.trades));
        println!("\nOpen positions");
        println!(
            "{}",
            cli::formatters::format_positions_table(&batch.positions)
        );
        println!("{}", cli::formatters::format_totals(&summary));
    }

    Ok(())
}

/// Turn on the inclusion flag for the selected position rows.
fn apply_inclusion_flags(batch: &mut Batch, include: &[usize]) -> Result<()> {
    for &idx in include {
        let count = batch.positions.len();
        let position = batch
            .positions
            .get_mut(idx)
            .ok_or_else(|| anyhow!("--include {}: only {} open positions", idx, count))?;
        position.checked = true;
    }
    Ok(())
}
