use clap::Parser;

pub mod formatters;

#[derive(Parser)]
#[command(name = "zvit")]
#[command(
    version,
    about = "Interactive Brokers Flex statement tax report calculator (UAH)"
)]
#[command(
    long_about = "Reads Flex XML statement exports, converts positions, trades, and cash \
transactions to UAH using historical NBU exchange rates, and prints P/L tables with tax totals."
)]
pub struct Cli {
    /// Flex XML statement files to process as one batch
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Include an open position row (by its table index) in the unrealized
    /// P/L totals; repeatable
    #[arg(short, long = "include")]
    pub include: Vec<usize>,

    /// Mark-to-market date override (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,
}
