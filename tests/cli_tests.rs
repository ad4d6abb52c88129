//! Binary-level CLI tests
//!
//! Only paths that never reach the network are exercised here: argument
//! validation, unparseable files, and currencies rejected before any
//! request is built.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn zvit() -> Command {
    Command::cargo_bin("zvit").unwrap()
}

fn write_statement(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_requires_at_least_one_file() {
    zvit()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_rejects_non_xml_input() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,amount").unwrap();

    zvit()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unparseable input file"));
}

#[test]
fn test_rejects_invalid_date_override() {
    let file = write_statement("<FlexStatement />");
    zvit()
        .arg(file.path())
        .args(["--date", "02/01/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --date value"));
}

#[test]
fn test_unsupported_currency_fails_before_network() {
    let file = write_statement(
        r#"<FlexStatement>
             <CashTransactions>
               <CashTransaction currency="XAU" dateTime="2024-01-02" type="Dividends" amount="100" />
             </CashTransactions>
           </FlexStatement>"#,
    );

    zvit()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported currency: XAU"));
}

#[test]
fn test_empty_statement_prints_zero_totals_json() {
    let file = write_statement("<FlexStatement />");
    zvit()
        .arg(file.path())
        .args(["--json", "--no-color", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_income\": \"0\""));
}

#[test]
fn test_include_index_out_of_range_is_rejected() {
    let file = write_statement("<FlexStatement />");
    zvit()
        .arg(file.path())
        .args(["--include", "0", "--date", "2024-06-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only 0 open positions"));
}
