//! Flex XML statement parser
//!
//! Streams a brokerage Flex statement and extracts the three element kinds
//! the calculator consumes: `OpenPositions/OpenPosition`, `Trades/Lot`, and
//! `CashTransactions/CashTransaction`. Every element attribute becomes a
//! typed record field; nothing else in the document is interpreted.

use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::debug;

use crate::error::StatementError;
use crate::records::{Batch, Position, Record, Value};

/// Container element currently being scanned
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    OpenPositions,
    Trades,
    CashTransactions,
}

/// Parse one Flex XML file into a batch fragment.
pub fn parse_flex_xml<P: AsRef<Path>>(path: P) -> Result<Batch> {
    let path = path.as_ref();
    let mut reader = Reader::from_file(path)
        .map_err(|e| StatementError::UnparseableInputFile(format!("{}: {}", path.display(), e)))?;
    reader.config_mut().trim_text(true);

    let mut batch = Batch::new();
    let mut section = Section::None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| unparseable(path, &e))?;

        match event {
            Event::Start(ref element) => {
                match element.name().as_ref() {
                    b"OpenPositions" => section = Section::OpenPositions,
                    b"Trades" => section = Section::Trades,
                    b"CashTransactions" => section = Section::CashTransactions,
                    _ => collect(&mut batch, section, element, path)?,
                }
            }
            Event::Empty(ref element) => collect(&mut batch, section, element, path)?,
            Event::End(ref element) => match element.name().as_ref() {
                b"OpenPositions" | b"Trades" | b"CashTransactions" => section = Section::None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Parsed {}: {} positions, {} trades, {} cash transactions",
        path.display(),
        batch.positions.len(),
        batch.trades.len(),
        batch.transactions.len()
    );
    Ok(batch)
}

/// Turn a statement element into a record if it belongs to the current
/// section. Unknown elements are passed over untouched.
fn collect(batch: &mut Batch, section: Section, element: &BytesStart, path: &Path) -> Result<()> {
    let wanted = match (section, element.name().as_ref()) {
        (Section::OpenPositions, b"OpenPosition") => true,
        (Section::Trades, b"Lot") => true,
        (Section::CashTransactions, b"CashTransaction") => true,
        _ => false,
    };
    if !wanted {
        return Ok(());
    }

    let record = attributes_to_record(element, path)?;
    match section {
        Section::OpenPositions => batch.positions.push(Position::new(record)),
        Section::Trades => batch.trades.push(record),
        Section::CashTransactions => batch.transactions.push(record),
        Section::None => unreachable!("wanted elements always have a section"),
    }
    Ok(())
}

/// Build a record from an element's attributes, inferring each value type.
fn attributes_to_record(element: &BytesStart, path: &Path) -> Result<Record> {
    let mut record = Record::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| unparseable(path, &e))?;
        let name = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let raw = attribute
            .unescape_value()
            .map_err(|e| unparseable(path, &e))?;
        record.set(&name, Value::infer(&raw));
    }
    Ok(record)
}

fn unparseable(path: &Path, err: &dyn std::fmt::Display) -> StatementError {
    StatementError::UnparseableInputFile(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_statement(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<FlexQueryResponse>
  <FlexStatements>
    <FlexStatement>
      <OpenPositions>
        <OpenPosition currency="USD" openDateTime="2023-12-01;093000" assetCategory="STK"
                      position="10" openPrice="90" markPrice="110" />
      </OpenPositions>
      <Trades>
        <Lot currency="USD" dateTime="2024-01-02;093000" openDateTime="2023-12-01;093000"
             assetCategory="STK" cost="1000" fifoPnlRealized="50" />
        <Lot currency="EUR" dateTime="2024-01-03;100000" openDateTime="2023-11-15;100000"
             assetCategory="OPT" buySell="SELL" cost="300" fifoPnlRealized="120" />
      </Trades>
      <CashTransactions>
        <CashTransaction currency="USD" dateTime="2024-02-01;120000" type="Dividends" amount="100" />
      </CashTransactions>
    </FlexStatement>
  </FlexStatements>
</FlexQueryResponse>"#;

    #[test]
    fn test_extracts_all_three_record_kinds() {
        let file = write_statement(SAMPLE);
        let batch = parse_flex_xml(file.path()).unwrap();

        assert_eq!(batch.positions.len(), 1);
        assert_eq!(batch.trades.len(), 2);
        assert_eq!(batch.transactions.len(), 1);
    }

    #[test]
    fn test_attribute_types_are_inferred_once() {
        let file = write_statement(SAMPLE);
        let batch = parse_flex_xml(file.path()).unwrap();

        let lot = &batch.trades[0];
        assert_eq!(lot.text("currency"), Some("USD"));
        assert_eq!(lot.number("cost"), Some(dec!(1000)));
        assert_eq!(
            lot.date("dateTime"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );

        let position = &batch.positions[0];
        assert_eq!(position.record.number("markPrice"), Some(dec!(110)));
        assert!(!position.checked);
    }

    #[test]
    fn test_elements_outside_their_section_are_ignored() {
        let file = write_statement(
            r#"<FlexStatement>
                 <Lot currency="USD" cost="1000" />
                 <Trades><Lot currency="USD" cost="1000" /></Trades>
               </FlexStatement>"#,
        );
        let batch = parse_flex_xml(file.path()).unwrap();
        assert_eq!(batch.trades.len(), 1);
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let file = write_statement("<FlexStatement><Trades></FlexStatement>");
        let err = parse_flex_xml(file.path()).unwrap_err();
        assert!(err.to_string().contains("unparseable input file"));
    }
}
