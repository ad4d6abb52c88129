// Import module - Flex XML statement parser

pub mod flex_xml;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::error::StatementError;
use crate::records::Batch;

/// Import one or more Flex XML statements into a single batch.
///
/// Records from all files are concatenated in argument order. Any
/// unparseable file aborts the whole batch; there is no per-file skipping.
pub fn import_statements<P: AsRef<Path>>(paths: &[P]) -> Result<Batch> {
    let mut batch = Batch::new();

    for path in paths {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if extension != "xml" {
            return Err(
                StatementError::UnparseableInputFile(format!("{}: not an .xml file", path.display()))
                    .into(),
            );
        }

        let fragment = flex_xml::parse_flex_xml(path)?;
        info!(
            "Imported {}: {} positions, {} trades, {} cash transactions",
            path.display(),
            fragment.positions.len(),
            fragment.trades.len(),
            fragment.transactions.len()
        );

        batch.positions.extend(fragment.positions);
        batch.trades.extend(fragment.trades);
        batch.transactions.extend(fragment.transactions);
    }

    Ok(batch)
}
