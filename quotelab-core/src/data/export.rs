//! CSV export of a quote table, derived columns included.

use crate::data::window::DATE_FORMAT;
use crate::domain::QuoteTable;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Render the table as CSV.
///
/// Columns: date, open, high, low, close, volume, adj_close (only if any bar
/// has one), then derived columns. Undefined (NaN) values are empty cells.
pub fn export_table_csv(table: &QuoteTable) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let with_adj = table.has_adj_close();

    let mut header = vec!["date", "open", "high", "low", "close", "volume"];
    if with_adj {
        header.push("adj_close");
    }
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (i, bar) in table.bars().iter().enumerate() {
        let mut record = vec![
            bar.date.format(DATE_FORMAT).to_string(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            cell(bar.volume),
        ];
        if with_adj {
            record.push(bar.adj_close.map(cell).unwrap_or_default());
        }
        record.extend(table.columns().iter().map(|c| cell(c.values[i])));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(data)?)
}

impl QuoteTable {
    pub fn to_csv(&self) -> Result<String, ExportError> {
        export_table_csv(self)
    }
}

/// Write [`export_table_csv`] output to `path`.
pub fn write_table_csv(table: &QuoteTable, path: &Path) -> Result<(), ExportError> {
    let csv = export_table_csv(table)?;
    std::fs::write(path, csv).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
