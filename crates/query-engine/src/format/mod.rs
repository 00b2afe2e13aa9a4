//! Rendering of sparse result rows as a table, CSV or JSON.

mod csv;
mod json;
mod schema;
mod table;

use protocol::ResultRow;
use std::fmt;
use std::str::FromStr;

pub use schema::{is_metadata_field, FieldSchema, CANONICAL_METADATA_FIELDS, METADATA_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format {other:?} (expected table, csv or json)"
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("failed to encode results as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `rows` in `format`.
///
/// `Ok(None)` means there is nothing to show: no rows, an empty first row,
/// or no columns left once metadata fields are excluded. The rendered text
/// carries no trailing newline.
pub fn format_rows(
    rows: &[ResultRow],
    format: OutputFormat,
    exclude_metadata: bool,
) -> Result<Option<String>, FormatError> {
    match rows.first() {
        None => return Ok(None),
        Some(first) if first.is_empty() => return Ok(None),
        Some(_) => {}
    }
    let schema = FieldSchema::from_rows(rows, exclude_metadata);
    if schema.is_empty() {
        return Ok(None);
    }

    let rendered = match format {
        OutputFormat::Table => table::render(&schema, rows),
        OutputFormat::Csv => csv::render(&schema, rows),
        OutputFormat::Json => json::render(&schema, rows)?,
    };
    Ok(Some(rendered))
}
