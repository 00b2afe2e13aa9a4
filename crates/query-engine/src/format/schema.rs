use protocol::ResultRow;
use std::collections::BTreeSet;

/// Prefix marking service-generated metadata fields.
pub const METADATA_MARKER: char = '@';

/// Metadata fields that always lead, in this order, when present.
pub const CANONICAL_METADATA_FIELDS: [&str; 4] = ["@timestamp", "@message", "@logStream", "@log"];

pub fn is_metadata_field(name: &str) -> bool {
    name.starts_with(METADATA_MARKER)
}

/// Column set of one result set: canonical metadata fields first, then other
/// metadata fields, then ordinary fields, each tail sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
}

impl FieldSchema {
    pub fn from_rows(rows: &[ResultRow], exclude_metadata: bool) -> Self {
        let names: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .filter(|name| !(exclude_metadata && is_metadata_field(name)))
            .collect();

        let mut fields: Vec<String> = CANONICAL_METADATA_FIELDS
            .iter()
            .filter(|name| names.contains(**name))
            .map(|name| name.to_string())
            .collect();
        let (metadata, ordinary): (Vec<&str>, Vec<&str>) = names
            .into_iter()
            .filter(|name| !CANONICAL_METADATA_FIELDS.contains(name))
            .partition(|name| is_metadata_field(name));
        fields.extend(metadata.into_iter().map(str::to_string));
        fields.extend(ordinary.into_iter().map(str::to_string));

        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values of `row` in schema order; absent fields become empty strings.
    pub fn materialize<'a>(&'a self, row: &'a ResultRow) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .map(move |field| row.get(field).map(String::as_str).unwrap_or(""))
    }
}
