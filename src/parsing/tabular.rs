
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::data_types::structural_variant::SvError;

/// Opens a text file for reading, transparently decompressing it if the path ends with .gz
/// # Arguments
/// * `filename` - path to the (optionally gzipped) file
pub fn open_text_reader(filename: &Path) -> anyhow::Result<Box<dyn Read>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::read::MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(reader)
}

/// Builds a delimited reader that yields every row (headers included) as a record.
/// Rows may have differing numbers of fields, and quotes are treated as literal characters.
/// # Arguments
/// * `filename` - path to the (optionally gzipped) file
/// * `delimiter` - the field delimiter
pub fn open_delimited_reader(filename: &Path, delimiter: u8) -> anyhow::Result<csv::Reader<Box<dyn Read>>> {
    let reader = open_text_reader(filename)?;
    let csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false) // the formats differ in how headers are marked, so the decoders handle them
        .flexible(true)
        .quoting(false)
        .from_reader(reader);
    Ok(csv_reader)
}

/// Picks the delimiter of a file from its header line; tab wins over comma if both are present.
/// # Arguments
/// * `filename` - path to the (optionally gzipped) file
/// * `header_marker` - prefix identifying the header line
/// * `default` - returned if no header line is found or it has neither delimiter
pub fn detect_delimiter(filename: &Path, header_marker: &str, default: u8) -> anyhow::Result<u8> {
    let reader = BufReader::new(open_text_reader(filename)?);
    for line in reader.lines() {
        let line = line.with_context(|| format!("Error while reading {filename:?}:"))?;
        if line.trim_start().starts_with(header_marker) {
            let delimiter = if line.contains('\t') {
                b'\t'
            } else if line.contains(',') {
                b','
            } else {
                default
            };
            return Ok(delimiter);
        }
    }
    Ok(default)
}

/// Case-insensitive lookup from a header column name to its index
#[derive(Clone, Debug, Default)]
pub struct ColumnLookup {
    /// Lower-cased column name -> index, first occurrence wins
    columns: IndexMap<String, usize>
}

impl ColumnLookup {
    /// Builds the lookup from header fields
    /// # Arguments
    /// * `header` - the column names, in file order
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(header: I) -> Self {
        let mut columns: IndexMap<String, usize> = Default::default();
        for (index, name) in header.into_iter().enumerate() {
            columns.entry(name.trim().to_ascii_lowercase()).or_insert(index);
        }
        Self {
            columns
        }
    }

    /// Returns the index of the first provided name that is present
    /// # Arguments
    /// * `names` - acceptable names for the column, in order of preference
    pub fn optional(&self, names: &[&str]) -> Option<usize> {
        names.iter()
            .find_map(|n| self.columns.get(&n.to_ascii_lowercase()).copied())
    }

    /// Same as `optional(...)`, but missing columns are an error
    /// # Errors
    /// * if none of the names is in the header
    pub fn required(&self, names: &[&str]) -> anyhow::Result<usize> {
        self.optional(names)
            .ok_or(anyhow!("Missing required column {:?} in header", names[0]))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Fetches a field from a row, failing if the row is too short
/// # Arguments
/// * `row` - the parsed row
/// * `index` - column index from the `ColumnLookup`
/// * `label` - column label for error messages
pub fn get_field<'r>(row: &'r csv::StringRecord, index: usize, label: &str) -> anyhow::Result<&'r str> {
    row.get(index)
        .map(|f| f.trim())
        .ok_or(anyhow!("Missing {label} field on row: {row:?}"))
}

/// Fetches an optional field, returning None for missing or empty cells
pub fn get_optional_field(row: &csv::StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|i| row.get(i))
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
}

/// Parses a coordinate, which may be written as an integer or a float (e.g., "12345.6" in smap files)
/// # Errors
/// * if the value is not a finite non-negative number
pub fn parse_position(raw: &str) -> Result<u64, SvError> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Ok(value);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value.round() as u64),
        _ => Err(SvError::InvalidPosition { raw: raw.to_string() })
    }
}
