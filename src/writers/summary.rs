
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::source_summary::SourceSummary;

/// Label for the row aggregating every variant type of a source
pub const ALL_TYPES: &str = "ALL";

/// Contains all the data written to each row of our stats file
#[derive(Debug, PartialEq, Serialize)]
struct SummaryRow {
    /// The source tag
    source: String,
    /// The effective variant type represented by this row
    variant_type: String,
    /// Number of variants of this type
    count: u64,
    /// Number of matched base variants; only set on the ALL row
    matched: Option<u64>
}

/// This is a wrapper for writing out per-source statistics to a file
pub struct SummaryWriter {
    summaries: Vec<SourceSummary>
}

impl SummaryWriter {
    /// Creates a new writer from the base summary followed by the other sources
    pub fn new(summaries: Vec<SourceSummary>) -> Self {
        Self {
            summaries
        }
    }

    /// Flattens the summaries into rows, ALL first for each source
    fn rows(&self) -> Vec<SummaryRow> {
        let mut rows = vec![];
        for summary in self.summaries.iter() {
            rows.push(SummaryRow {
                source: summary.source().to_string(),
                variant_type: ALL_TYPES.to_string(),
                count: summary.total(),
                matched: Some(summary.matched())
            });
            for (sv_type, &count) in summary.type_counts().iter() {
                rows.push(SummaryRow {
                    source: summary.source().to_string(),
                    variant_type: sv_type.to_string(),
                    count,
                    matched: None
                });
            }
        }
        rows
    }

    /// Will write the summary out to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    pub fn write_summary(&self, filename: &Path) -> csv::Result<()> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        for row in self.rows().iter() {
            csv_writer.serialize(row)?;
        }

        // save everything
        csv_writer.flush()?;
        Ok(())
    }
}
