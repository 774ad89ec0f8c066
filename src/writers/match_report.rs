
use anyhow::Context;
use itertools::Itertools;
use log::debug;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::data_types::match_set::MatchSet;
use crate::data_types::structural_variant::StructuralVariant;

/// Per-variant columns, shared by the base and every other source
const VARIANT_FIELDS: [&str; 8] = ["id", "type", "chrom1", "pos1", "chrom2", "pos2", "length", "genes"];
/// Extra columns only present for other sources
const DELTA_FIELDS: [&str; 2] = ["pos1_delta", "pos2_delta"];
/// Label for the base column group
pub const BASE_LABEL: &str = "base";

/// Writes the correlation report, one row per base variant in input order
pub struct MatchReportWriter {
    /// The other-source tags, in column order
    source_tags: Vec<String>
}

/// Formats a gene set as a sorted, ';'-joined cell
fn join_genes(genes: &BTreeSet<String>) -> String {
    genes.iter().join(";")
}

/// Converts a variant into the shared per-variant cells
fn variant_cells(variant: &StructuralVariant, sv_type: String) -> Vec<String> {
    vec![
        variant.id().to_string(),
        sv_type,
        variant.chrom1().to_string(),
        variant.pos1().to_string(),
        variant.chrom2().to_string(),
        variant.pos2().to_string(),
        variant.length().map(|l| l.to_string()).unwrap_or_default(),
        join_genes(variant.genes())
    ]
}

/// Returns `{filename}.tmp` next to the final output
fn temporary_path(filename: &Path) -> PathBuf {
    let mut tmp_name: OsString = filename.as_os_str().to_owned();
    tmp_name.push(".tmp");
    PathBuf::from(tmp_name)
}

impl MatchReportWriter {
    /// Creates a new writer for the given other sources
    /// # Arguments
    /// * `source_tags` - tags of the other sources, in the order they were compared
    pub fn new(source_tags: Vec<String>) -> Self {
        Self {
            source_tags
        }
    }

    /// Builds the header row
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = VARIANT_FIELDS.iter()
            .map(|f| format!("{BASE_LABEL}_{f}"))
            .collect();
        for tag in self.source_tags.iter() {
            header.extend(
                VARIANT_FIELDS.iter()
                    .chain(DELTA_FIELDS.iter())
                    .map(|f| format!("{tag}_{f}"))
            );
        }
        header.push("common_genes".to_string());
        header
    }

    /// Builds the row for a single match set; unmatched sources produce empty cells
    pub fn format_row(&self, match_set: &MatchSet) -> Vec<String> {
        let mut row = variant_cells(match_set.base(), match_set.base_type().to_string());
        for tag in self.source_tags.iter() {
            match (match_set.get_match(tag), match_set.deltas(tag)) {
                (Some(sv_match), Some((delta1, delta2))) => {
                    row.extend(variant_cells(sv_match.variant(), sv_match.sv_type().to_string()));
                    row.push(delta1.to_string());
                    row.push(delta2.to_string());
                },
                _ => {
                    row.extend(vec![String::new(); VARIANT_FIELDS.len() + DELTA_FIELDS.len()]);
                }
            };
        }
        row.push(join_genes(match_set.common_genes()));
        row
    }

    /// Writes the full report. Output goes to a temporary sibling file which replaces `filename` only on success.
    /// # Arguments
    /// * `filename` - the report path; `,` delimited if it ends with .csv, tab otherwise
    /// * `match_sets` - the comparator output
    /// # Errors
    /// * if the temporary file cannot be written or renamed
    pub fn write_report(&self, filename: &Path, match_sets: &[MatchSet]) -> anyhow::Result<()> {
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let tmp_filename = temporary_path(filename);

        debug!("Writing {} report rows to {tmp_filename:?}...", match_sets.len());
        if let Err(e) = self.write_rows(&tmp_filename, delimiter, match_sets) {
            let _ = std::fs::remove_file(&tmp_filename);
            return Err(e);
        }

        std::fs::rename(&tmp_filename, filename)
            .with_context(|| format!("Error while renaming {tmp_filename:?} to {filename:?}:"))?;
        Ok(())
    }

    fn write_rows(&self, filename: &Path, delimiter: u8, match_sets: &[MatchSet]) -> anyhow::Result<()> {
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)
            .with_context(|| format!("Error while creating {filename:?}:"))?;

        csv_writer.write_record(self.header())
            .with_context(|| format!("Error while writing header to {filename:?}:"))?;
        for match_set in match_sets.iter() {
            csv_writer.write_record(self.format_row(match_set))
                .with_context(|| format!("Error while writing row for {:?} to {filename:?}:", match_set.base().id()))?;
        }
        csv_writer.flush()
            .with_context(|| format!("Error while flushing {filename:?}:"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::match_set::SvMatch;
    use crate::data_types::sv_type::SvType;

    fn genes(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_header() {
        let writer = MatchReportWriter::new(vec!["annotsv".to_string(), "samplot".to_string()]);
        let header = writer.header();
        assert_eq!(header.len(), 8 + 2 * 10 + 1);
        assert_eq!(header[0], "base_id");
        assert_eq!(header[8], "annotsv_id");
        assert_eq!(header[17], "annotsv_pos2_delta");
        assert_eq!(header[18], "samplot_id");
        assert_eq!(header.last().unwrap(), "common_genes");
    }

    #[test]
    fn test_format_row() {
        let base = StructuralVariant::new_interval("bionano", "b1", "chr1", 1000, 2000, SvType::Del).unwrap()
            .with_genes(genes(&["GENE2", "GENE1"]));
        let other = StructuralVariant::new_interval("annotsv", "a1", "chr1", 1010, 1995, SvType::Del).unwrap()
            .with_genes(genes(&["GENE1"]));

        let mut match_set = MatchSet::new(&base, SvType::Del);
        match_set.add_match("annotsv", Some(SvMatch::new(&other, SvType::Del)));
        match_set.add_match("samplot", None);
        match_set.finalize_genes();

        let writer = MatchReportWriter::new(vec!["annotsv".to_string(), "samplot".to_string()]);
        let row = writer.format_row(&match_set);
        assert_eq!(row.len(), writer.header().len());
        assert_eq!(&row[0..8], &["b1", "DEL", "chr1", "1000", "chr1", "2000", "1000", "GENE1;GENE2"]);
        assert_eq!(&row[8..18], &["a1", "DEL", "chr1", "1010", "chr1", "1995", "985", "GENE1", "10", "-5"]);
        assert!(row[18..28].iter().all(|c| c.is_empty()));
        assert_eq!(row[28], "GENE1");
    }

    #[test]
    fn test_cross_chromosome_length() {
        let base = StructuralVariant::new_breakend_pair("bionano", "b2", "chr1", 5000, "chr2", 8000, SvType::Bnd).unwrap();
        let match_set = MatchSet::new(&base, SvType::Bnd);
        let writer = MatchReportWriter::new(vec![]);
        let row = writer.format_row(&match_set);
        assert_eq!(row.len(), 9);
        assert_eq!(row[6], "");
    }

    #[test]
    fn test_write_report() {
        let base = StructuralVariant::new_interval("bionano", "b1", "chr1", 1000, 2000, SvType::Del).unwrap();
        let mut match_set = MatchSet::new(&base, SvType::Del);
        match_set.add_match("samplot", None);
        match_set.finalize_genes();

        let out_fn = std::env::temp_dir().join(format!("om_hts_svc_report_{}.csv", std::process::id()));
        let writer = MatchReportWriter::new(vec!["samplot".to_string()]);
        writer.write_report(&out_fn, &[match_set]).unwrap();
        assert!(!temporary_path(&out_fn).exists());

        let written = std::fs::read_to_string(&out_fn).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("base_id,base_type,"));
        assert!(lines[1].starts_with("b1,DEL,chr1,1000,chr1,2000,1000,"));
        std::fs::remove_file(&out_fn).unwrap();
    }

    #[test]
    fn test_write_report_failure() {
        let out_fn = std::env::temp_dir()
            .join(format!("om_hts_svc_missing_{}", std::process::id()))
            .join("report.tsv");
        let writer = MatchReportWriter::new(vec![]);
        assert!(writer.write_report(&out_fn, &[]).is_err());
        assert!(!out_fn.exists());
    }
}
