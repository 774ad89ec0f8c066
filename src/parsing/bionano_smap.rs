
use anyhow::{bail, Context};
use log::debug;
use std::path::Path;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;
use crate::parsing::tabular::{detect_delimiter, get_field, get_optional_field, open_delimited_reader, parse_position, ColumnLookup};
use crate::parsing::{split_genes, SvResultParser};

/// Decoder for Bionano Solve structural variant maps (smap).
/// The column header is the row starting with `#h`; all other `#` rows are metadata.
/// Both tab and comma separated files are accepted, the delimiter is taken from the `#h` row.
pub struct BionanoSmapParser {
    /// Tag for every decoded variant
    source: String
}

impl BionanoSmapParser {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string()
        }
    }
}

/// Resolves the numeric contig IDs used by Bionano into chromosome names
fn bionano_chrom(raw: &str) -> &str {
    match raw.trim() {
        "23" => "X",
        "24" => "Y",
        "25" => "M",
        other => other
    }
}

/// Header fields from a `#h` row; the marker may be a separate field or a prefix of the first name
fn header_fields(row: &csv::StringRecord) -> Vec<&str> {
    row.iter()
        .enumerate()
        .map(|(i, field)| if i == 0 { field.trim_start_matches("#h").trim() } else { field.trim() })
        .filter(|f| !f.is_empty())
        .collect()
}

impl SvResultParser for BionanoSmapParser {
    fn source(&self) -> &str {
        &self.source
    }

    fn parse(&self, filename: &Path, delimiter: u8) -> anyhow::Result<Vec<StructuralVariant>> {
        let delimiter = detect_delimiter(filename, "#h", delimiter)?;
        let mut csv_reader = open_delimited_reader(filename, delimiter)?;

        let mut lookup: Option<ColumnLookup> = None;
        let mut columns = (0, 0, 0, 0, 0, 0);
        let mut genes_index = None;
        let mut variants = vec![];
        for result in csv_reader.records() {
            let row = result.with_context(|| format!("Error while reading {filename:?}"))?;
            let first = row.get(0).unwrap_or_default().trim_start();
            if first.starts_with("#h") {
                let header = ColumnLookup::new(header_fields(&row));
                columns = (
                    header.required(&["SmapEntryID"])?,
                    header.required(&["RefcontigID1"])?,
                    header.required(&["RefcontigID2"])?,
                    header.required(&["RefStartPos"])?,
                    header.required(&["RefEndPos"])?,
                    header.required(&["Type"])?
                );
                genes_index = header.optional(&["OverlapGenes", "Genes"]);
                lookup = Some(header);
                continue;
            } else if first.starts_with('#') {
                continue;
            }

            if lookup.is_none() {
                bail!("Found a data row before the \"#h\" header in {filename:?}: {row:?}");
            }

            let (id_index, chrom1_index, chrom2_index, start_index, end_index, type_index) = columns;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let id = get_field(&row, id_index, "SmapEntryID")?;
            let chrom1 = bionano_chrom(get_field(&row, chrom1_index, "RefcontigID1")?);
            let chrom2 = bionano_chrom(get_field(&row, chrom2_index, "RefcontigID2")?);
            let start = parse_position(get_field(&row, start_index, "RefStartPos")?)
                .with_context(|| format!("Error while parsing RefStartPos on line {line} of {filename:?}"))?;
            let end = parse_position(get_field(&row, end_index, "RefEndPos")?)
                .with_context(|| format!("Error while parsing RefEndPos on line {line} of {filename:?}"))?;
            let sv_type = SvType::from_caller_label(get_field(&row, type_index, "Type")?);

            let variant = if sv_type.is_breakend() || chrom1 != chrom2 {
                StructuralVariant::new_breakend_pair(&self.source, id, chrom1, start, chrom2, end, sv_type)
            } else {
                StructuralVariant::new_interval(&self.source, id, chrom1, start, end, sv_type)
            }.with_context(|| format!("Error while parsing line {line} of {filename:?}"))?;

            let genes = get_optional_field(&row, genes_index)
                .map(split_genes)
                .unwrap_or_default();
            variants.push(variant.with_genes(genes));
        }

        if lookup.is_none() {
            bail!("Missing \"#h\" header line in {filename:?}");
        }
        debug!("Parsed {} smap entries from {filename:?}", variants.len());
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_example_smap() {
        let parser = BionanoSmapParser::new("bionano");
        let variants = parser.parse(&PathBuf::from("test_data/example.smap"), b'\t').unwrap();
        assert_eq!(variants.len(), 5);

        let del = &variants[0];
        assert_eq!(del.source(), "bionano");
        assert_eq!(del.id(), "1");
        assert_eq!(del.chrom1(), "chr1");
        assert_eq!(del.pos1(), 1000);
        assert_eq!(del.pos2(), 2000);
        assert_eq!(del.primary_type(), SvType::Del);
        assert!(del.genes().contains("GENE1"));
        assert!(del.genes().contains("GENE2"));

        // float coordinates are rounded
        let ins = &variants[1];
        assert_eq!(ins.primary_type(), SvType::Ins);
        assert_eq!(ins.chrom1(), "chr2");
        assert_eq!((ins.pos1(), ins.pos2()), (3000, 3101));
        assert!(ins.genes().is_empty());

        let tra = &variants[2];
        assert_eq!(tra.primary_type(), SvType::Bnd);
        assert_eq!(tra.chrom1(), "chr1");
        assert_eq!(tra.chrom2(), "chr2");
        assert_eq!((tra.pos1(), tra.pos2()), (5000, 8000));

        let inv = &variants[3];
        assert_eq!(inv.primary_type(), SvType::Inv);
        assert_eq!(inv.chrom1(), "chrX");
        // reversed coordinates are ordered
        assert_eq!((inv.pos1(), inv.pos2()), (40000, 50000));

        let dup = &variants[4];
        assert_eq!(dup.primary_type(), SvType::Dup);
        assert_eq!(dup.chrom1(), "chrY");
    }

    #[test]
    fn test_comma_smap() {
        let parser = BionanoSmapParser::new("bionano");
        let tab_variants = parser.parse(&PathBuf::from("test_data/example.smap"), b'\t').unwrap();
        let comma_variants = parser.parse(&PathBuf::from("test_data/example_comma.smap"), b'\t').unwrap();
        assert_eq!(tab_variants, comma_variants);
    }

    #[test]
    fn test_missing_header() {
        let parser = BionanoSmapParser::new("bionano");
        assert!(parser.parse(&PathBuf::from("test_data/example_samplot.tsv"), b'\t').is_err());
    }
}
