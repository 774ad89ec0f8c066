
use anyhow::{bail, Context};
use log::debug;
use std::path::Path;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;
use crate::parsing::tabular::{get_field, get_optional_field, open_delimited_reader, parse_position, ColumnLookup};
use crate::parsing::{split_genes, SvResultParser};

/// Decoder for Samplot variant tables
pub struct SamplotCsvParser {
    source: String
}

impl SamplotCsvParser {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string()
        }
    }
}

impl SvResultParser for SamplotCsvParser {
    fn source(&self) -> &str {
        &self.source
    }

    fn parse(&self, filename: &Path, delimiter: u8) -> anyhow::Result<Vec<StructuralVariant>> {
        let mut csv_reader = open_delimited_reader(filename, delimiter)?;

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(result) => result.with_context(|| format!("Error while reading header of {filename:?}"))?,
            None => bail!("Missing header line in {filename:?}")
        };
        let lookup = ColumnLookup::new(
            header.iter().enumerate().map(|(i, f)| if i == 0 { f.trim_start_matches('#') } else { f })
        );
        let chrom_index = lookup.required(&["chrom", "chr"])?;
        let start_index = lookup.required(&["start"])?;
        let end_index = lookup.required(&["end"])?;
        let type_index = lookup.required(&["type", "svtype", "sv_type"])?;
        let chrom2_index = lookup.optional(&["chrom2", "chr2"]);
        let id_index = lookup.optional(&["id", "name"]);
        let genes_index = lookup.optional(&["genes", "gene"]);

        let mut variants = vec![];
        for result in records {
            let row = result.with_context(|| format!("Error while reading {filename:?}"))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let chrom = get_field(&row, chrom_index, "chrom")?;
            let start = parse_position(get_field(&row, start_index, "start")?)
                .with_context(|| format!("Error while parsing start on line {line} of {filename:?}"))?;
            let end = parse_position(get_field(&row, end_index, "end")?)
                .with_context(|| format!("Error while parsing end on line {line} of {filename:?}"))?;
            let sv_type = SvType::from_caller_label(get_field(&row, type_index, "type")?);
            let chrom2 = get_optional_field(&row, chrom2_index).unwrap_or(chrom);
            let default_id = line.to_string();
            let id = get_optional_field(&row, id_index).unwrap_or(&default_id);

            let variant = StructuralVariant::new_breakend_pair(&self.source, id, chrom, start, chrom2, end, sv_type)
                .with_context(|| format!("Error while parsing line {line} of {filename:?}"))?;
            let genes = get_optional_field(&row, genes_index)
                .map(split_genes)
                .unwrap_or_default();
            variants.push(variant.with_genes(genes));
        }

        debug!("Parsed {} Samplot rows from {filename:?}", variants.len());
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_example_samplot() {
        let parser = SamplotCsvParser::new("samplot");
        let variants = parser.parse(&PathBuf::from("test_data/example_samplot.tsv"), b'\t').unwrap();
        assert_eq!(variants.len(), 4);

        let del = &variants[0];
        assert_eq!(del.id(), "sp1");
        assert_eq!(del.chrom1(), "chr1");
        assert_eq!((del.pos1(), del.pos2()), (990, 2010));
        assert_eq!(del.primary_type(), SvType::Del);
        assert!(del.genes().contains("GENE2"));

        let bnd = &variants[1];
        assert_eq!(bnd.primary_type(), SvType::Bnd);
        assert_eq!(bnd.chrom2(), "chr2");
        assert!(!bnd.is_intra_chromosomal());

        // an absent chrom2 cell means the same chromosome
        let dup = &variants[2];
        assert_eq!(dup.primary_type(), SvType::Dup);
        assert_eq!(dup.chrom2(), "chrY");
        assert_eq!(dup.length(), Some(5000));

        // an absent id falls back to the line number
        let inv = &variants[3];
        assert_eq!(inv.id(), "5");
        assert_eq!(inv.primary_type(), SvType::Inv);
    }

    #[test]
    fn test_missing_required_column() {
        let parser = SamplotCsvParser::new("samplot");
        assert!(parser.parse(&PathBuf::from("test_data/example.smap"), b'\t').is_err());
    }
}
