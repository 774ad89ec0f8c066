
use anyhow::{bail, Context};
use log::debug;
use std::path::Path;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;
use crate::parsing::tabular::{get_field, get_optional_field, open_delimited_reader, parse_position, ColumnLookup};
use crate::parsing::{parse_breakend_alt, split_genes, SvResultParser};

/// Decoder for the AnnotSV annotation table.
/// Only `full` annotation rows are kept; `split` rows repeat the same SV once per overlapped gene.
pub struct AnnotSvTsvParser {
    source: String
}

impl AnnotSvTsvParser {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string()
        }
    }
}

/// Column indices of a parsed AnnotSV header
struct AnnotSvColumns {
    chrom: usize,
    start: usize,
    end: usize,
    sv_type: usize,
    id: Option<usize>,
    alt: Option<usize>,
    info: Option<usize>,
    genes: Option<usize>,
    mode: Option<usize>
}

impl AnnotSvColumns {
    fn new(lookup: &ColumnLookup) -> anyhow::Result<Self> {
        Ok(Self {
            chrom: lookup.required(&["SV_chrom"])?,
            start: lookup.required(&["SV_start"])?,
            end: lookup.required(&["SV_end"])?,
            sv_type: lookup.required(&["SV_type"])?,
            id: lookup.optional(&["AnnotSV_ID", "ID"]),
            alt: lookup.optional(&["ALT"]),
            info: lookup.optional(&["INFO"]),
            genes: lookup.optional(&["Gene_name"]),
            mode: lookup.optional(&["Annotation_mode"])
        })
    }
}

/// Extracts the `SVTYPE2` value from a VCF-style INFO string, e.g. `END=2000;SVTYPE=BND;SVTYPE2=DEL`
fn info_alternate_type(info: &str) -> Option<SvType> {
    info.split(';')
        .filter_map(|entry| entry.split_once('='))
        .find(|(key, _value)| key.trim().eq_ignore_ascii_case("SVTYPE2"))
        .map(|(_key, value)| SvType::from_caller_label(value))
        .filter(|sv_type| *sv_type != SvType::Unk)
}

impl SvResultParser for AnnotSvTsvParser {
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
        // the header may carry a leading comment marker
        let lookup = ColumnLookup::new(
            header.iter().enumerate().map(|(i, f)| if i == 0 { f.trim_start_matches('#') } else { f })
        );
        let col = AnnotSvColumns::new(&lookup)
            .with_context(|| format!("Error while parsing header of {filename:?}"))?;

        let mut variants = vec![];
        let mut num_split = 0;
        for result in records {
            let row = result.with_context(|| format!("Error while reading {filename:?}"))?;
            if get_optional_field(&row, col.mode).is_some_and(|m| m.eq_ignore_ascii_case("split")) {
                num_split += 1;
                continue;
            }

            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let chrom = get_field(&row, col.chrom, "SV_chrom")?;
            let start = parse_position(get_field(&row, col.start, "SV_start")?)
                .with_context(|| format!("Error while parsing SV_start on line {line} of {filename:?}"))?;
            let end = parse_position(get_field(&row, col.end, "SV_end")?)
                .with_context(|| format!("Error while parsing SV_end on line {line} of {filename:?}"))?;
            let sv_type = SvType::from_caller_label(get_field(&row, col.sv_type, "SV_type")?);
            let default_id = line.to_string();
            let id = get_optional_field(&row, col.id).unwrap_or(&default_id);

            let mate = match get_optional_field(&row, col.alt) {
                Some(alt) => parse_breakend_alt(alt)
                    .with_context(|| format!("Error while parsing ALT on line {line} of {filename:?}"))?,
                None => None
            };

            let variant = match (sv_type, mate) {
                (SvType::Bnd, Some((mate_chrom, mate_pos))) => {
                    StructuralVariant::new_breakend_pair(&self.source, id, chrom, start, &mate_chrom, mate_pos, sv_type)
                },
                _ => StructuralVariant::new_interval(&self.source, id, chrom, start, end, sv_type)
            }.with_context(|| format!("Error while parsing line {line} of {filename:?}"))?;

            let alternate_type = get_optional_field(&row, col.info).and_then(info_alternate_type);
            let genes = get_optional_field(&row, col.genes)
                .map(split_genes)
                .unwrap_or_default();
            variants.push(variant.with_alternate_type(alternate_type).with_genes(genes));
        }

        debug!("Parsed {} AnnotSV full rows from {filename:?}, skipped {num_split} split rows", variants.len());
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_info_alternate_type() {
        assert_eq!(info_alternate_type("END=2000;SVTYPE=BND;SVTYPE2=DEL"), Some(SvType::Del));
        assert_eq!(info_alternate_type("SVTYPE=BND"), None);
        assert_eq!(info_alternate_type("SVTYPE2=UNK"), None);
        assert_eq!(info_alternate_type("."), None);
    }

    #[test]
    fn test_example_annotsv() {
        let parser = AnnotSvTsvParser::new("annotsv");
        let variants = parser.parse(&PathBuf::from("test_data/example_annotsv.tsv"), b'\t').unwrap();
        // the split row is dropped
        assert_eq!(variants.len(), 4);

        let del = &variants[0];
        assert_eq!(del.id(), "1_1010_1995_DEL_1");
        assert_eq!(del.chrom1(), "chr1");
        assert_eq!((del.pos1(), del.pos2()), (1010, 1995));
        assert_eq!(del.primary_type(), SvType::Del);
        assert_eq!(del.genes().len(), 2);

        let bnd = &variants[1];
        assert_eq!(bnd.primary_type(), SvType::Bnd);
        assert_eq!(bnd.chrom1(), "chr1");
        assert_eq!(bnd.chrom2(), "chr2");
        assert_eq!((bnd.pos1(), bnd.pos2()), (5100, 8050));
        assert_eq!(bnd.alternate_type(), None);

        // intra-chromosomal breakend with a DEL alternate classification
        let bnd_del = &variants[2];
        assert_eq!(bnd_del.primary_type(), SvType::Bnd);
        assert_eq!(bnd_del.alternate_type(), Some(SvType::Del));
        assert_eq!(bnd_del.chrom2(), "chr3");
        assert_eq!((bnd_del.pos1(), bnd_del.pos2()), (20000, 30000));
        assert_eq!(bnd_del.effective_type(false), SvType::Del);
        assert_eq!(bnd_del.effective_type(true), SvType::Bnd);

        let ins = &variants[3];
        assert_eq!(ins.primary_type(), SvType::Ins);
        assert!(ins.is_point());
        assert!(ins.genes().is_empty());
    }

    #[test]
    fn test_gzipped_annotsv() {
        let parser = AnnotSvTsvParser::new("annotsv");
        let plain = parser.parse(&PathBuf::from("test_data/example_annotsv.tsv"), b'\t').unwrap();
        let gzipped = parser.parse(&PathBuf::from("test_data/example_annotsv.tsv.gz"), b'\t').unwrap();
        assert_eq!(gzipped.len(), 4);
        assert_eq!(plain, gzipped);
    }
}
