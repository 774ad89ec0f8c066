
use anyhow::{anyhow, Context};
use log::debug;
use noodles::vcf;
use noodles::vcf::variant::record_buf::info::field::{value::Array, Value};
use std::collections::BTreeSet;
use std::io::BufReader;
use std::path::Path;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;
use crate::parsing::tabular::open_text_reader;
use crate::parsing::{parse_breakend_alt, split_genes, SvResultParser};

/// Decoder for structural variant VCF files, such as those from Long Ranger or Sniffles.
/// Breakpoint 1 is `CHROM:POS`; the second breakpoint is resolved from `CHR2`, `END`, the breakend ALT, or `SVLEN`.
pub struct GenericSvVcfParser {
    source: String
}

impl GenericSvVcfParser {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string()
        }
    }

    /// Converts a single record into our canonical form
    fn convert_record(&self, record: &vcf::variant::RecordBuf) -> anyhow::Result<StructuralVariant> {
        let chrom1 = record.reference_sequence_name();
        let pos1 = record.variant_start()
            .ok_or(anyhow!("Missing POS"))?
            .get() as u64;
        let id = record.ids().as_ref().iter().next()
            .cloned()
            .unwrap_or_else(|| format!("{chrom1}:{pos1}"));

        let alt = record.alternate_bases().as_ref().first().map(|a| a.as_str());
        let mate = match alt {
            Some(a) => parse_breakend_alt(a)?,
            None => None
        };

        let primary_type = match info_string(record, "SVTYPE") {
            Some(label) => SvType::from_caller_label(&label),
            None => match (&mate, alt) {
                (Some(_), _) => SvType::Bnd,
                (None, Some(a)) => SvType::from_caller_label(a),
                (None, None) => SvType::Unk
            }
        };
        let alternate_type = info_string(record, "SVTYPE2")
            .map(|label| SvType::from_caller_label(&label))
            .filter(|sv_type| *sv_type != SvType::Unk);

        let chrom2 = info_string(record, "CHR2")
            .or_else(|| mate.as_ref().map(|(contig, _pos)| contig.clone()))
            .unwrap_or_else(|| chrom1.to_string());
        let end = info_integer(record, "END")
            .map(|e| u64::try_from(e).map_err(|_e| anyhow!("Negative END: {e}")))
            .transpose()?;
        // SVLEN of an insertion is the inserted sequence, not a reference span
        let svlen_end = match primary_type {
            SvType::Ins => None,
            _ => info_integer(record, "SVLEN").map(|l| pos1.saturating_add(l.unsigned_abs()))
        };
        let pos2 = end
            .or_else(|| mate.as_ref().map(|(_contig, pos)| *pos))
            .or(svlen_end)
            .unwrap_or(pos1);

        let genes = info_string(record, "GENES")
            .map(|g| split_genes(&g))
            .unwrap_or_default();

        let variant = StructuralVariant::new_breakend_pair(&self.source, &id, chrom1, pos1, &chrom2, pos2, primary_type)?
            .with_alternate_type(alternate_type)
            .with_genes(genes);
        Ok(variant)
    }
}

/// Returns an INFO field as a string, joining multi-valued entries with ';'
fn info_string(record: &vcf::variant::RecordBuf, key: &str) -> Option<String> {
    let value = match record.info().get(key) {
        Some(Some(Value::String(s))) => Some(s.clone()),
        Some(Some(Value::Character(c))) => Some(c.to_string()),
        Some(Some(Value::Integer(i))) => Some(i.to_string()),
        Some(Some(Value::Array(Array::String(values)))) => {
            let joined: BTreeSet<&str> = values.iter()
                .flatten()
                .map(|v| v.as_str())
                .collect();
            Some(joined.into_iter().collect::<Vec<_>>().join(";"))
        },
        _ => None
    };
    value.filter(|s| !s.is_empty())
}

/// Returns an INFO field as an integer, accepting single-valued arrays and numeric strings
fn info_integer(record: &vcf::variant::RecordBuf, key: &str) -> Option<i64> {
    match record.info().get(key) {
        Some(Some(Value::Integer(i))) => Some(*i as i64),
        Some(Some(Value::Array(Array::Integer(values)))) => values.iter().flatten().next().map(|i| *i as i64),
        Some(Some(Value::String(s))) => s.trim().parse().ok(),
        _ => None
    }
}

impl SvResultParser for GenericSvVcfParser {
    fn source(&self) -> &str {
        &self.source
    }

    fn parse(&self, filename: &Path, _delimiter: u8) -> anyhow::Result<Vec<StructuralVariant>> {
        // plain gzip and bgzip are both read through the multi-member decoder
        let text_reader = open_text_reader(filename)?;
        let mut vcf_reader = vcf::io::Reader::new(BufReader::new(text_reader));
        let vcf_header = vcf_reader.read_header()
            .with_context(|| format!("Error while reading header of {filename:?}:"))?;

        let mut variants = vec![];
        for (record_index, result) in vcf_reader.record_bufs(&vcf_header).enumerate() {
            let record = result
                .with_context(|| format!("Error while reading record #{} of {filename:?}:", record_index + 1))?;
            let variant = self.convert_record(&record)
                .with_context(|| format!("Error while parsing record #{} of {filename:?}: {record:?}", record_index + 1))?;
            variants.push(variant);
        }

        debug!("Parsed {} VCF records from {filename:?}", variants.len());
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_example_vcf() {
        let parser = GenericSvVcfParser::new("vcf-sniffles");
        let variants = parser.parse(&PathBuf::from("test_data/example.vcf"), b'\t').unwrap();
        assert_eq!(variants.len(), 6);

        // END gives the second breakpoint
        let del = &variants[0];
        assert_eq!(del.source(), "vcf-sniffles");
        assert_eq!(del.id(), "sv1");
        assert_eq!(del.chrom1(), "chr1");
        assert_eq!((del.pos1(), del.pos2()), (1005, 2003));
        assert_eq!(del.primary_type(), SvType::Del);
        assert!(del.genes().contains("GENE1"));

        // mate from the breakend ALT
        let bnd = &variants[1];
        assert_eq!(bnd.primary_type(), SvType::Bnd);
        assert_eq!(bnd.chrom2(), "chr2");
        assert_eq!(bnd.pos2(), 8010);

        // CHR2 and END together
        let tra = &variants[2];
        assert_eq!(tra.primary_type(), SvType::Bnd);
        assert_eq!(tra.alternate_type(), Some(SvType::Inv));
        assert_eq!(tra.chrom2(), "chrX");
        assert_eq!((tra.pos1(), tra.pos2()), (40100, 49900));
        assert_eq!(tra.effective_type(false), SvType::Inv);

        // SVLEN fallback
        let dup = &variants[3];
        assert_eq!(dup.primary_type(), SvType::Dup);
        assert_eq!((dup.pos1(), dup.pos2()), (70010, 75010));

        // missing ID and SVTYPE from the symbolic ALT
        let ins = &variants[4];
        assert_eq!(ins.id(), "chr2:3002");
        assert_eq!(ins.primary_type(), SvType::Ins);
        assert!(ins.is_point());

        // an insertion SVLEN is not a reference span
        let long_ins = &variants[5];
        assert_eq!(long_ins.id(), "sv6");
        assert_eq!(long_ins.primary_type(), SvType::Ins);
        assert_eq!((long_ins.pos1(), long_ins.pos2()), (9000, 9000));
        assert!(long_ins.is_point());
    }

    #[test]
    fn test_gzipped_vcf() {
        let parser = GenericSvVcfParser::new("vcf-longranger");
        let plain = parser.parse(&PathBuf::from("test_data/example.vcf"), b'\t').unwrap();
        let gzipped = parser.parse(&PathBuf::from("test_data/example.vcf.gz"), b'\t').unwrap();
        assert_eq!(plain, gzipped);
    }
}
