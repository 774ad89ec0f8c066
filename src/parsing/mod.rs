/*!
# Parsing module
Contains the source decoders, one per caller output format.
Every decoder implements [`SvResultParser`] and produces canonical [`StructuralVariant`] records; nothing in here knows about matching.
*/
/// Decoder for AnnotSV tab-separated output
pub mod annotsv_tsv;
/// Decoder for the Bionano Solve smap format
pub mod bionano_smap;
/// Decoder for generic SV VCF files (e.g., Long Ranger, Sniffles)
pub mod generic_vcf;
/// Decoder for the Samplot variant table
pub mod samplot_csv;
/// Shared helpers for delimited text inputs
pub mod tabular;

use anyhow::Context;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use strum_macros::{Display, EnumIter};

use crate::data_types::structural_variant::{StructuralVariant, SvError};
use crate::data_types::sv_source::SvSource;
use crate::dedup::dedup_variants;
use crate::parsing::annotsv_tsv::AnnotSvTsvParser;
use crate::parsing::bionano_smap::BionanoSmapParser;
use crate::parsing::generic_vcf::GenericSvVcfParser;
use crate::parsing::samplot_csv::SamplotCsvParser;

/// The supported input formats; the display form is the source tag used in the report columns
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum SourceFormat {
    #[strum(serialize = "bionano")]
    Bionano,
    #[strum(serialize = "annotsv")]
    AnnotSv,
    #[strum(serialize = "samplot")]
    Samplot,
    #[strum(serialize = "vcf-longranger")]
    VcfLongRanger,
    #[strum(serialize = "vcf-sniffles")]
    VcfSniffles
}

impl SourceFormat {
    /// Creates the decoder for this format, tagged with the format name
    pub fn build_parser(&self) -> Box<dyn SvResultParser> {
        let tag = self.to_string();
        match self {
            SourceFormat::Bionano => Box::new(BionanoSmapParser::new(&tag)),
            SourceFormat::AnnotSv => Box::new(AnnotSvTsvParser::new(&tag)),
            SourceFormat::Samplot => Box::new(SamplotCsvParser::new(&tag)),
            SourceFormat::VcfLongRanger | SourceFormat::VcfSniffles => Box::new(GenericSvVcfParser::new(&tag))
        }
    }

    /// The column delimiter passed to the decoder
    pub fn delimiter(&self) -> u8 {
        b'\t'
    }
}

/// Capability shared by all source decoders
pub trait SvResultParser {
    /// The tag assigned to every variant this parser produces
    fn source(&self) -> &str;

    /// Decodes a full result file into canonical variants, in file order.
    /// # Arguments
    /// * `filename` - the result file, optionally gzip compressed
    /// * `delimiter` - the column delimiter, ignored by formats with a fixed delimiter
    /// # Errors
    /// * if the file cannot be read or any record is malformed
    fn parse(&self, filename: &Path, delimiter: u8) -> anyhow::Result<Vec<StructuralVariant>>;
}

/// Parses a source file and optionally removes duplicate records.
/// # Arguments
/// * `parser` - the decoder for the file format
/// * `filename` - the result file
/// * `delimiter` - passed through to the decoder
/// * `remove_duplicates` - if true, applies the stable deduplication
/// * `prefer_base_type` - passed through to effective-type resolution during deduplication
pub fn load_source(
    parser: &dyn SvResultParser, filename: &Path, delimiter: u8, remove_duplicates: bool, prefer_base_type: bool
) -> anyhow::Result<SvSource> {
    let variants = parser.parse(filename, delimiter)
        .with_context(|| format!("Error while parsing {:?} input {filename:?}:", parser.source()))?;
    let num_parsed = variants.len();

    let variants = if remove_duplicates {
        dedup_variants(variants, prefer_base_type)
    } else {
        variants
    };
    info!("Loaded {} variants from {:?} ({num_parsed} parsed).", variants.len(), parser.source());
    Ok(SvSource::new(parser.source().to_string(), variants))
}

/// Parses the mate location out of a VCF breakend ALT allele, e.g. `N[chr2:8000[` or `]chr2:8000]N`.
/// Returns None for ALT alleles that are not in breakend notation (e.g., `<DEL>`).
/// # Errors
/// * if the ALT contains brackets but the mate is not `contig:pos`
pub fn parse_breakend_alt(alt: &str) -> Result<Option<(String, u64)>, SvError> {
    let first_bracket = match alt.find(['[', ']']) {
        Some(index) => index,
        None => return Ok(None)
    };
    let bracket = alt[first_bracket..].chars().next().unwrap_or('[');
    let malformed = || SvError::MalformedBreakend { alt: alt.to_string() };

    let remainder = &alt[first_bracket + 1..];
    let closing = remainder.find(bracket).ok_or_else(malformed)?;
    let mate = &remainder[..closing];
    let (contig, pos) = mate.rsplit_once(':').ok_or_else(malformed)?;
    if contig.is_empty() {
        return Err(malformed());
    }
    let pos: u64 = pos.parse().map_err(|_e| malformed())?;
    Ok(Some((contig.to_string(), pos)))
}

/// Splits a gene list cell into symbols; empty and placeholder values ("." and "-") are dropped.
pub fn split_genes(raw: &str) -> BTreeSet<String> {
    raw.split([';', ',', '|', '/'])
        .map(|g| g.trim())
        .filter(|g| !g.is_empty() && *g != "." && *g != "-")
        .map(|g| g.to_string())
        .collect()
}
