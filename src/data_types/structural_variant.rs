
use std::collections::BTreeSet;

use crate::data_types::sv_type::SvType;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SvError {
    #[error("chromosome name must not be empty")]
    EmptyChromosome,
    #[error("{label:?} is not a known SV type, expected one of BND, CNV, DEL, INS, DUP, INV, UNK")]
    UnknownType { label: String },
    #[error("breakpoint position must be a non-negative number: {raw:?}")]
    InvalidPosition { raw: String },
    #[error("malformed breakend ALT allele: {alt:?}")]
    MalformedBreakend { alt: String }
}

/// Canonical structural variant record that every source decoder produces.
/// Records are immutable once built; breakpoints on one chromosome are always stored in ascending order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StructuralVariant {
    /// Tag of the caller/platform that produced this record
    source: String,
    /// Source-local identifier, diagnostics only
    id: String,
    /// Primary breakpoint chromosome
    chrom1: String,
    /// Primary breakpoint position
    pos1: u64,
    /// Secondary breakpoint chromosome, equal to `chrom1` for intra-chromosomal events
    chrom2: String,
    /// Secondary breakpoint position
    pos2: u64,
    /// The classification reported by the caller
    primary_type: SvType,
    /// Optional alternate classification, some callers report this for breakends (e.g. SVTYPE2)
    alternate_type: Option<SvType>,
    /// Gene symbols overlapping the event
    genes: BTreeSet<String>
}

impl StructuralVariant {
    /// Creates a new single-chromosome variant spanning `start` to `end`.
    /// The coordinates are swapped if provided in descending order; `start == end` describes a point event.
    /// # Arguments
    /// * `source` - tag of the originating caller
    /// * `id` - the source-local identifier
    /// * `chrom` - the chromosome, normalised through [`normalize_chrom`]
    /// * `start` - first breakpoint
    /// * `end` - second breakpoint
    /// * `primary_type` - the reported SV type
    /// # Errors
    /// * if the chromosome is empty
    pub fn new_interval(
        source: &str, id: &str, chrom: &str, start: u64, end: u64, primary_type: SvType
    ) -> Result<Self, SvError> {
        Self::new_breakend_pair(source, id, chrom, start, chrom, end, primary_type)
    }

    /// Creates a new variant from two breakpoints that may sit on different chromosomes.
    /// Cross-chromosome pairs are kept in the order the caller reported them.
    /// # Arguments
    /// * `source` - tag of the originating caller
    /// * `id` - the source-local identifier
    /// * `chrom1` - the primary chromosome
    /// * `pos1` - the primary breakpoint
    /// * `chrom2` - the secondary (mate) chromosome
    /// * `pos2` - the secondary (mate) breakpoint
    /// * `primary_type` - the reported SV type
    /// # Errors
    /// * if either chromosome is empty
    pub fn new_breakend_pair(
        source: &str, id: &str,
        chrom1: &str, pos1: u64,
        chrom2: &str, pos2: u64,
        primary_type: SvType
    ) -> Result<Self, SvError> {
        let chrom1 = normalize_chrom(chrom1);
        let chrom2 = normalize_chrom(chrom2);
        if chrom1.is_empty() || chrom2.is_empty() {
            return Err(SvError::EmptyChromosome);
        }

        let (pos1, pos2) = if chrom1 == chrom2 && pos2 < pos1 {
            (pos2, pos1)
        } else {
            (pos1, pos2)
        };

        Ok(Self {
            source: source.to_string(),
            id: id.to_string(),
            chrom1,
            pos1,
            chrom2,
            pos2,
            primary_type,
            alternate_type: None,
            genes: Default::default()
        })
    }

    /// Attaches the alternate classification
    pub fn with_alternate_type(mut self, alternate_type: Option<SvType>) -> Self {
        self.alternate_type = alternate_type;
        self
    }

    /// Attaches the overlapping gene symbols
    pub fn with_genes(mut self, genes: BTreeSet<String>) -> Self {
        self.genes = genes;
        self
    }

    /// The type used for matching.
    /// Breakends reported with an alternate classification resolve to that alternate unless `prefer_base_type` is set.
    /// # Arguments
    /// * `prefer_base_type` - if true, always use the primary type
    pub fn effective_type(&self, prefer_base_type: bool) -> SvType {
        match (self.primary_type, self.alternate_type) {
            (SvType::Bnd, Some(alternate)) if !prefer_base_type => alternate,
            (primary, _) => primary
        }
    }

    /// Returns true if both breakpoints share a chromosome
    pub fn is_intra_chromosomal(&self) -> bool {
        self.chrom1 == self.chrom2
    }

    /// Span of the event, None across chromosomes
    pub fn length(&self) -> Option<u64> {
        if self.is_intra_chromosomal() {
            Some(self.pos2 - self.pos1)
        } else {
            None
        }
    }

    /// Returns true for zero-length events, such as most insertion calls
    pub fn is_point(&self) -> bool {
        self.length() == Some(0)
    }

    // getters
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chrom1(&self) -> &str {
        &self.chrom1
    }

    pub fn pos1(&self) -> u64 {
        self.pos1
    }

    pub fn chrom2(&self) -> &str {
        &self.chrom2
    }

    pub fn pos2(&self) -> u64 {
        self.pos2
    }

    pub fn primary_type(&self) -> SvType {
        self.primary_type
    }

    pub fn alternate_type(&self) -> Option<SvType> {
        self.alternate_type
    }

    pub fn genes(&self) -> &BTreeSet<String> {
        &self.genes
    }
}

/// Brings chromosome names from different callers into one naming scheme, `chr<NAME>`.
/// The prefix is matched case-insensitively, "MT" becomes "M", and an empty name stays empty.
/// # Arguments
/// * `raw` - the chromosome as written by the caller, e.g. "1", "chr1", "CHRX", "MT"
pub fn normalize_chrom(raw: &str) -> String {
    let trimmed = raw.trim();
    let core = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &trimmed[3..],
        _ => trimmed
    };

    if core.is_empty() {
        return String::new();
    }

    let core = match core.to_ascii_uppercase().as_str() {
        "X" => "X".to_string(),
        "Y" => "Y".to_string(),
        "M" | "MT" => "M".to_string(),
        _ => core.to_string()
    };
    format!("chr{core}")
}
