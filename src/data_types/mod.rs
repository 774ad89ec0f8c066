
/// Bucketed lookup of candidate variants by type and chromosome pair
pub mod chrom_index;
/// The correlation result for one base variant
pub mod match_set;
/// Per-source statistics
pub mod source_summary;
/// The canonical structural variant record
pub mod structural_variant;
/// A decoded collection of variants from one caller
pub mod sv_source;
/// The closed set of SV types
pub mod sv_type;
