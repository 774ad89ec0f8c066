/*!
# SV Comparator
Contains the logic for correlating structural variants from one base source (optical mapping) with any number of other sources.
Each base variant is compared against every other source independently, and at most one variant is selected per source.
The `CompareConfig` struct controls the positional tolerance, overlap proportion, type, and gene filters.

## Example usage
```rust
use om_hts_svc::data_types::structural_variant::StructuralVariant;
use om_hts_svc::data_types::sv_source::SvSource;
use om_hts_svc::data_types::sv_type::SvType;
use om_hts_svc::sv_comparator::{compare_structural_variants, CompareConfigBuilder};

let base = SvSource::new("bionano".to_string(), vec![
    StructuralVariant::new_interval("bionano", "1", "chr1", 1000, 2000, SvType::Del).unwrap()
]);
let others = vec![SvSource::new("annotsv".to_string(), vec![
    StructuralVariant::new_interval("annotsv", "a", "chr1", 1010, 1995, SvType::Del).unwrap()
])];

// the breakpoints are off by 10 and 5 bp, and the overlap is 985 / 1000
let config = CompareConfigBuilder::default()
    .distance_variance(Some(20))
    .minimal_proportion(Some(0.9))
    .build().unwrap();
let match_sets = compare_structural_variants(&base, &others, &config);
assert_eq!(match_sets.len(), 1);
assert_eq!(match_sets[0].get_match("annotsv").unwrap().variant().id(), "a");

// with a stricter proportion, the same pair is rejected
let config = CompareConfigBuilder::default()
    .distance_variance(Some(20))
    .minimal_proportion(Some(0.99))
    .build().unwrap();
let match_sets = compare_structural_variants(&base, &others, &config);
assert!(match_sets[0].get_match("annotsv").is_none());
```
*/
use derive_builder::Builder;
use indicatif::ParallelProgressIterator;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeSet;

use crate::data_types::chrom_index::{ChromIndex, IndexedVariant};
use crate::data_types::match_set::{MatchSet, SvMatch};
use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_source::SvSource;
use crate::data_types::sv_type::SvType;
use crate::util::progress_bar::get_progress_style;

/// Controls what counts as a match; every filter is optional and None means "not set"
#[derive(Builder, Clone, Debug, Default)]
#[builder(default)]
pub struct CompareConfig {
    /// If Some(d), each breakpoint may differ by at most d bp; if None, breakpoints must be identical
    distance_variance: Option<u64>,
    /// If Some(p), interval events must overlap by at least this fraction of the longer event
    minimal_proportion: Option<f64>,
    /// If Some(types), only base variants of these effective types are compared
    variant_types: Option<BTreeSet<SvType>>,
    /// if true, a match also requires at least one shared gene
    only_common_genes: bool,
    /// if true, breakends keep their primary type instead of resolving to the alternate type
    prefer_base_type: bool,
    /// if true, displays a progress bar while comparing
    enable_progress: bool
}

impl CompareConfig {
    // mostly getters
    pub fn distance_variance(&self) -> Option<u64> {
        self.distance_variance
    }

    pub fn minimal_proportion(&self) -> Option<f64> {
        self.minimal_proportion
    }

    pub fn variant_types(&self) -> Option<&BTreeSet<SvType>> {
        self.variant_types.as_ref()
    }

    pub fn only_common_genes(&self) -> bool {
        self.only_common_genes
    }

    pub fn prefer_base_type(&self) -> bool {
        self.prefer_base_type
    }

    /// Returns true if the type passes the type filter (always true when unset)
    pub fn is_type_allowed(&self, sv_type: SvType) -> bool {
        match self.variant_types.as_ref() {
            Some(types) => types.contains(&sv_type),
            None => true
        }
    }
}

/// Entry point for comparing a base source against all other sources.
/// Returns exactly one `MatchSet` per base variant, in base order, even if nothing matched.
/// # Arguments
/// * `base` - the base (optical mapping) source
/// * `others` - the sources to search for matches, report order follows this order
/// * `config` - the matching filters
pub fn compare_structural_variants<'a>(base: &'a SvSource, others: &'a [SvSource], config: &CompareConfig) -> Vec<MatchSet<'a>> {
    // pre-index every other source by type and chromosome pair
    let indices: Vec<(&str, ChromIndex<'a>)> = others.iter()
        .map(|other| {
            let index = ChromIndex::new(other.variants(), config.prefer_base_type);
            debug!("Indexed {} variants from {:?} into {} buckets.", other.len(), other.tag(), index.num_buckets());
            (other.tag(), index)
        })
        .collect();

    let match_iter = base.variants().par_iter()
        .map(|b| match_base_variant(b, &indices, config));
    let match_sets: Vec<MatchSet<'a>> = if config.enable_progress {
        match_iter.progress_with_style(get_progress_style()).collect()
    } else {
        match_iter.collect()
    };

    for (tag, _index) in indices.iter() {
        let num_matched = match_sets.iter()
            .filter(|ms| ms.get_match(tag).is_some())
            .count();
        info!("Matched {num_matched} / {} {:?} variants with {tag:?}.", base.len(), base.tag());
    }

    match_sets
}

/// Builds the full match set for a single base variant
fn match_base_variant<'a>(base: &'a StructuralVariant, indices: &[(&str, ChromIndex<'a>)], config: &CompareConfig) -> MatchSet<'a> {
    let base_type = base.effective_type(config.prefer_base_type);
    let type_allowed = config.is_type_allowed(base_type);

    let mut match_set = MatchSet::new(base, base_type);
    for (tag, index) in indices.iter() {
        let best = if type_allowed {
            find_best_candidate(base, base_type, index, config)
        } else {
            None
        };
        match_set.add_match(tag, best);
    }
    match_set.finalize_genes();
    match_set
}

/// Searches one source for the passing candidate closest to the base variant.
/// Ties in combined breakpoint delta go to the candidate listed first in the source.
fn find_best_candidate<'a>(
    base: &StructuralVariant, base_type: SvType, index: &ChromIndex<'a>, config: &CompareConfig
) -> Option<SvMatch<'a>> {
    // the distance test bounds pos1, so only that window needs to be scanned
    let tolerance = config.distance_variance.unwrap_or(0);
    let first = base.pos1().saturating_sub(tolerance);
    let last = base.pos1().saturating_add(tolerance);

    let mut best: Option<(u64, usize, &IndexedVariant<'a>)> = None;
    for candidate in index.candidates(base_type, base.chrom1(), base.chrom2(), first, last).iter() {
        if !is_match(base, base_type, candidate.variant(), candidate.sv_type(), config) {
            continue;
        }

        let delta = combined_delta(base, candidate.variant());
        let is_better = match best {
            Some((best_delta, best_order, _)) => (delta, candidate.order()) < (best_delta, best_order),
            None => true
        };
        if is_better {
            best = Some((delta, candidate.order(), candidate));
        }
    }

    best.map(|(_delta, _order, iv)| SvMatch::new(iv.variant(), iv.sv_type()))
}

/// Checks a single base/candidate pair against every active test, short-circuiting on the first failure.
/// # Arguments
/// * `base` - the base variant
/// * `base_type` - the effective type of the base variant
/// * `candidate` - the variant from the other source
/// * `candidate_type` - the effective type of the candidate
/// * `config` - the matching filters
pub fn is_match(
    base: &StructuralVariant, base_type: SvType,
    candidate: &StructuralVariant, candidate_type: SvType,
    config: &CompareConfig
) -> bool {
    if base_type != candidate_type {
        return false;
    }

    if !same_chromosomes(base, candidate) {
        return false;
    }

    if !within_distance(base, candidate, config.distance_variance) {
        return false;
    }

    // breakends and point events rely on the distance test alone
    if let Some(minimal_proportion) = config.minimal_proportion {
        if !base_type.is_breakend() {
            if let Some(proportion) = overlap_proportion(base, candidate) {
                if proportion < minimal_proportion {
                    return false;
                }
            }
        }
    }

    if config.only_common_genes && !shares_genes(base, candidate) {
        return false;
    }

    true
}

/// Both breakpoints must sit on the same chromosomes, in the same order
pub fn same_chromosomes(v1: &StructuralVariant, v2: &StructuralVariant) -> bool {
    v1.chrom1() == v2.chrom1() && v1.chrom2() == v2.chrom2()
}

/// Checks both breakpoints against the tolerance; None requires exact equality
/// # Arguments
/// * `v1` - the first variant
/// * `v2` - the second variant
/// * `distance_variance` - the maximum allowed difference per breakpoint
pub fn within_distance(v1: &StructuralVariant, v2: &StructuralVariant, distance_variance: Option<u64>) -> bool {
    match distance_variance {
        Some(tolerance) => {
            v1.pos1().abs_diff(v2.pos1()) <= tolerance &&
                v1.pos2().abs_diff(v2.pos2()) <= tolerance
        },
        None => v1.pos1() == v2.pos1() && v1.pos2() == v2.pos2()
    }
}

/// Overlap of two intervals divided by the length of the longer one.
/// Returns None when the proportion is not defined: either event is cross-chromosomal or a point event.
pub fn overlap_proportion(v1: &StructuralVariant, v2: &StructuralVariant) -> Option<f64> {
    let l1 = v1.length()?;
    let l2 = v2.length()?;
    if l1 == 0 || l2 == 0 {
        return None;
    }

    let overlap = v1.pos2().min(v2.pos2())
        .saturating_sub(v1.pos1().max(v2.pos1()));
    Some(overlap as f64 / l1.max(l2) as f64)
}

/// Returns true if the two gene sets intersect
pub fn shares_genes(v1: &StructuralVariant, v2: &StructuralVariant) -> bool {
    v1.genes().iter().any(|g| v2.genes().contains(g))
}

/// Sum of the absolute breakpoint differences
fn combined_delta(v1: &StructuralVariant, v2: &StructuralVariant) -> u64 {
    v1.pos1().abs_diff(v2.pos1())
        .saturating_add(v1.pos2().abs_diff(v2.pos2()))
}
