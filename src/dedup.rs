/*!
# Deduplication
Removes repeated records from a single source before comparison.
Two records are duplicates when they share source, effective type, and both breakpoints; genes and IDs are ignored.
The first record seen is kept and relative order is preserved, so applying this twice is the same as applying it once.
*/
use log::debug;
use rustc_hash::FxHashSet as HashSet;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;

/// (source, effective type, chrom1, pos1, chrom2, pos2)
type DuplicateKey<'a> = (&'a str, SvType, &'a str, u64, &'a str, u64);

/// Returns true for each record that is the first of its duplicate group
fn first_occurrences(variants: &[StructuralVariant], prefer_base_type: bool) -> Vec<bool> {
    let mut observed: HashSet<DuplicateKey> = Default::default();
    variants.iter()
        .map(|v| {
            let key = (
                v.source(), v.effective_type(prefer_base_type),
                v.chrom1(), v.pos1(),
                v.chrom2(), v.pos2()
            );
            observed.insert(key)
        })
        .collect()
}

/// Stable deduplication of a single source's records.
/// # Arguments
/// * `variants` - the decoded variants, in file order
/// * `prefer_base_type` - passed through to effective-type resolution, which is part of the identity
pub fn dedup_variants(variants: Vec<StructuralVariant>, prefer_base_type: bool) -> Vec<StructuralVariant> {
    let keep = first_occurrences(&variants, prefer_base_type);
    let original_len = variants.len();
    let ret: Vec<StructuralVariant> = variants.into_iter()
        .zip(keep)
        .filter_map(|(v, k)| if k { Some(v) } else { None })
        .collect();

    let removed = original_len - ret.len();
    if removed > 0 {
        debug!("Removed {removed} duplicate variants out of {original_len}.");
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn del(id: &str, start: u64, end: u64) -> StructuralVariant {
        StructuralVariant::new_interval("annotsv", id, "chr1", start, end, SvType::Del).unwrap()
    }

    #[test]
    fn test_dedup_stable() {
        let genes: BTreeSet<String> = ["BRCA1".to_string()].into_iter().collect();
        let variants = vec![
            del("a", 10, 20),
            del("b", 30, 40),
            // same identity, different id and genes
            del("c", 10, 20).with_genes(genes),
            // reversed input coordinates are normalised, so this is a duplicate as well
            del("d", 40, 30),
            del("e", 10, 21),
        ];
        let deduped = dedup_variants(variants, false);
        let ids: Vec<&str> = deduped.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["a", "b", "e"]);
    }

    #[test]
    fn test_dedup_idempotent() {
        let variants = vec![
            del("a", 10, 20),
            del("b", 10, 20),
            del("c", 50, 60),
            del("d", 50, 60),
            del("e", 70, 80),
        ];
        let once = dedup_variants(variants, false);
        let twice = dedup_variants(once.clone(), false);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_dedup_effective_type() {
        // same breakpoints, but the alternate type differs
        let bnd_inv = StructuralVariant::new_breakend_pair("10x", "a", "chr1", 5000, "chr2", 8000, SvType::Bnd).unwrap()
            .with_alternate_type(Some(SvType::Inv));
        let bnd_dup = StructuralVariant::new_breakend_pair("10x", "b", "chr1", 5000, "chr2", 8000, SvType::Bnd).unwrap()
            .with_alternate_type(Some(SvType::Dup));
        let variants = vec![bnd_inv, bnd_dup];

        // resolved to INV and DUP, so they are distinct
        assert_eq!(dedup_variants(variants.clone(), false).len(), 2);
        // both are BND when preferring the base type
        assert_eq!(dedup_variants(variants, true).len(), 1);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_variants(vec![], false).is_empty());
    }
}
