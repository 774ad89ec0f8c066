
use rustc_hash::FxHashMap as HashMap;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;

/// A variant from an other-source sequence along with the details resolved for matching.
#[derive(Clone, Copy, Debug)]
pub struct IndexedVariant<'a> {
    /// Position of the record in the original source sequence, used for tie-breaking
    order: usize,
    /// The resolved effective type
    sv_type: SvType,
    /// The record itself
    variant: &'a StructuralVariant
}

impl<'a> IndexedVariant<'a> {
    // getters
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sv_type(&self) -> SvType {
        self.sv_type
    }

    pub fn variant(&self) -> &'a StructuralVariant {
        self.variant
    }
}

/// Bucket lookup key: (effective type, chrom1, chrom2)
type BucketKey = (SvType, String, String);

/// Index over one source's variants, bucketed by effective type and chromosome pair.
/// Each bucket is sorted by `pos1` so the candidates inside a distance window can be found by binary search.
#[derive(Debug, Default)]
pub struct ChromIndex<'a> {
    /// Bucket -> variants sorted by pos1, ties kept in source order
    buckets: HashMap<BucketKey, Vec<IndexedVariant<'a>>>
}

impl<'a> ChromIndex<'a> {
    /// Builds the index, resolving every effective type exactly once.
    /// # Arguments
    /// * `variants` - the variants of one source, in file order
    /// * `prefer_base_type` - passed through to effective-type resolution
    pub fn new(variants: &'a [StructuralVariant], prefer_base_type: bool) -> Self {
        let mut buckets: HashMap<BucketKey, Vec<IndexedVariant<'a>>> = Default::default();
        for (order, variant) in variants.iter().enumerate() {
            let sv_type = variant.effective_type(prefer_base_type);
            let key = (sv_type, variant.chrom1().to_string(), variant.chrom2().to_string());
            buckets.entry(key).or_default().push(IndexedVariant {
                order, sv_type, variant
            });
        }

        // stable sort, so equal positions stay in source order
        for bucket in buckets.values_mut() {
            bucket.sort_by_key(|iv| iv.variant.pos1());
        }

        Self {
            buckets
        }
    }

    /// Returns all variants of the given type on the chromosome pair with `first <= pos1 <= last`
    /// # Arguments
    /// * `sv_type` - the effective type to look up
    /// * `chrom1` - the primary chromosome
    /// * `chrom2` - the secondary chromosome
    /// * `first` - the first included pos1
    /// * `last` - the last included pos1
    pub fn candidates(&self, sv_type: SvType, chrom1: &str, chrom2: &str, first: u64, last: u64) -> &[IndexedVariant<'a>] {
        let key = (sv_type, chrom1.to_string(), chrom2.to_string());
        match self.buckets.get(&key) {
            Some(bucket) => {
                let start = bucket.partition_point(|iv| iv.variant.pos1() < first);
                let end = bucket.partition_point(|iv| iv.variant.pos1() <= last);
                &bucket[start..end.max(start)]
            },
            None => &[]
        }
    }

    /// Number of distinct (type, chrom1, chrom2) buckets
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }
}
