
use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::data_types::structural_variant::StructuralVariant;
use crate::data_types::sv_type::SvType;

/// A variant from an "other" source that was selected as the match for a base variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvMatch<'a> {
    /// The matched record
    variant: &'a StructuralVariant,
    /// The effective type the record was matched on
    sv_type: SvType,
}

impl<'a> SvMatch<'a> {
    /// Constructor
    pub fn new(variant: &'a StructuralVariant, sv_type: SvType) -> Self {
        Self {
            variant,
            sv_type
        }
    }

    // getters
    pub fn variant(&self) -> &'a StructuralVariant {
        self.variant
    }

    pub fn sv_type(&self) -> SvType {
        self.sv_type
    }
}

/// The correlation result for a single base variant across all other sources.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSet<'a> {
    /// The base (optical mapping) variant
    base: &'a StructuralVariant,
    /// The effective type of the base variant
    base_type: SvType,
    /// Source tag -> matched variant; None is an explicit "no match", order follows the input sources
    matches: IndexMap<String, Option<SvMatch<'a>>>,
    /// Genes of the base variant that also appear in at least one matched variant
    common_genes: BTreeSet<String>
}

impl<'a> MatchSet<'a> {
    /// Creates an empty match set; every source must be registered via `add_match` before finalizing.
    pub fn new(base: &'a StructuralVariant, base_type: SvType) -> Self {
        Self {
            base,
            base_type,
            matches: Default::default(),
            common_genes: Default::default()
        }
    }

    /// Records the outcome for one source
    /// # Arguments
    /// * `source` - the other-source tag
    /// * `sv_match` - the selected variant, or None if nothing qualified
    pub fn add_match(&mut self, source: &str, sv_match: Option<SvMatch<'a>>) {
        self.matches.insert(source.to_string(), sv_match);
    }

    /// Computes the gene intersection: base genes intersected with the union of all matched gene sets.
    /// Empty when nothing matched.
    pub fn finalize_genes(&mut self) {
        let matched_genes: BTreeSet<&String> = self.matches.values()
            .flatten()
            .flat_map(|m| m.variant().genes().iter())
            .collect();
        self.common_genes = self.base.genes().iter()
            .filter(|g| matched_genes.contains(g))
            .cloned()
            .collect();
    }

    /// Returns true if at least one source produced a match
    pub fn has_any_match(&self) -> bool {
        self.matches.values().any(|m| m.is_some())
    }

    /// Returns the match for a specific source tag, None for unknown tags or no match
    pub fn get_match(&self, source: &str) -> Option<&SvMatch<'a>> {
        self.matches.get(source).and_then(|m| m.as_ref())
    }

    /// Signed breakpoint deltas (match - base) for a source, None if there is no match
    pub fn deltas(&self, source: &str) -> Option<(i64, i64)> {
        self.get_match(source).map(|m| {
            let v = m.variant();
            (
                v.pos1() as i64 - self.base.pos1() as i64,
                v.pos2() as i64 - self.base.pos2() as i64
            )
        })
    }

    // getters
    pub fn base(&self) -> &'a StructuralVariant {
        self.base
    }

    pub fn base_type(&self) -> SvType {
        self.base_type
    }

    pub fn matches(&self) -> &IndexMap<String, Option<SvMatch<'a>>> {
        &self.matches
    }

    pub fn common_genes(&self) -> &BTreeSet<String> {
        &self.common_genes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genes(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gene_intersection() {
        let base = StructuralVariant::new_interval("om", "b", "chr1", 100, 200, SvType::Del).unwrap()
            .with_genes(genes(&["BRCA1", "TP53", "EGFR"]));
        let other_a = StructuralVariant::new_interval("a", "a1", "chr1", 101, 199, SvType::Del).unwrap()
            .with_genes(genes(&["TP53", "KRAS"]));
        let other_b = StructuralVariant::new_interval("b", "b1", "chr1", 102, 198, SvType::Del).unwrap()
            .with_genes(genes(&["EGFR"]));

        let mut match_set = MatchSet::new(&base, SvType::Del);
        match_set.add_match("a", Some(SvMatch::new(&other_a, SvType::Del)));
        match_set.add_match("b", Some(SvMatch::new(&other_b, SvType::Del)));
        match_set.add_match("c", None);
        match_set.finalize_genes();

        assert!(match_set.has_any_match());
        assert_eq!(match_set.common_genes(), &genes(&["EGFR", "TP53"]));
        assert_eq!(match_set.deltas("a"), Some((1, -1)));
        assert_eq!(match_set.deltas("b"), Some((2, -2)));
        assert_eq!(match_set.deltas("c"), None);
        assert_eq!(match_set.matches().keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_match_genes() {
        let base = StructuralVariant::new_interval("om", "b", "chr1", 100, 200, SvType::Del).unwrap()
            .with_genes(genes(&["BRCA1"]));
        let mut match_set = MatchSet::new(&base, SvType::Del);
        match_set.add_match("a", None);
        match_set.finalize_genes();
        assert!(!match_set.has_any_match());
        assert!(match_set.common_genes().is_empty());
    }
}
