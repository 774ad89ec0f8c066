
use log::info;
use std::collections::BTreeMap;

use crate::data_types::match_set::MatchSet;
use crate::data_types::sv_source::SvSource;
use crate::data_types::sv_type::SvType;

/// Per-source statistics, diagnostics only
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceSummary {
    /// The source tag
    source: String,
    /// Number of variants per effective type
    type_counts: BTreeMap<SvType, u64>,
    /// Number of base variants this source contributed a match to; for the base source, the number matched by anything
    matched: u64
}

impl SourceSummary {
    /// Counts the variants of a source by effective type
    /// # Arguments
    /// * `source` - the decoded source
    /// * `prefer_base_type` - passed through to effective-type resolution
    pub fn from_source(source: &SvSource, prefer_base_type: bool) -> Self {
        let mut type_counts: BTreeMap<SvType, u64> = Default::default();
        for variant in source.variants().iter() {
            *type_counts.entry(variant.effective_type(prefer_base_type)).or_default() += 1;
        }
        Self {
            source: source.tag().to_string(),
            type_counts,
            matched: 0
        }
    }

    /// Builds the base summary and one summary per other source, including the matched counts
    /// # Arguments
    /// * `base` - the base source
    /// * `others` - the other sources, in comparison order
    /// * `match_sets` - the comparator output
    /// * `prefer_base_type` - passed through to effective-type resolution
    pub fn summarize_all(base: &SvSource, others: &[SvSource], match_sets: &[MatchSet], prefer_base_type: bool) -> Vec<Self> {
        let mut base_summary = Self::from_source(base, prefer_base_type);
        base_summary.matched = match_sets.iter()
            .filter(|ms| ms.has_any_match())
            .count() as u64;

        let mut ret = vec![base_summary];
        for other in others.iter() {
            let mut summary = Self::from_source(other, prefer_base_type);
            summary.matched = match_sets.iter()
                .filter(|ms| ms.get_match(other.tag()).is_some())
                .count() as u64;
            ret.push(summary);
        }
        ret
    }

    /// Sends the statistics to the logger
    pub fn log_summary(&self) {
        info!("Source {:?}: {} variants, {} matched", self.source, self.total(), self.matched);
        for (sv_type, count) in self.type_counts.iter() {
            info!("\t{sv_type}: {count}");
        }
    }

    /// Total number of variants in the source
    pub fn total(&self) -> u64 {
        self.type_counts.values().sum()
    }

    // getters
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn type_counts(&self) -> &BTreeMap<SvType, u64> {
        &self.type_counts
    }

    pub fn matched(&self) -> u64 {
        self.matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::structural_variant::StructuralVariant;

    #[test]
    fn test_type_counts() {
        let source = SvSource::new("annotsv".to_string(), vec![
            StructuralVariant::new_interval("annotsv", "1", "chr1", 10, 20, SvType::Del).unwrap(),
            StructuralVariant::new_interval("annotsv", "2", "chr1", 30, 40, SvType::Del).unwrap(),
            StructuralVariant::new_interval("annotsv", "3", "chr1", 50, 50, SvType::Ins).unwrap(),
            StructuralVariant::new_breakend_pair("annotsv", "4", "chr1", 50, "chr3", 70, SvType::Bnd).unwrap()
                .with_alternate_type(Some(SvType::Dup)),
        ]);

        let summary = SourceSummary::from_source(&source, false);
        assert_eq!(summary.source(), "annotsv");
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.type_counts().get(&SvType::Del), Some(&2));
        assert_eq!(summary.type_counts().get(&SvType::Ins), Some(&1));
        assert_eq!(summary.type_counts().get(&SvType::Dup), Some(&1));
        assert_eq!(summary.type_counts().get(&SvType::Bnd), None);

        let summary = SourceSummary::from_source(&source, true);
        assert_eq!(summary.type_counts().get(&SvType::Bnd), Some(&1));
        assert_eq!(summary.type_counts().get(&SvType::Dup), None);
    }
}
