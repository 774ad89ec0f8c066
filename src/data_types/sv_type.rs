
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use crate::data_types::structural_variant::SvError;

/// The closed set of structural variant classes that can be compared.
/// Parsing from a string is strict and case-insensitive (e.g. for the CLI type filter), see [`SvType::from_caller_label`] for the lenient decoder form.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum SvType {
    /// Breakend, one side of a translocation-like event
    #[strum(serialize = "BND")]
    #[serde(rename = "BND")]
    Bnd,
    /// Copy number variant
    #[strum(serialize = "CNV")]
    #[serde(rename = "CNV")]
    Cnv,
    /// Deletion
    #[strum(serialize = "DEL")]
    #[serde(rename = "DEL")]
    Del,
    /// Insertion
    #[strum(serialize = "INS")]
    #[serde(rename = "INS")]
    Ins,
    /// Duplication
    #[strum(serialize = "DUP")]
    #[serde(rename = "DUP")]
    Dup,
    /// Inversion
    #[strum(serialize = "INV")]
    #[serde(rename = "INV")]
    Inv,
    /// Anything a caller reports that does not fit the above
    #[strum(serialize = "UNK")]
    #[serde(rename = "UNK")]
    Unk
}

impl SvType {
    /// Lenient conversion of whatever label a caller wrote into its type column, this never fails.
    /// Symbolic brackets (`<DEL>`) and sub-type suffixes (`DUP:TANDEM`) are stripped first.
    /// # Arguments
    /// * `label` - the raw label, e.g. "deletion", "<DUP:TANDEM>", "TRA"
    pub fn from_caller_label(label: &str) -> SvType {
        let trimmed = label.trim()
            .trim_start_matches('<')
            .trim_end_matches('>');
        let core = trimmed.split(':').next().unwrap_or_default();
        if let Ok(sv_type) = SvType::from_str(core) {
            return sv_type;
        }

        let lowered = core.to_ascii_lowercase();
        if lowered.starts_with("del") || lowered == "loss" {
            SvType::Del
        } else if lowered.starts_with("ins") {
            SvType::Ins
        } else if lowered.starts_with("dup") || lowered == "tandem" {
            SvType::Dup
        } else if lowered.starts_with("inv") {
            SvType::Inv
        } else if lowered.starts_with("tra") || lowered == "breakend" {
            SvType::Bnd
        } else if lowered == "gain" || lowered.starts_with("cnv") || lowered.starts_with("copy") {
            SvType::Cnv
        } else {
            SvType::Unk
        }
    }

    /// Parses a comma separated list of types, e.g. "DEL,INS"
    /// # Errors
    /// * if any entry is not one of BND, CNV, DEL, INS, DUP, INV, UNK
    pub fn parse_list(raw: &str) -> Result<BTreeSet<SvType>, SvError> {
        raw.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| SvType::from_str(s).map_err(|_e| SvError::UnknownType { label: s.to_string() }))
            .collect()
    }

    /// Returns true for the breakend class, which never takes part in interval overlap checks
    pub fn is_breakend(&self) -> bool {
        *self == SvType::Bnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_strict_parse() {
        assert_eq!(SvType::from_str("DEL").unwrap(), SvType::Del);
        assert_eq!(SvType::from_str("bnd").unwrap(), SvType::Bnd);
        assert_eq!(SvType::from_str("Unk").unwrap(), SvType::Unk);
        assert!(SvType::from_str("deletion").is_err());

        // display and parse agree for every type
        for sv_type in SvType::iter() {
            assert_eq!(SvType::from_str(&sv_type.to_string()).unwrap(), sv_type);
        }
    }

    #[test]
    fn test_caller_labels() {
        assert_eq!(SvType::from_caller_label("deletion"), SvType::Del);
        assert_eq!(SvType::from_caller_label("insertion_nbase"), SvType::Ins);
        assert_eq!(SvType::from_caller_label("duplication_inverted"), SvType::Dup);
        assert_eq!(SvType::from_caller_label("inversion_paired"), SvType::Inv);
        assert_eq!(SvType::from_caller_label("translocation_interchr"), SvType::Bnd);
        assert_eq!(SvType::from_caller_label("trans_intrachr_segdupe"), SvType::Bnd);
        assert_eq!(SvType::from_caller_label("<DUP:TANDEM>"), SvType::Dup);
        assert_eq!(SvType::from_caller_label("<DEL>"), SvType::Del);
        assert_eq!(SvType::from_caller_label("TRA"), SvType::Bnd);
        assert_eq!(SvType::from_caller_label("gain"), SvType::Cnv);
        assert_eq!(SvType::from_caller_label("end"), SvType::Unk);
        assert_eq!(SvType::from_caller_label(""), SvType::Unk);
    }

    #[test]
    fn test_parse_list() {
        let types = SvType::parse_list("DEL, ins,BND").unwrap();
        assert_eq!(types, [SvType::Bnd, SvType::Del, SvType::Ins].into_iter().collect());
        assert!(SvType::parse_list("").unwrap().is_empty());
        assert!(matches!(
            SvType::parse_list("DEL,TRA"),
            Err(SvError::UnknownType { label }) if label == "TRA"
        ));
    }
}
