
use anyhow::bail;
use clap::Parser;
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::compare::CompareSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}     om-hts-svc contributors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

/// om-hts-svc, a correlator for structural variants called from optical mapping and high-throughput sequencing.
/// Every optical-mapping variant is reported along with its best match in each other source.
#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub settings: CompareSettings
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "om-hts-svc", "-b", "in.smap", "-o", "out.tsv",
            "--vs", "sniffles.vcf", "-t", "DEL,ins", "-d", "500", "--mp", "0.5", "-g", "--svt"
        ]).unwrap();
        let settings = cli.settings;
        assert_eq!(settings.bionano_filename, PathBuf::from("in.smap"));
        assert_eq!(settings.vcf_sniffles_filename, Some(PathBuf::from("sniffles.vcf")));
        assert_eq!(settings.variant_type.as_deref(), Some("DEL,ins"));
        assert_eq!(settings.distance_variance, Some(500));
        assert_eq!(settings.minimal_proportion, Some(0.5));
        assert!(settings.gene_intersection);
        assert!(settings.prefer_base_svtype);
        assert!(!settings.keep_duplicates);
        assert_eq!(settings.threads, 1);
    }

    #[test]
    fn test_parse_errors() {
        // missing required output
        assert!(Cli::try_parse_from(["om-hts-svc", "-b", "in.smap"]).is_err());
        // bad numeric values
        assert!(Cli::try_parse_from(["om-hts-svc", "-b", "in.smap", "-o", "out.tsv", "-d", "-5"]).is_err());
        assert!(Cli::try_parse_from(["om-hts-svc", "-b", "in.smap", "-o", "out.tsv", "--mp", "half"]).is_err());
    }

    #[test]
    fn test_check_filenames() {
        assert!(check_required_filename(Path::new("test_data/example.smap"), "Bionano").is_ok());
        assert!(check_required_filename(Path::new("test_data/missing.smap"), "Bionano").is_err());
        assert!(check_optional_filename(None, "AnnotSV").is_ok());
        assert!(check_optional_filename(Some(Path::new("test_data/missing.tsv")), "AnnotSV").is_err());
    }
}
