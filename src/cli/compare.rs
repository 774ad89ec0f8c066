
use anyhow::bail;
use clap::Args;
use itertools::Itertools;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::core::{check_optional_filename, check_required_filename, FULL_VERSION};
use crate::data_types::sv_type::SvType;
use crate::parsing::SourceFormat;

#[derive(Args, Clone, Default, Serialize)]
pub struct CompareSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    om_hts_svc_version: String,

    /// Bionano Solve structural variant map (smap), the base source
    #[clap(required = true)]
    #[clap(short = 'b')]
    #[clap(long = "bionano-input")]
    #[clap(value_name = "SMAP")]
    #[clap(help_heading = Some("Input/Output"))]
    pub bionano_filename: PathBuf,

    /// AnnotSV annotation table
    #[clap(short = 'a')]
    #[clap(long = "annotsv-input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub annotsv_filename: Option<PathBuf>,

    /// Samplot variant table
    #[clap(short = 's')]
    #[clap(long = "samplot-input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub samplot_filename: Option<PathBuf>,

    /// Long Ranger structural variant calls (VCF)
    #[clap(long = "vcf-longranger-input")]
    #[clap(visible_alias = "vl")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_longranger_filename: Option<PathBuf>,

    /// Sniffles structural variant calls (VCF)
    #[clap(long = "vcf-sniffles-input")]
    #[clap(visible_alias = "vs")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_sniffles_filename: Option<PathBuf>,

    /// Output correlation report; comma separated if it ends with .csv, tab otherwise
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV/CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Optional output file with per-source variant counts
    #[clap(long = "output-summary")]
    #[clap(value_name = "TSV/CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub summary_filename: Option<PathBuf>,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Only compare base variants of these types (comma separated: BND,CNV,DEL,INS,DUP,INV,UNK)
    #[clap(short = 't')]
    #[clap(long = "variant-type")]
    #[clap(value_name = "TYPES")]
    #[clap(help_heading = Some("Filters"))]
    pub variant_type: Option<String>,

    /// The parsed form of --variant-type, populated during settings checks
    #[clap(skip)]
    pub variant_types: Option<BTreeSet<SvType>>,

    /// Maximum distance (bp) allowed between matching breakpoints [default: exact match]
    #[clap(short = 'd')]
    #[clap(long = "distance-variance")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Filters"))]
    pub distance_variance: Option<u64>,

    /// Minimum reciprocal overlap for interval events, relative to the longer event
    #[clap(long = "minimal-proportion")]
    #[clap(visible_alias = "mp")]
    #[clap(value_name = "FLOAT")]
    #[clap(help_heading = Some("Filters"))]
    pub minimal_proportion: Option<f64>,

    /// Requires matched variants to share at least one gene
    #[clap(short = 'g')]
    #[clap(long = "gene-intersection")]
    #[clap(help_heading = Some("Filters"))]
    pub gene_intersection: bool,

    /// Matches breakend calls on their reported type instead of the alternate (SVTYPE2) classification
    #[clap(long = "prefer-base-svtype")]
    #[clap(visible_alias = "svt")]
    #[clap(help_heading = Some("Filters"))]
    pub prefer_base_svtype: bool,

    /// Keeps duplicate records within each source
    #[clap(long = "keep-duplicates")]
    pub keep_duplicates: bool,

    /// Number of threads to use in the comparison step
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl CompareSettings {
    /// Returns the provided "other" inputs in comparison order
    pub fn other_inputs(&self) -> Vec<(SourceFormat, &Path)> {
        [
            (SourceFormat::AnnotSv, self.annotsv_filename.as_deref()),
            (SourceFormat::Samplot, self.samplot_filename.as_deref()),
            (SourceFormat::VcfLongRanger, self.vcf_longranger_filename.as_deref()),
            (SourceFormat::VcfSniffles, self.vcf_sniffles_filename.as_deref())
        ].into_iter()
            .filter_map(|(format, opt_filename)| opt_filename.map(|f| (format, f)))
            .collect()
    }
}

pub fn check_compare_settings(mut settings: CompareSettings) -> anyhow::Result<CompareSettings> {
    // hard code the version in
    settings.om_hts_svc_version = FULL_VERSION.clone();
    info!("om-hts-svc version: {:?}", &settings.om_hts_svc_version);
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.bionano_filename, "Bionano smap")?;
    check_optional_filename(settings.annotsv_filename.as_deref(), "AnnotSV table")?;
    check_optional_filename(settings.samplot_filename.as_deref(), "Samplot table")?;
    check_optional_filename(settings.vcf_longranger_filename.as_deref(), "Long Ranger VCF")?;
    check_optional_filename(settings.vcf_sniffles_filename.as_deref(), "Sniffles VCF")?;

    // dump stuff to the logger
    info!("\t{}: {:?}", SourceFormat::Bionano, &settings.bionano_filename);
    let other_inputs = settings.other_inputs();
    if other_inputs.is_empty() {
        bail!("At least one of --annotsv-input, --samplot-input, --vcf-longranger-input, or --vcf-sniffles-input is required");
    }
    for (format, filename) in other_inputs.iter() {
        info!("\t{format}: {filename:?}");
    }
    info!("\tDuplicate removal: {}", if settings.keep_duplicates { "DISABLED" } else { "ENABLED" });

    // filters
    info!("Filters:");
    if let Some(raw_types) = settings.variant_type.as_deref() {
        let variant_types = SvType::parse_list(raw_types)?;
        if variant_types.is_empty() {
            bail!("--variant-type must contain at least one type");
        }
        info!("\tVariant types: {}", variant_types.iter().join(","));
        settings.variant_types = Some(variant_types);
    } else {
        info!("\tVariant types: ALL");
    }

    match settings.distance_variance {
        Some(dv) => info!("\tDistance variance: {dv}"),
        None => info!("\tDistance variance: exact")
    };

    if let Some(mp) = settings.minimal_proportion {
        if !mp.is_finite() || !(0.0..=1.0).contains(&mp) {
            bail!("--minimal-proportion must be in the range [0, 1], got {mp}");
        }
        info!("\tMinimal proportion: {mp}");
    } else {
        info!("\tMinimal proportion: None");
    }
    info!("\tGene intersection: {}", if settings.gene_intersection { "ENABLED" } else { "DISABLED" });
    info!("\tPrefer base SV type: {}", if settings.prefer_base_svtype { "ENABLED" } else { "DISABLED" });

    // outputs
    info!("Outputs:");
    info!("\tReport: {:?}", &settings.output_filename);
    if let Some(summary_fn) = settings.summary_filename.as_ref() {
        info!("\tSummary: {summary_fn:?}");
    }
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    if settings.threads == 0 {
        bail!("--threads must be >0");
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
