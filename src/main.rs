
use log::{LevelFilter, error, info};
use std::time::Instant;

use om_hts_svc::cli::compare::{CompareSettings, check_compare_settings};
use om_hts_svc::cli::core::get_cli;
use om_hts_svc::data_types::source_summary::SourceSummary;
use om_hts_svc::data_types::sv_source::SvSource;
use om_hts_svc::parsing::{load_source, SourceFormat};
use om_hts_svc::sv_comparator::{compare_structural_variants, CompareConfigBuilder};
use om_hts_svc::util::json_io::save_settings_json;
use om_hts_svc::writers::match_report::MatchReportWriter;
use om_hts_svc::writers::summary::SummaryWriter;

/// Loads a single source or exits with a data error
fn load_or_exit(format: SourceFormat, filename: &std::path::Path, settings: &CompareSettings) -> SvSource {
    info!("Loading {format} variants from {filename:?}...");
    let parser = format.build_parser();
    match load_source(
        parser.as_ref(), filename, format.delimiter(),
        !settings.keep_duplicates, settings.prefer_base_svtype
    ) {
        Ok(source) => source,
        Err(e) => {
            error!("Error while loading {format} input: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    }
}

fn run_compare(settings: CompareSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_compare_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // set up the number of threads for rayon
    match rayon::ThreadPoolBuilder::new().num_threads(settings.threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };

    // create a debug folder if specified
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("Creating debug folder at {debug_folder:?}...");
        match std::fs::create_dir_all(debug_folder) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while creating debug folder: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }

        // save the CLI options
        match save_settings_json(&settings, debug_folder) {
            Ok(cli_json) => info!("Saved CLI options to {cli_json:?}"),
            Err(e) => {
                error!("Error while saving CLI options: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    }

    // load everything up front, any malformed record stops the run
    let base_source = load_or_exit(SourceFormat::Bionano, &settings.bionano_filename, &settings);
    let other_sources: Vec<SvSource> = settings.other_inputs().into_iter()
        .map(|(format, filename)| load_or_exit(format, filename, &settings))
        .collect();

    // build our configuration
    let compare_config = match CompareConfigBuilder::default()
        .distance_variance(settings.distance_variance)
        .minimal_proportion(settings.minimal_proportion)
        .variant_types(settings.variant_types.clone())
        .only_common_genes(settings.gene_intersection)
        .prefer_base_type(settings.prefer_base_svtype)
        .enable_progress(true)
        .build() {
        Ok(cc) => cc,
        Err(e) => {
            error!("Error while building compare config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Comparing {} base variants against {} sources...", base_source.len(), other_sources.len());
    let match_sets = compare_structural_variants(&base_source, &other_sources, &compare_config);
    info!("Comparison complete, saving all outputs...");

    let source_tags: Vec<String> = other_sources.iter()
        .map(|s| s.tag().to_string())
        .collect();
    let report_writer = MatchReportWriter::new(source_tags);
    info!("Saving correlation report to {:?}...", settings.output_filename);
    if let Err(e) = report_writer.write_report(&settings.output_filename, &match_sets) {
        error!("Error while saving correlation report: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    // diagnostics
    let summaries = SourceSummary::summarize_all(
        &base_source, &other_sources, &match_sets, settings.prefer_base_svtype
    );
    for summary in summaries.iter() {
        summary.log_summary();
    }

    if let Some(summary_fn) = settings.summary_filename.as_deref() {
        info!("Saving output summary to {summary_fn:?}...");
        let summary_writer = SummaryWriter::new(summaries);
        if let Err(e) = summary_writer.write_summary(summary_fn) {
            error!("Error while saving summary file: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Comparisons completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    run_compare(cli.settings);
    info!("Process finished successfully.");
}
