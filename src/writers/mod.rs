/*!
# Writers module
Contains the logic for writing the correlation report and the per-source statistics.
*/
/// Generates the correlation report; each line corresponds to one base variant
pub mod match_report;
/// Generates the per-source summary file
pub mod summary;
