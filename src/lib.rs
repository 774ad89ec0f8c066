
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Per-source removal of repeated records
pub mod dedup;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Core logic for correlating structural variants across sources
pub mod sv_comparator;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
