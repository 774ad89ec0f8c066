/*!
# CLI module
Command line interface functionality that is specific to om-hts-svc.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The comparison settings and their validation
pub mod compare;
