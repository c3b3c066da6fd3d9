/*!
# CLI module
Command line interface functionality that is specific to Repoverlap.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The diversity CLI subcommand
pub mod diversity;
/// The expanded CLI subcommand
pub mod expanded;
/// Input, filter, and output options shared by all subcommands
pub mod input;
/// The overlap CLI subcommand
pub mod overlap;
/// The usage CLI subcommand
pub mod usage;
/// The venn CLI subcommand
pub mod venn;
