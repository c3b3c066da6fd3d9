/*!
# Parsing module
Contains the logic for parsing input files and sample identifiers into meaningful structs / data.
*/
/// Finds and loads repertoire tables from a folder
pub mod repertoire_loader;
/// Decodes tissue, individual, and chain from sample identifiers
pub mod sample_name;
