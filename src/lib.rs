
/// Command line interface functionality
pub mod cli;
/// Merges several tissues of an individual into one pseudo-sample
pub mod coarse_grain;
/// Contains various shared data types
pub mod data_types;
/// Inverse Simpson diversity with dispersion estimates
pub mod diversity;
/// Overlap of expanded clonotypes between samples
pub mod expansion;
/// Sample selection by individual, tissue, and condition
pub mod filtering;
/// V gene usage frequencies
pub mod gene_usage;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Pairwise Jaccard similarity
pub mod similarity;
/// Various utility functions that tend to be very generic
pub mod util;
/// Exclusive and inclusive Venn region solvers for 2 or 3 samples
pub mod venn_solver;
/// All output writers
pub mod writers;
