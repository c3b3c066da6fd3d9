
/// Ordered set of samples keyed by name
pub mod collection;
/// Region keys and partitions produced by the Venn solvers
pub mod partition;
/// Domain error type shared across the library
pub mod repertoire_error;
/// Repertoire rows, samples, and the metadata parsed from sample names
pub mod sample;
/// Triangular pairwise similarity storage
pub mod similarity_matrix;
/// Tissue and chain enumerations
pub mod tissue;
