/*!
# Writers module
Contains the logic for writing the output tables of each subcommand.
All tables are comma separated when the output ends in ".csv", tab separated otherwise.
*/
/// Writes per-individual tissue-pair similarities and full similarity matrices
pub mod similarity_table;
/// Writes the V gene usage table
pub mod gene_usage_table;
/// Collects and writes per-sample diversity and expanded-overlap results
pub mod sample_summary;
/// Writes Venn region counts and the rows behind a region
pub mod venn_table;
