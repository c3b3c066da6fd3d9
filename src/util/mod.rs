
/// Helper functions for opening (possibly gzipped) files and saving JSON
pub mod file_io;
/// Helper functions for generating the progress bars
pub mod progress_bar;
