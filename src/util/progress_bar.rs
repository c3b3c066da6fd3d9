
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

/// Template for file loading; the message holds the file currently being read
const FILE_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({percent}) {wide_msg}";

/// Shared function to pull our progress bar styling, falling back to the default bar if the template is rejected
pub fn get_progress_style() -> ProgressStyle {
    match ProgressStyle::with_template(FILE_TEMPLATE) {
        Ok(style) => style
            .with_key("percent", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}%", state.fraction() * 100.0);
            })
            .progress_chars("##-"),
        Err(_e) => ProgressStyle::default_bar()
    }
}

/// Progress bar over `len` input files
pub fn file_progress_bar(len: usize) -> ProgressBar {
    ProgressBar::new(len as u64).with_style(get_progress_style())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_progress_bar() {
        let bar = file_progress_bar(3);
        assert_eq!(bar.length(), Some(3));
        bar.inc(2);
        assert_eq!(bar.position(), 2);
        bar.finish_and_clear();
    }
}
