//! Progress display for `fetch`

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use park_atlas::ProgressCallback;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} ETA: {eta}";

/// Creates a byte-count progress bar
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    match ProgressStyle::default_bar().template(BAR_TEMPLATE) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("Keeping default progress style: {e}"),
    }
    pb
}

/// Owns the bar shown while a dataset is fetched
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager, printing `message` first
    pub fn new(total_size: u64, message: &str) -> Self {
        eprintln!("{message}");
        Self {
            pb: create_progress_bar(total_size),
        }
    }

    /// Callback that drives the bar from `(written, total)` updates
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |written, total| {
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(written);
            if total > 0 && written >= total {
                pb.finish_with_message("done");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar_template() {
        let pb = create_progress_bar(1000);
        assert_eq!(pb.length().unwrap(), 1000);
        pb.set_position(100);
        pb.finish();
    }

    #[test]
    fn test_callback_tracks_length_and_position() {
        let manager = ProgressManager::new(0, "Test fetch");
        let callback = manager.callback();

        callback(100, 400);
        assert_eq!(manager.pb.length(), Some(400));
        assert_eq!(manager.pb.position(), 100);

        callback(400, 400);
        assert!(manager.pb.is_finished());
    }
}
