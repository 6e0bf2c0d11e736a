use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the identifiers of a run; one tick per identifier.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        let progress_bar = ProgressBar::new(total);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress_bar.enable_steady_tick(Duration::from_millis(100));
        Self { progress_bar }
    }

    /// A tracker that draws nothing, for tests and non-interactive runs.
    pub fn hidden(total: u64) -> Self {
        let progress_bar = ProgressBar::hidden();
        progress_bar.set_length(total);
        Self { progress_bar }
    }

    pub fn update_message(&self, message: &str) {
        self.progress_bar.set_message(message.to_string());
    }

    pub fn increment(&self, delta: u64) {
        self.progress_bar.inc(delta);
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    /// Prints a line above the bar without corrupting it.
    pub fn println(&self, line: &str) {
        self.progress_bar.println(line);
    }

    pub fn finish(&self, message: &str) {
        self.progress_bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker_counts() {
        let tracker = ProgressTracker::hidden(3);
        tracker.update_message("CIK 1067983");
        tracker.increment(1);
        tracker.increment(1);
        assert_eq!(tracker.position(), 2);
        tracker.finish("done");
    }
}
