//! Progress tracking for export operations
//!
//! Shows a progress display on stderr with the number of users exported and
//! the current rate. It starts as a spinner; once the collection size is
//! known it switches to a bounded bar.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for export runs
pub struct ProgressTracker {
    /// Start time of the operation
    start_time: Instant,
    /// Progress display (optional, can be disabled)
    bar: Option<ProgressBar>,
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {pos} users {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} users {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `total` - Total number of users if known (None for unknown)
    /// * `enable_bar` - Whether to display progress
    pub fn new(total: Option<u64>, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| match total {
            Some(n) => {
                let bar = ProgressBar::new(n);
                bar.set_style(bar_style());
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(spinner_style());
                bar
            }
        });

        Self {
            start_time: Instant::now(),
            bar,
        }
    }

    /// A tracker that draws nothing
    pub fn hidden() -> Self {
        Self::new(None, false)
    }

    /// Set the collection size, turning a spinner into a bounded bar
    ///
    /// # Arguments
    /// * `total` - Total number of users
    pub fn set_total(&self, total: u64) {
        if let Some(ref bar) = self.bar {
            if bar.length() != Some(total) {
                bar.set_length(total);
                bar.set_style(bar_style());
            }
        }
    }

    /// Update progress with new count
    ///
    /// # Arguments
    /// * `count` - Total number of users exported so far
    pub fn update(&self, count: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} users/sec)", speed));
            }
        }
    }

    /// Finish and clear the display
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker() {
        let tracker = ProgressTracker::hidden();
        assert!(tracker.bar.is_none());
        tracker.set_total(1000);
        tracker.update(500);
        tracker.finish();
    }

    #[test]
    fn test_enabled_tracker_tracks_position() {
        let tracker = ProgressTracker::new(None, true);
        tracker.update(42);
        assert_eq!(tracker.bar.as_ref().map(|b| b.position()), Some(42));
        tracker.finish();
    }

    #[test]
    fn test_known_total_gives_bounded_bar() {
        let tracker = ProgressTracker::new(Some(250), true);
        assert_eq!(tracker.bar.as_ref().and_then(|b| b.length()), Some(250));
    }

    #[test]
    fn test_set_total_bounds_spinner() {
        let tracker = ProgressTracker::new(None, true);
        assert_eq!(tracker.bar.as_ref().and_then(|b| b.length()), None);

        tracker.set_total(300);
        tracker.update(100);
        let bar = tracker.bar.as_ref().unwrap();
        assert_eq!(bar.length(), Some(300));
        assert_eq!(bar.position(), 100);
    }
}
