// Stratgen: AI-assisted QuantConnect strategy generation
// Copyright (c) 2024 Stratgen Core Team

//! Progress bar for batch runs

use crate::pipeline::{BatchItem, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Progress tracker for a batch of prompts
#[derive(Debug)]
pub struct BatchProgress {
    bar: ProgressBar,
    enabled: bool,
    saved: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl BatchProgress {
    /// Create a tracker for `total` prompts; a disabled tracker draws nothing
    pub fn new(total: usize, enabled: bool) -> Self {
        let bar = if enabled {
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            let bar = ProgressBar::new(total as u64);
            bar.set_style(style);
            bar.set_message("generating");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            enabled,
            saved: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Create a disabled tracker
    pub fn disabled() -> Self {
        Self::new(0, false)
    }

    /// Check if progress is drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a finished item
    pub fn item_done(&self, item: &BatchItem) {
        let counter = match item.outcome {
            Outcome::Saved { .. } => &self.saved,
            Outcome::Rejected { .. } => &self.rejected,
            Outcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        self.bar.inc(1);
        self.bar.set_message(format!(
            "{} saved, {} rejected, {} failed",
            self.saved.load(Ordering::Relaxed),
            self.rejected.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        ));
    }

    /// Mark the batch as complete and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Suspend the bar while printing
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.bar.suspend(f)
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::disabled()
    }
}
