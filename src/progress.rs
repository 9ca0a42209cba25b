//! Progress reporting, abstracted behind a trait so library code never
//! has to know whether it's running under a terminal or inside a test.
//!
//! Grounded in `src/bin/reference.rs`'s use of `indicatif::ProgressBar`
//! with a custom template; here that's wrapped behind [`Progress`] so
//! the CLI can swap in a silent implementation for `--quiet` runs.

use indicatif::{ProgressBar, ProgressStyle};

pub trait Progress {
    /// Register a task with a human-readable label and a known total
    /// unit count (e.g. number of records to sketch). Returns an
    /// opaque handle to pass to `update`.
    fn add_task(&self, label: &str, total: u64) -> usize;

    /// Advance the given task by `advance` units.
    fn update(&self, task_id: usize, advance: u64);
}

/// No-op implementation for library use and tests.
#[derive(Debug, Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn add_task(&self, _label: &str, _total: u64) -> usize {
        0
    }

    fn update(&self, _task_id: usize, _advance: u64) {}
}

/// Wraps a single `indicatif::ProgressBar`. The CLI only ever tracks
/// one stage at a time, so a single bar is reused across `add_task`
/// calls rather than stacking a bar per call.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
            )
            .expect("progress template is a constant and always parses")
            .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for IndicatifProgress {
    fn add_task(&self, label: &str, total: u64) -> usize {
        self.bar.set_message(label.to_string());
        self.bar.set_length(total);
        self.bar.set_position(0);
        0
    }

    fn update(&self, _task_id: usize, advance: u64) {
        self.bar.inc(advance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_progress_is_inert() {
        let p = NullProgress;
        let id = p.add_task("sketching", 100);
        p.update(id, 10);
    }
}
