//! Merge progress reporting.

/// Trait for receiving merge pipeline progress updates.
pub trait MergeProgress {
    /// Called when a pipeline stage starts (e.g., "Merging GameDB entries...").
    fn on_phase(&self, message: &str);

    /// Called when the whole pipeline is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl MergeProgress for SilentProgress {
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl MergeProgress for LogProgress {
    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
