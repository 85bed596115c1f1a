//! Progress-callback trait for per-checklist export events.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to receive events
//! as the exporter writes each checklist.
//!
//! # Example
//!
//! ```rust
//! use checklist_splitter::{SplitConfig, SplitProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: Arc<AtomicUsize>,
//! }
//!
//! impl SplitProgressCallback for CountingCallback {
//!     fn on_checklist_exported(&self, ordinal: usize, total: usize, path: &str, pages: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{ordinal}/{total} {path} ({pages} pages)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     written: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = SplitConfig::builder()
//!     .progress_callback(counter as Arc<dyn SplitProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the exporter as it writes each checklist.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `ordinal` is 1-based.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once after partitioning, before any page is copied.
    fn on_split_start(&self, total_checklists: usize) {
        let _ = total_checklists;
    }

    /// Called after a checklist was written to the archive.
    fn on_checklist_exported(&self, ordinal: usize, total: usize, path: &str, pages: usize) {
        let _ = (ordinal, total, path, pages);
    }

    /// Called when a header was dropped by the partitioner.
    fn on_checklist_skipped(&self, ordinal: usize, total: usize, reason: &str) {
        let _ = (ordinal, total, reason);
    }

    /// Called once after every checklist has been attempted.
    fn on_split_complete(&self, total: usize, exported: usize) {
        let _ = (total, exported);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        started_total: AtomicUsize,
        exported: AtomicUsize,
        skipped: AtomicUsize,
        completed: AtomicUsize,
    }

    impl SplitProgressCallback for TrackingCallback {
        fn on_split_start(&self, total_checklists: usize) {
            self.started_total.store(total_checklists, Ordering::SeqCst);
        }

        fn on_checklist_exported(&self, _ordinal: usize, _total: usize, _path: &str, _pages: usize) {
            self.exported.fetch_add(1, Ordering::SeqCst);
        }

        fn on_checklist_skipped(&self, _ordinal: usize, _total: usize, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_split_complete(&self, _total: usize, exported: usize) {
            self.completed.store(exported, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_split_start(3);
        cb.on_checklist_exported(1, 3, "a.pdf", 2);
        cb.on_checklist_skipped(2, 3, "degenerate");
        cb.on_split_complete(3, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            started_total: AtomicUsize::new(0),
            exported: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        };

        tracker.on_split_start(3);
        tracker.on_checklist_exported(1, 3, "a.pdf", 4);
        tracker.on_checklist_skipped(2, 3, "degenerate");
        tracker.on_checklist_exported(3, 3, "b.pdf", 1);
        tracker.on_split_complete(3, 2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.exported.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_split_start(1);
        cb.on_split_complete(1, 1);
    }
}
