//! Progress reporting for conversions.
//!
//! Both converters run as a short fixed pipeline (vertices, edges, faces,
//! ...). The `_with_progress` variants report one tick per finished step.
//!
//! # Example
//!
//! ```
//! use meshbridge::convert::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 4, "vertices");
//! ```

/// A progress callback that receives updates during a conversion.
///
/// The callback receives:
/// - `current`: number of finished steps
/// - `total`: total number of steps
/// - `message`: name of the step that just finished
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// Tracks the step counter of one conversion pipeline.
pub(crate) struct Steps<'a> {
    progress: &'a Progress,
    done: usize,
    total: usize,
}

impl<'a> Steps<'a> {
    pub(crate) fn new(progress: &'a Progress, total: usize) -> Self {
        progress.report(0, total, "start");
        Self {
            progress,
            done: 0,
            total,
        }
    }

    /// Mark the next step as finished.
    pub(crate) fn tick(&mut self, message: &str) {
        self.done = (self.done + 1).min(self.total);
        log::trace!("{} ({}/{})", message, self.done, self.total);
        self.progress.report(self.done, self.total, message);
    }

    /// Jump to the end when the pipeline stops early.
    pub(crate) fn finish(&mut self, message: &str) {
        self.done = self.total;
        self.progress.report(self.done, self.total, message);
    }
}
