//! Progress reporting support (requires `progress` feature)

use crate::callback::{Action, Callback, Event, Progress, Status};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Create a default progress bar for copying `total` bytes
#[must_use]
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// [`Callback`] that drives an [`indicatif::ProgressBar`].
///
/// Content progress moves the bar; completion finishes it. Errors are
/// handled with the default action. When a cancel flag is attached and set,
/// the next notification aborts the operation.
///
/// # Example
///
/// ```no_run
/// use copyfile::{copy_file, create_progress_bar, CopyOptions, ProgressBarCallback};
/// use std::path::Path;
/// use std::sync::Arc;
/// use std::sync::atomic::AtomicBool;
///
/// let cancel = Arc::new(AtomicBool::new(false));
/// let mut callback = ProgressBarCallback::new(create_progress_bar(0))
///     .with_cancel_flag(cancel.clone());
///
/// copy_file(
///     Path::new("big.iso"),
///     Path::new("copy.iso"),
///     None,
///     &CopyOptions::default(),
///     Some(&mut callback),
/// )?;
/// # Ok::<(), copyfile::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProgressBarCallback {
    bar: ProgressBar,
    cancel: Option<Arc<AtomicBool>>,
}

impl ProgressBarCallback {
    /// Wrap `bar`. Its length is updated from the size hint of each copy.
    #[must_use]
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar, cancel: None }
    }

    /// Abort at the next notification once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The driven progress bar
    pub fn progress_bar(&self) -> &ProgressBar {
        &self.bar
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Callback for ProgressBarCallback {
    fn call(&mut self, event: &Event<'_>) -> Action {
        if self.is_cancelled() {
            self.bar.abandon();
            return Action::Abort;
        }

        if let Progress::Data { offset, size } = event.progress {
            // The hint may be stale; never let the position run past the end.
            let length = size.max(offset);
            if length > 0 && self.bar.length() != Some(length) {
                self.bar.set_length(length);
            }
            self.bar.set_position(offset);
        }

        match event.status {
            Status::Failed { .. } => event.default_action,
            Status::Eof => {
                self.bar.finish();
                Action::Continue
            }
            Status::Running => Action::Continue,
        }
    }
}
