//! Progress reporting hooks injected per call.
//!
//! The client never touches UI state; it calls a `ProgressNotifier` before
//! every physical attempt. `LoadingProgress` adapts that to the
//! show/update/hide shape of a loading indicator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives `(attempt, total)` before each physical attempt, 1-based.
pub trait ProgressNotifier: Send + Sync {
    fn on_attempt(&self, attempt: u32, total: u32);
}

impl<F> ProgressNotifier for F
where
    F: Fn(u32, u32) + Send + Sync,
{
    fn on_attempt(&self, attempt: u32, total: u32) {
        self(attempt, total)
    }
}

/// A loading indicator owned by UI code.
pub trait LoadingSink: Send + Sync {
    fn show(&self, message: &str);
    fn update(&self, message: &str);
    fn hide(&self);
}

impl<S: LoadingSink + ?Sized> LoadingSink for Arc<S> {
    fn show(&self, message: &str) {
        (**self).show(message)
    }

    fn update(&self, message: &str) {
        (**self).update(message)
    }

    fn hide(&self) {
        (**self).hide()
    }
}

/// Drives a `LoadingSink` from attempt notifications.
///
/// The first attempt shows the indicator, later ones update it, and the
/// indicator is hidden when the adapter is dropped, which happens when the
/// call that owns it settles or is abandoned.
pub struct LoadingProgress<S: LoadingSink> {
    sink: S,
    shown: AtomicBool,
}

impl<S: LoadingSink> LoadingProgress<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            shown: AtomicBool::new(false),
        }
    }
}

impl<S: LoadingSink> ProgressNotifier for LoadingProgress<S> {
    fn on_attempt(&self, attempt: u32, total: u32) {
        let message = if attempt <= 1 {
            "Submitting...".to_string()
        } else {
            format!("Retrying ({attempt}/{total})...")
        };
        if self.shown.swap(true, Ordering::SeqCst) {
            self.sink.update(&message);
        } else {
            self.sink.show(&message);
        }
    }
}

impl<S: LoadingSink> Drop for LoadingProgress<S> {
    fn drop(&mut self) {
        if *self.shown.get_mut() {
            self.sink.hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl LoadingSink for RecordingSink {
        fn show(&self, message: &str) {
            self.events.lock().unwrap().push(format!("show:{message}"));
        }

        fn update(&self, message: &str) {
            self.events.lock().unwrap().push(format!("update:{message}"));
        }

        fn hide(&self) {
            self.events.lock().unwrap().push("hide".to_string());
        }
    }

    #[test]
    fn shows_then_updates_then_hides() {
        let sink = Arc::new(RecordingSink::default());
        let progress = LoadingProgress::new(sink.clone());
        progress.on_attempt(1, 3);
        progress.on_attempt(2, 3);
        drop(progress);

        assert_eq!(
            *sink.events.lock().unwrap(),
            vec!["show:Submitting...", "update:Retrying (2/3)...", "hide"]
        );
    }

    #[test]
    fn never_shown_is_never_hidden() {
        let sink = Arc::new(RecordingSink::default());
        drop(LoadingProgress::new(sink.clone()));
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn closures_are_notifiers() {
        let seen = Mutex::new(Vec::new());
        let notifier = |attempt: u32, total: u32| seen.lock().unwrap().push((attempt, total));
        notifier.on_attempt(1, 2);
        notifier.on_attempt(2, 2);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }
}
