//! # Progress and warning notices
//!
//! The partitioners report what they do (which arc serves which images, which
//! configurations lost their images) through a [`Notifier`]. Two implementations are
//! provided:
//!
//! * [`LogNotifier`] – forwards to the [`log`] facade (`info!` / `warn!` / `error!`); the
//!   host program installs whatever logger it wants.
//! * [`RecordingNotifier`] – keeps every notice in memory, for tests and for callers that
//!   want to attach the notices to their own report.
//!
//! A fatal notice only reports the condition: the operation that raised it also returns
//! an error, and the caller decides how to stop.
use log::Level;

/// Sink for human-readable notices.
pub trait Notifier {
    /// Progress information.
    fn message(&mut self, text: &str);
    /// A recoverable problem; processing continues.
    fn warning(&mut self, text: &str);
    /// The operation cannot produce any result.
    fn fatal(&mut self, text: &str);
}

/// [`Notifier`] backed by the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn message(&mut self, text: &str) {
        log::info!("{text}");
    }

    fn warning(&mut self, text: &str) {
        log::warn!("{text}");
    }

    fn fatal(&mut self, text: &str) {
        log::error!("{text}");
    }
}

/// A notice kept by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

/// [`Notifier`] that stores the notices in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Vec<Notice>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Texts of the notices recorded at `level`.
    pub fn texts(&self, level: Level) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.text.as_str())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.texts(Level::Warn)
    }

    pub fn has_fatal(&self) -> bool {
        self.notices.iter().any(|n| n.level == Level::Error)
    }

    fn push(&mut self, level: Level, text: &str) {
        self.notices.push(Notice {
            level,
            text: text.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn message(&mut self, text: &str) {
        self.push(Level::Info, text);
    }

    fn warning(&mut self, text: &str) {
        self.push(Level::Warn, text);
    }

    fn fatal(&mut self, text: &str) {
        self.push(Level::Error, text);
    }
}
