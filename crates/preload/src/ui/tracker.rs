use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait TrackerBuilder<T: Tracker<U>, U> {
    fn build(self) -> T;
}

pub trait Tracker<Pos> {
    fn advance_to(&self, position: Pos) -> &Self;
    fn finish(self);
}

const BYTES_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {wide_msg}";

const SPINNER_STYLE: &str =
    "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static BYTES_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(BYTES_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(PB_CHARS))
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Byte progress of one download or extraction.
///
/// Clones share the same bar, so a clone can be moved into a progress
/// callback while the original is finished by the caller.
#[derive(Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
    finish: Option<String>,
}

impl ProgressTracker {
    /// Switch to a bounded bar once the total becomes known.
    pub fn set_total(&self, total: u64) {
        if self.pb.length() == Some(total) {
            return;
        }
        self.pb.set_length(total);
        if let Some(style) = BYTES_TEMPLATE.as_ref() {
            self.pb.set_style(style.clone());
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.pb.set_message(message.into());
    }

    /// Drop the bar without a completion message.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

impl Tracker<u64> for ProgressTracker {
    fn advance_to(&self, position: u64) -> &Self {
        self.pb.set_position(position);
        self
    }

    fn finish(self) {
        match self.finish {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    len: Option<u64>,
    prefix: Option<String>,
    finish: Option<String>,
    hidden: bool,
}

impl ProgressTrackerBuilder {
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl TrackerBuilder<ProgressTracker, u64> for ProgressTrackerBuilder {
    fn build(self) -> ProgressTracker {
        let pb = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::no_length()
        };

        let template = if self.len.is_some() {
            &BYTES_TEMPLATE
        } else {
            &SPINNER_TEMPLATE
        };
        let pb = match template.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };

        if let Some(len) = self.len {
            pb.set_length(len);
        }
        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        ProgressTracker {
            pb,
            finish: self.finish,
        }
    }
}
