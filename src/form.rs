//! State behind the translation form and its result overlay.
//!
//! Everything here is driven from the UI thread. The only asynchronous step,
//! the completion call, lives in [`Submission::translate`] and is run on the
//! background runtime; its outcome comes back through [`TranslationForm::complete`].

use crate::clipboard::ClipboardSink;
use crate::completion::{CompletionBackend, CompletionError};
use crate::dictionary;
use crate::prompt::build_prompt;
use std::time::{Duration, Instant};

pub const LOADING_INDICATOR: &str = "loading...";
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);
/// Results longer than this many words get the smaller heading.
pub const LARGE_HEADING_MAX_WORDS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub message: String,
    /// Empty while nothing is selected.
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a translation is already in flight")]
    InFlight,
    #[error("no language selected")]
    MissingLanguage,
    #[error("message is empty")]
    MissingMessage,
}

/// Inputs captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub language: String,
    pub message: String,
}

impl Submission {
    pub async fn translate(&self, backend: &dyn CompletionBackend) -> Result<String, CompletionError> {
        let reference = dictionary::lookup(&self.language);
        if reference.is_none() {
            tracing::warn!("no reference dictionary for {:?}", self.language);
        }
        let prompt = build_prompt(&self.message, &self.language, reference);
        tracing::debug!("prompt:\n{}", prompt.text());
        backend.complete(&prompt).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputView<'a> {
    Loading,
    LargeHeading(&'a str),
    SmallHeading(&'a str),
}

#[derive(Debug, Default)]
pub struct TranslationForm {
    pub form: FormState,
    output: String,
    is_loading: bool,
    is_modal_open: bool,
    /// Deadline of the confirmation raised by the latest copy.
    copied_until: Option<Instant>,
}

impl TranslationForm {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_modal_open(&self) -> bool {
        self.is_modal_open
    }

    pub fn is_copied(&self) -> bool {
        self.copied_until.is_some()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    fn check_submit(&self) -> Result<(), SubmitRejected> {
        if self.is_loading {
            Err(SubmitRejected::InFlight)
        } else if self.form.language.is_empty() {
            Err(SubmitRejected::MissingLanguage)
        } else if self.form.message.is_empty() {
            Err(SubmitRejected::MissingMessage)
        } else {
            Ok(())
        }
    }

    /// Opens the overlay in its loading state and hands back what to translate.
    pub fn submit(&mut self) -> Result<Submission, SubmitRejected> {
        if let Err(e) = self.check_submit() {
            tracing::warn!("submission rejected: {}", e);
            return Err(e);
        }
        self.is_modal_open = true;
        self.is_loading = true;
        self.copied_until = None;
        tracing::info!("translating {} chars to {}", self.form.message.len(), self.form.language);
        Ok(Submission {
            language: self.form.language.clone(),
            message: self.form.message.clone(),
        })
    }

    /// Failures are logged and otherwise ignored: the previous output stays.
    pub fn complete(&mut self, result: Result<String, CompletionError>) {
        match result {
            Ok(text) => {
                tracing::info!("translation: {}", text);
                self.output = text;
                self.copied_until = None;
            }
            Err(e) => tracing::error!("something went wrong while fetching the translation: {}", e),
        }
        self.is_loading = false;
        self.form = FormState::default();
    }

    /// Hides the overlay. An in-flight request keeps running.
    pub fn close(&mut self) {
        self.is_modal_open = false;
    }

    /// No-op on empty output. Returns whether the clipboard was written.
    pub fn copy(&mut self, clipboard: &mut dyn ClipboardSink, now: Instant) -> bool {
        if self.output.is_empty() {
            return false;
        }
        if !clipboard.write_text(&self.output) {
            tracing::warn!("failed to write translation to clipboard");
            return false;
        }
        self.copied_until = Some(now + COPY_CONFIRMATION);
        true
    }

    /// Expires the copy confirmation once its own deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.copied_until.is_some_and(|deadline| now >= deadline) {
            self.copied_until = None;
        }
    }

    /// Time left until the current confirmation expires.
    pub fn copy_confirmation_remaining(&self, now: Instant) -> Option<Duration> {
        self.copied_until.map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn copy_label(&self) -> &'static str {
        if self.is_copied() { "Copied!" } else { "Copy to clipboard" }
    }

    /// What the overlay shows, or `None` while it is closed.
    pub fn view(&self) -> Option<OutputView<'_>> {
        if !self.is_modal_open {
            return None;
        }
        if self.is_loading {
            return Some(OutputView::Loading);
        }
        Some(heading_for(&self.output))
    }
}

fn heading_for(text: &str) -> OutputView<'_> {
    if text.split_whitespace().count() > LARGE_HEADING_MAX_WORDS {
        OutputView::SmallHeading(text)
    } else {
        OutputView::LargeHeading(text)
    }
}
