use std::borrow::Cow;

use anyhow::Error;

/// Formats an error into a user-facing description, so callers can present
/// failures consistently without depending on a particular frontend.
pub trait ErrorFormatter: Send + Sync {
    /// Render the error into a user-facing string.
    fn format_error(&self, error: &Error) -> Cow<'_, str>;
}

/// Formatter that renders the error together with its context chain,
/// e.g. `failed to load trust store: permission denied`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayErrorFormatter;

impl ErrorFormatter for DisplayErrorFormatter {
    fn format_error(&self, error: &Error) -> Cow<'_, str> {
        Cow::Owned(format!("{error:#}"))
    }
}
