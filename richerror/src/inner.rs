//! Wrapped child errors.

use crate::error::RichError;
use crate::format::OutputFormat;
use crate::read_only::ReadOnlyRichError;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A child error aggregated into a [`RichError`].
///
/// The variant records whether the child satisfies the rich-error contract,
/// which decides how it is rendered by the full formats.
#[derive(Debug, Clone)]
pub enum InnerError {
    /// A rich-error-shaped child, rendered with `ShortDetailed`.
    Rich(Arc<dyn ReadOnlyRichError>),
    /// Any other error, rendered with its `Display`.
    Plain(Arc<dyn Error + Send + Sync>),
}

impl InnerError {
    pub fn rich<E: ReadOnlyRichError + 'static>(err: E) -> Self {
        Self::Rich(Arc::new(err))
    }

    pub fn plain<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Plain(Arc::new(err))
    }

    /// Wraps a bare message as a plain error.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        let boxed: Box<dyn Error + Send + Sync> = message.into();
        Self::Plain(Arc::from(boxed))
    }

    /// The rich view of this error, if it has one.
    #[must_use]
    pub fn as_rich(&self) -> Option<&dyn ReadOnlyRichError> {
        match self {
            Self::Rich(err) => Some(err.as_ref()),
            Self::Plain(_) => None,
        }
    }

    #[must_use]
    pub fn is_rich(&self) -> bool {
        matches!(self, Self::Rich(_))
    }

    /// One-line rendering used inside a parent's `INNER ERRORS` section.
    pub(crate) fn summary(&self) -> String {
        match self {
            Self::Rich(err) => err.to_string_as(OutputFormat::ShortDetailed),
            Self::Plain(err) => err.to_string(),
        }
    }
}

impl fmt::Display for InnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rich(err) => fmt::Display::fmt(err, f),
            Self::Plain(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<RichError> for InnerError {
    fn from(err: RichError) -> Self {
        Self::rich(err)
    }
}

impl From<Box<dyn Error + Send + Sync>> for InnerError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        match err.downcast::<RichError>() {
            Ok(rich) => Self::Rich(Arc::new(*rich)),
            Err(other) => Self::Plain(Arc::from(other)),
        }
    }
}

impl From<std::io::Error> for InnerError {
    fn from(err: std::io::Error) -> Self {
        Self::plain(err)
    }
}
