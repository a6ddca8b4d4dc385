//! Read-only view of a rich error.

use crate::error::MetaData;
use crate::format::OutputFormat;
use crate::inner::InnerError;
use crate::stack::StackFrame;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Accessors and renderers shared by every rich-error-shaped value.
///
/// Wrapped errors that implement this trait are rendered with
/// [`OutputFormat::ShortDetailed`] inside their parent's full output; any
/// other error falls back to its own `Display`.
pub trait ReadOnlyRichError: std::error::Error + Send + Sync {
    /// Stable identifier fixed at construction.
    fn error_code(&self) -> &str;

    fn error_message(&self) -> &str;

    /// UTC time of construction.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Captured frames, empty unless a stack capture was requested.
    fn stack(&self) -> &[StackFrame];

    /// Source file of the call site.
    fn source_file(&self) -> Option<&str>;

    fn function(&self) -> Option<&str>;

    fn line_number(&self) -> Option<&str>;

    fn tags(&self) -> &[String];

    /// The metadata map, `None` until the first write.
    fn meta_data(&self) -> Option<&MetaData>;

    /// Looks up a single metadata value.
    fn meta_data_item(&self, key: &str) -> Option<&Value> {
        self.meta_data().and_then(|meta| meta.get(key))
    }

    /// Wrapped child errors, in insertion order.
    fn errors(&self) -> &[InnerError];

    fn has_stack(&self) -> bool {
        !self.stack().is_empty()
    }

    /// Renders with an explicit format.
    ///
    /// # Panics
    ///
    /// Panics when `format` is [`OutputFormat::Custom`] and no custom
    /// renderer is configured on the error or process-wide.
    fn to_string_as(&self, format: OutputFormat) -> String;

    /// Renders with the effective custom renderer.
    ///
    /// # Panics
    ///
    /// Panics when no custom renderer is configured on the error or
    /// process-wide.
    fn to_custom_string(&self) -> String;
}
