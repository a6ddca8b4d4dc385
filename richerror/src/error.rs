//! The rich error value.

use crate::format::{self, Layout, OutputFormat};
use crate::inner::InnerError;
use crate::read_only::ReadOnlyRichError;
use crate::settings::{self, CustomRenderer, RenderSettings};
use crate::stack::{self, StackFrame};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Metadata attached to an error. Keys are unique; rendering walks them in
/// sorted order.
pub type MetaData = BTreeMap<String, Value>;

const MISSING_CUSTOM_RENDERER: &str = "custom output format selected but no custom renderer is set on the error or in the render settings";

/// A structured error value.
///
/// `code` and `occurred_at` are fixed at construction. Every other field is
/// set through a chainable mutator that consumes the error and returns the
/// updated value; clones held elsewhere are never affected. Tags, metadata,
/// inner errors and the stack stay absent until first written.
#[derive(Clone)]
pub struct RichError {
    code: String,
    message: String,
    occurred_at: DateTime<Utc>,
    source: Option<String>,
    function: Option<String>,
    line: Option<String>,
    stack: Option<Vec<StackFrame>>,
    tags: Option<Vec<String>>,
    meta_data: Option<MetaData>,
    inner_errors: Option<Vec<InnerError>>,
    output_format: OutputFormat,
    custom_renderer: Option<CustomRenderer>,
}

impl RichError {
    /// Creates an error stamped with the current UTC time.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            occurred_at: Utc::now(),
            source: None,
            function: None,
            line: None,
            stack: None,
            tags: None,
            meta_data: None,
            inner_errors: None,
            output_format: OutputFormat::NotSpecified,
            custom_renderer: None,
        }
    }

    /// Creates an error and captures the stack. Frame 0 is the caller of
    /// this constructor, shifted up by `stack_offset`.
    #[track_caller]
    #[inline(never)]
    pub fn new_with_stack(
        code: impl Into<String>,
        message: impl Into<String>,
        stack_offset: usize,
    ) -> Self {
        Self::new(code, message).with_stack(stack_offset + 1)
    }

    /// Captures the current call stack, skipping `stack_offset` frames above
    /// the caller. The first kept frame becomes the call site. Captured
    /// frames are appended to any existing stack; at most
    /// [`MAX_STACK_DEPTH`](crate::stack::MAX_STACK_DEPTH) are kept.
    #[must_use]
    #[track_caller]
    #[inline(never)]
    pub fn with_stack(mut self, stack_offset: usize) -> Self {
        let caller = Location::caller();
        let frames = stack::capture(stack_offset);
        if let Some(first) = frames.first() {
            if first.file.is_empty() {
                self.source = Some(caller.file().to_string());
                self.line = Some(caller.line().to_string());
            } else {
                self.source = Some(first.file.clone());
                self.line = Some(first.line.to_string());
            }
            let function = first.short_function();
            self.function = (!function.is_empty()).then(|| function.to_string());
        }
        self.stack.get_or_insert_with(Vec::new).extend(frames);
        self
    }

    /// Replaces the metadata map.
    #[must_use]
    pub fn with_meta_data(mut self, meta_data: MetaData) -> Self {
        self.meta_data = Some(meta_data);
        self
    }

    /// Inserts or replaces one metadata value. A value that cannot be
    /// represented as JSON is logged and stored as a string describing the
    /// serialization failure.
    #[must_use]
    pub fn add_meta_data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(code = %self.code, key = %key, error = %e, "metadata value is not serializable");
                Value::String(format!("<unserializable: {e}>"))
            }
        };
        self.meta_data
            .get_or_insert_with(MetaData::new)
            .insert(key, value);
        self
    }

    /// Appends every error in `errs`.
    #[must_use]
    pub fn with_errors<I, E>(mut self, errs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<InnerError>,
    {
        self.inner_errors
            .get_or_insert_with(Vec::new)
            .extend(errs.into_iter().map(Into::into));
        self
    }

    /// Appends `err` when present; `None` leaves the error unchanged.
    #[must_use]
    pub fn add_error<E: Into<InnerError>>(mut self, err: Option<E>) -> Self {
        if let Some(err) = err {
            self.inner_errors
                .get_or_insert_with(Vec::new)
                .push(err.into());
        }
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Overrides the source file, e.g. when rebuilding an error received
    /// from another process.
    #[must_use]
    pub fn add_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn add_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    #[must_use]
    pub fn add_line_number(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Sets the renderer used for [`OutputFormat::Custom`] on this error.
    #[must_use]
    pub fn set_custom_output_function<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&dyn ReadOnlyRichError) -> String + Send + Sync + 'static,
    {
        self.custom_renderer = Some(Arc::new(renderer));
        self
    }

    /// Sets the format used by `Display` for this error.
    #[must_use]
    pub fn set_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// The per-instance format override.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// The instance override when set, else the settings' default.
    pub fn effective_format(&self, settings: &RenderSettings) -> OutputFormat {
        match self.output_format {
            OutputFormat::NotSpecified => settings.default_format(),
            format => format,
        }
    }

    /// Renders with the effective format.
    ///
    /// # Panics
    ///
    /// Panics when the effective format is `Custom` and no renderer is
    /// configured.
    pub fn render(&self, settings: &RenderSettings) -> String {
        self.render_as(self.effective_format(settings), settings)
    }

    /// Renders with an explicit format. `NotSpecified` renders `Short`.
    ///
    /// # Panics
    ///
    /// Panics when `format` is `Custom` and neither this error nor
    /// `settings` carries a custom renderer.
    pub fn render_as(&self, format: OutputFormat, settings: &RenderSettings) -> String {
        match format {
            OutputFormat::Custom => self.render_custom(settings),
            OutputFormat::Detailed => format::detailed(self, Layout::FORMATTED),
            OutputFormat::FullFormatted => format::full(self, Layout::FORMATTED),
            OutputFormat::FullInline => format::full(self, Layout::INLINE),
            OutputFormat::ShortDetailed => format::short_detailed(self),
            OutputFormat::Short | OutputFormat::NotSpecified => format::short(self),
        }
    }

    fn render_custom(&self, settings: &RenderSettings) -> String {
        let Some(renderer) = self
            .custom_renderer
            .as_ref()
            .or_else(|| settings.custom_renderer())
        else {
            panic!("{MISSING_CUSTOM_RENDERER}");
        };
        renderer(self)
    }
}

impl ReadOnlyRichError for RichError {
    fn error_code(&self) -> &str {
        &self.code
    }

    fn error_message(&self) -> &str {
        &self.message
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn stack(&self) -> &[StackFrame] {
        self.stack.as_deref().unwrap_or_default()
    }

    fn source_file(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    fn line_number(&self) -> Option<&str> {
        self.line.as_deref()
    }

    fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    fn meta_data(&self) -> Option<&MetaData> {
        self.meta_data.as_ref()
    }

    fn errors(&self) -> &[InnerError] {
        self.inner_errors.as_deref().unwrap_or_default()
    }

    fn to_string_as(&self, format: OutputFormat) -> String {
        self.render_as(format, settings::current())
    }

    fn to_custom_string(&self) -> String {
        self.render_custom(settings::current())
    }
}

impl fmt::Display for RichError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(settings::current()))
    }
}

impl fmt::Debug for RichError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichError")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("occurred_at", &self.occurred_at)
            .field("source", &self.source)
            .field("function", &self.function)
            .field("line", &self.line)
            .field("stack", &self.stack)
            .field("tags", &self.tags)
            .field("meta_data", &self.meta_data)
            .field("inner_errors", &self.inner_errors)
            .field("output_format", &self.output_format)
            .field("custom_renderer", &self.custom_renderer.is_some())
            .finish()
    }
}

impl std::error::Error for RichError {}

/// JSON shape of a rich error. Inner errors are rendered to strings and the
/// render overrides are left out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RichErrorRecord<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<&'a str>,
    occurred_at: DateTime<Utc>,
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'a [StackFrame]>,
    inner_errors: Option<Vec<String>>,
    meta_data: Option<&'a MetaData>,
}

impl Serialize for RichError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RichErrorRecord {
            code: &self.code,
            message: &self.message,
            source: self.source.as_deref(),
            function: self.function.as_deref(),
            line: self.line.as_deref(),
            occurred_at: self.occurred_at,
            tags: self.tags.as_deref(),
            stack: self.stack.as_deref().filter(|frames| !frames.is_empty()),
            inner_errors: self
                .inner_errors
                .as_ref()
                .map(|errs| errs.iter().map(InnerError::summary).collect()),
            meta_data: self.meta_data.as_ref(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RichError {
        RichError::new("NotFound", "resource missing")
    }

    #[test]
    fn test_new_leaves_optional_fields_absent() {
        let err = sample();
        assert_eq!(err.error_code(), "NotFound");
        assert_eq!(err.error_message(), "resource missing");
        assert!(err.meta_data().is_none());
        assert!(err.tags().is_empty());
        assert!(err.errors().is_empty());
        assert!(!err.has_stack());
        assert!(err.source_file().is_none());
        assert_eq!(err.output_format(), OutputFormat::NotSpecified);
    }

    #[test]
    fn test_mutators_preserve_code_and_timestamp() {
        let original = sample();
        let updated = original
            .clone()
            .add_meta_data("id", "42")
            .add_tag("http")
            .add_error(Some(RichError::new("Inner", "inner")))
            .add_source("a.rs")
            .add_function("f")
            .add_line_number("1")
            .set_output_format(OutputFormat::Short)
            .with_stack(0);
        assert_eq!(updated.error_code(), original.error_code());
        assert_eq!(updated.occurred_at(), original.occurred_at());
    }

    #[test]
    fn test_clone_is_not_affected_by_mutation() {
        let original = sample().add_tag("first");
        let updated = original.clone().add_tag("second").add_meta_data("k", 1);
        assert_eq!(original.tags(), ["first"]);
        assert!(original.meta_data().is_none());
        assert_eq!(updated.tags(), ["first", "second"]);
    }

    #[test]
    fn test_unserializable_meta_data_keeps_the_failure() {
        let coords: std::collections::HashMap<(i32, i32), &str> = [((1, 2), "a")].into();
        let err = sample().add_meta_data("coords", coords);
        let stored = err.meta_data_item("coords").and_then(Value::as_str).unwrap();
        assert!(stored.starts_with("<unserializable: "));
        assert!(stored.contains("key must be a string"));
        assert!(!err.to_string_as(OutputFormat::Detailed).contains("coords: null"));
    }

    #[test]
    fn test_add_meta_data_then_lookup() {
        let err = sample().add_meta_data("id", "user-42").add_meta_data("attempts", 3);
        assert_eq!(err.meta_data_item("id"), Some(&json!("user-42")));
        assert_eq!(err.meta_data_item("attempts"), Some(&json!(3)));
        assert_eq!(err.meta_data_item("missing"), None);
    }

    #[test]
    fn test_add_meta_data_upserts() {
        let err = sample().add_meta_data("id", 1).add_meta_data("id", 2);
        assert_eq!(err.meta_data().map(MetaData::len), Some(1));
        assert_eq!(err.meta_data_item("id"), Some(&json!(2)));
    }

    #[test]
    fn test_with_meta_data_replaces_wholesale() {
        let mut replacement = MetaData::new();
        replacement.insert("fresh".to_string(), json!(true));
        let err = sample().add_meta_data("stale", 1).with_meta_data(replacement);
        assert!(err.meta_data_item("stale").is_none());
        assert_eq!(err.meta_data_item("fresh"), Some(&json!(true)));
    }

    #[test]
    fn test_add_error_none_is_noop() {
        let err = sample().add_error(None::<RichError>);
        assert!(err.errors().is_empty());

        let err = err
            .add_error(Some(RichError::new("A", "a")))
            .add_error(None::<InnerError>);
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_with_errors_appends() {
        let err = sample()
            .add_error(Some(RichError::new("A", "a")))
            .with_errors(vec![InnerError::msg("b"), InnerError::msg("c")]);
        assert_eq!(err.errors().len(), 3);
        assert!(err.errors()[0].is_rich());
        assert!(!err.errors()[2].is_rich());
    }

    #[test]
    fn test_with_tags_replaces_and_add_tag_appends() {
        let err = sample().add_tag("old").with_tags(["http", "db"]).add_tag("retry");
        assert_eq!(err.tags(), ["http", "db", "retry"]);
    }

    #[test]
    fn test_with_stack_records_call_site() {
        let err = sample().with_stack(0);
        assert!(err.has_stack());
        assert!(err.stack().len() <= crate::stack::MAX_STACK_DEPTH);
        assert_eq!(err.stack()[0].depth, 0);
        assert!(err.source_file().is_some());
        assert!(err.line_number().is_some());
        assert_eq!(err.function(), Some("test_with_stack_records_call_site"));
    }

    #[test]
    fn test_new_with_stack_starts_at_caller() {
        let err = RichError::new_with_stack("Code", "msg", 0);
        assert!(err.has_stack());
        assert_eq!(err.function(), Some("test_new_with_stack_starts_at_caller"));
    }

    #[test]
    fn test_explicit_call_site_overrides() {
        let err = sample()
            .add_source("remote/service.go")
            .add_function("Handle")
            .add_line_number("88");
        assert_eq!(err.source_file(), Some("remote/service.go"));
        assert_eq!(err.function(), Some("Handle"));
        assert_eq!(err.line_number(), Some("88"));
        assert!(!err.has_stack());
    }

    #[test]
    fn test_effective_format_prefers_instance() {
        let settings = RenderSettings::new().with_default_format(OutputFormat::Detailed);
        assert_eq!(sample().effective_format(&settings), OutputFormat::Detailed);
        assert_eq!(
            sample()
                .set_output_format(OutputFormat::Short)
                .effective_format(&settings),
            OutputFormat::Short
        );
    }

    #[test]
    fn test_render_uses_settings_default() {
        let settings = RenderSettings::new().with_default_format(OutputFormat::Short);
        let err = sample();
        assert_eq!(err.render(&settings), format::short(&err));
    }

    #[test]
    fn test_not_specified_explicit_render_is_short() {
        let err = sample();
        assert_eq!(
            err.render_as(OutputFormat::NotSpecified, &RenderSettings::default()),
            format::short(&err)
        );
    }

    #[test]
    fn test_instance_custom_renderer_wins() {
        let settings = RenderSettings::new().with_custom_renderer(|_| "from settings".to_string());
        let err = sample().set_custom_output_function(|e| format!("custom {}", e.error_code()));
        assert_eq!(err.render_as(OutputFormat::Custom, &settings), "custom NotFound");

        let plain = sample().set_output_format(OutputFormat::Custom);
        assert_eq!(plain.render(&settings), "from settings");
    }

    #[test]
    #[should_panic(expected = "no custom renderer")]
    fn test_custom_without_renderer_is_fatal() {
        let err = sample();
        let _ = err.render_as(OutputFormat::Custom, &RenderSettings::default());
    }

    #[test]
    fn test_serialize_matches_record_shape() {
        let err = sample()
            .add_meta_data("id", "7")
            .add_tag("http")
            .add_error(Some(InnerError::msg("disk full")));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "NotFound");
        assert_eq!(value["message"], "resource missing");
        assert_eq!(value["tags"], json!(["http"]));
        assert_eq!(value["metaData"]["id"], "7");
        assert_eq!(value["innerErrors"], json!(["disk full"]));
        assert!(value["occurredAt"].is_string());
        assert!(value.get("stack").is_none());
        assert!(value.get("source").is_none());
    }

    #[test]
    fn test_serialize_absent_collections_are_null() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value["tags"].is_null());
        assert!(value["metaData"].is_null());
        assert!(value["innerErrors"].is_null());
    }
}
