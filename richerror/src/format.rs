//! Output formats and the text renderers behind them.
//!
//! | Format          | Shape                                                   |
//! |-----------------|---------------------------------------------------------|
//! | `Short`         | `timestamp - code - message`                            |
//! | `ShortDetailed` | short plus `source:line`                                |
//! | `Detailed`      | multi-line block, no stack and no inner errors          |
//! | `FullFormatted` | every section, newline separated, tab indented          |
//! | `FullInline`    | every section on one line, ` --- ` separated            |
//! | `Custom`        | whatever the configured custom renderer returns         |
//!
//! Sections are only emitted when their field is set, and always in the
//! order listed by the renderer.

use crate::error::RichError;
use crate::read_only::ReadOnlyRichError;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Text rendering shape of a rich error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// No per-error preference; the process-wide default applies.
    #[default]
    NotSpecified,
    /// Delegates to a custom renderer.
    Custom,
    /// Multi-line summary with metadata, without stack or inner errors.
    Detailed,
    /// All sections, one per line.
    FullFormatted,
    /// All sections on a single line.
    FullInline,
    /// Short plus call site.
    ShortDetailed,
    /// Timestamp, code and message.
    Short,
}

impl OutputFormat {
    /// Stable kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotSpecified => "not-specified",
            Self::Custom => "custom",
            Self::Detailed => "detailed",
            Self::FullFormatted => "full-formatted",
            Self::FullInline => "full-inline",
            Self::ShortDetailed => "short-detailed",
            Self::Short => "short",
        }
    }

    /// Every format, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [OutputFormat] {
        &[
            Self::NotSpecified,
            Self::Custom,
            Self::Detailed,
            Self::FullFormatted,
            Self::FullInline,
            Self::ShortDetailed,
            Self::Short,
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known [`OutputFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}' (expected one of: not-specified, custom, detailed, full-formatted, full-inline, short-detailed, short)")]
pub struct ParseOutputFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|format| format.name() == normalized)
            .ok_or_else(|| ParseOutputFormatError(s.to_string()))
    }
}

/// Separator and indentation used by the multi-section renderers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    separator: &'static str,
    indent: &'static str,
}

impl Layout {
    pub(crate) const FORMATTED: Layout = Layout {
        separator: "\n",
        indent: "\t",
    };
    pub(crate) const INLINE: Layout = Layout {
        separator: " --- ",
        indent: "",
    };

    fn indent(&self, levels: usize) -> String {
        self.indent.repeat(levels)
    }
}

const SHORT_SEPARATOR: &str = " - ";

pub(crate) fn timestamp(err: &RichError) -> String {
    err.occurred_at()
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Strings render raw; anything else uses its JSON text.
pub(crate) fn meta_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn call_site(err: &RichError) -> Option<String> {
    let source = err.source_file()?;
    Some(match err.line_number() {
        Some(line) => format!("{source}:{line}"),
        None => source.to_string(),
    })
}

pub(crate) fn short(err: &RichError) -> String {
    format!(
        "{}{SHORT_SEPARATOR}{}{SHORT_SEPARATOR}{}",
        timestamp(err),
        err.error_code(),
        err.error_message()
    )
}

pub(crate) fn short_detailed(err: &RichError) -> String {
    let mut output = short(err);
    if let Some(site) = call_site(err) {
        output.push_str(SHORT_SEPARATOR);
        output.push_str(&site);
    }
    output
}

pub(crate) fn detailed(err: &RichError, layout: Layout) -> String {
    let mut parts = vec![format!("ERROR - {}", timestamp(err))];
    if let Some(site) = call_site(err) {
        parts.push(format!("SOURCE: {site}"));
    }
    push_code_and_message(err, &mut parts);
    push_meta_data(err, layout, &mut parts);
    parts.join(layout.separator)
}

pub(crate) fn full(err: &RichError, layout: Layout) -> String {
    let mut parts = vec![format!("TIMESTAMP: {}", timestamp(err))];
    if let Some(source) = err.source_file() {
        parts.push(format!("SOURCE: {source}"));
    }
    if let Some(function) = err.function() {
        parts.push(format!("FUNCTION: {function}"));
    }
    if let Some(line) = err.line_number() {
        parts.push(format!("LINE_NUM: {line}"));
    }
    push_code_and_message(err, &mut parts);

    if err.has_stack() {
        parts.push("STACK:".to_string());
        for frame in err.stack() {
            parts.push(format!("{}{frame}", layout.indent(frame.depth)));
        }
    }

    let inner = err.errors();
    if !inner.is_empty() {
        parts.push("INNER ERRORS:".to_string());
        for (index, inner_err) in inner.iter().enumerate() {
            parts.push(format!(
                "{}ERROR #{}: {}",
                layout.indent(index + 1),
                index + 1,
                inner_err.summary()
            ));
        }
    }

    push_meta_data(err, layout, &mut parts);
    parts.join(layout.separator)
}

fn push_code_and_message(err: &RichError, parts: &mut Vec<String>) {
    if !err.error_code().is_empty() {
        parts.push(format!("ERRCODE: {}", err.error_code()));
    }
    if !err.error_message().is_empty() {
        parts.push(format!("MESSAGE: {}", err.error_message()));
    }
}

fn push_meta_data(err: &RichError, layout: Layout, parts: &mut Vec<String>) {
    let Some(meta_data) = err.meta_data().filter(|m| !m.is_empty()) else {
        return;
    };
    parts.push("METADATA:".to_string());
    for (key, value) in meta_data {
        parts.push(format!("{}{key}: {}", layout.indent(1), meta_value(value)));
    }
}
