//! Rendering configuration.
//!
//! [`RenderSettings`] holds the default output format and the fallback
//! custom renderer. Rendering entry points take it by reference; the
//! process-wide instance used by `Display` is installed once with
//! [`install`] before any error is rendered and never changes afterwards.

use crate::config::{EnvError, EnvParser};
use crate::format::OutputFormat;
use crate::read_only::ReadOnlyRichError;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};
use thiserror::Error;

/// Renders an error to text for [`OutputFormat::Custom`].
pub type CustomRenderer = Arc<dyn Fn(&dyn ReadOnlyRichError) -> String + Send + Sync>;

static INSTALLED: OnceLock<RenderSettings> = OnceLock::new();
static BUILTIN: LazyLock<RenderSettings> = LazyLock::new(RenderSettings::default);

/// Default format and custom renderer applied when an error has no
/// per-instance override.
#[derive(Clone)]
pub struct RenderSettings {
    default_format: OutputFormat,
    custom_renderer: Option<CustomRenderer>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::FullFormatted,
            custom_renderer: None,
        }
    }
}

impl fmt::Debug for RenderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSettings")
            .field("default_format", &self.default_format)
            .field("custom_renderer", &self.custom_renderer.is_some())
            .finish()
    }
}

impl RenderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the format used by errors without an override.
    /// `NotSpecified` restores the built-in default, `FullFormatted`.
    #[must_use]
    pub fn with_default_format(mut self, format: OutputFormat) -> Self {
        self.default_format = match format {
            OutputFormat::NotSpecified => OutputFormat::FullFormatted,
            other => other,
        };
        self
    }

    #[must_use]
    pub fn with_custom_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&dyn ReadOnlyRichError) -> String + Send + Sync + 'static,
    {
        self.custom_renderer = Some(Arc::new(renderer));
        self
    }

    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    pub fn custom_renderer(&self) -> Option<&CustomRenderer> {
        self.custom_renderer.as_ref()
    }

    /// Reads `RICHERROR_OUTPUT_FORMAT` through `parser`; bad values are
    /// recorded on the parser and the default is kept.
    pub fn from_parser(parser: &mut EnvParser) -> Self {
        let format = parser.get_output_format("OUTPUT_FORMAT", OutputFormat::FullFormatted);
        Self::default().with_default_format(format.value)
    }

    /// Builds settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first invalid variable encountered.
    pub fn from_env() -> Result<Self, EnvError> {
        let mut parser = EnvParser::new();
        let settings = Self::from_parser(&mut parser);
        match parser.take_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(settings),
        }
    }
}

/// Returned by [`install`] when settings were already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("render settings have already been installed for this process")]
pub struct AlreadyInstalled;

/// Installs the process-wide render settings. Only the first call wins.
///
/// # Errors
///
/// Returns [`AlreadyInstalled`] on every call after the first.
pub fn install(settings: RenderSettings) -> Result<(), AlreadyInstalled> {
    let format = settings.default_format;
    let has_renderer = settings.custom_renderer.is_some();
    INSTALLED.set(settings).map_err(|_| AlreadyInstalled)?;
    tracing::debug!(%format, has_renderer, "installed process-wide render settings");
    Ok(())
}

/// The installed settings, or the built-in defaults.
pub fn current() -> &'static RenderSettings {
    INSTALLED.get().unwrap_or(&*BUILTIN)
}
