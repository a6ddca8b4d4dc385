//! Structured error values.
//!
//! A [`RichError`] carries a stable code, a message, the UTC time it was
//! created, an optional call site and stack, classification tags, a metadata
//! map and any number of wrapped inner errors. Every mutator consumes the
//! value and hands back the updated one, so a clone held elsewhere never sees
//! the change.
//!
//! Errors render in one of several [`OutputFormat`]s. The format (and an
//! optional custom renderer) can be set per error, or process-wide through
//! [`RenderSettings`] installed once at startup.
//!
//! # Example
//!
//! ```ignore
//! use richerror::{OutputFormat, ReadOnlyRichError, RichError};
//!
//! let err = RichError::new("NotFound", "resource missing")
//!     .add_meta_data("id", "user-42")
//!     .add_tag("http")
//!     .with_stack(0);
//!
//! assert!(err.has_stack());
//! println!("{}", err.to_string_as(OutputFormat::Detailed));
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod format;
pub mod inner;
pub mod logging;
pub mod read_only;
pub mod settings;
pub mod stack;
pub mod testing;

pub use config::{ConfigSource, EnvError, EnvParser, Sourced};
pub use error::{MetaData, RichError};
pub use format::OutputFormat;
pub use inner::InnerError;
pub use logging::{LogConfig, LogFormat, LoggingError, LoggingGuards, init_logging};
pub use read_only::ReadOnlyRichError;
pub use settings::{AlreadyInstalled, CustomRenderer, RenderSettings};
pub use stack::{MAX_STACK_DEPTH, StackFrame};
