//! Environment configuration for richerror.
//!
//! Every variable is read with the `RICHERROR_` prefix. Parsing never stops
//! at the first bad value: errors are collected on the [`EnvParser`] and the
//! default is used in their place, so callers can report all of them at once.

pub mod env;
pub mod source;

pub use env::{EnvError, EnvParser};
pub use source::{ConfigSource, Sourced};
