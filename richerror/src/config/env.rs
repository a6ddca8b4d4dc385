//! Environment variable parsing with type safety.
//!
//! Provides a type-safe parser for richerror environment variables with
//! validation, error collection, and source tracking.

use super::source::Sourced;
use crate::format::OutputFormat;
use std::env;
use thiserror::Error;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Type-safe environment variable parser.
///
/// Collects errors during parsing so all issues can be reported at once.
pub struct EnvParser {
    prefix: &'static str,
    lookup: Lookup,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a new parser over the process environment with the
    /// `RICHERROR_` prefix.
    pub fn new() -> Self {
        Self::with_lookup(|name| env::var(name).ok())
    }

    /// Create a parser that resolves full variable names through `lookup`.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            prefix: "RICHERROR_",
            lookup: Box::new(lookup),
            errors: Vec::new(),
        }
    }

    /// Get all accumulated errors.
    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take ownership of errors.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    /// Get the full variable name with prefix.
    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn read(&self, var_name: &str) -> Option<String> {
        (self.lookup)(var_name)
    }

    /// Get a string value with default.
    pub fn get_string(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match self.read(&var_name) {
            Some(value) => Sourced::from_env(value, var_name),
            None => Sourced::default_value(default.to_string()),
        }
    }

    /// Get a boolean value with default.
    pub fn get_bool(&mut self, name: &str, default: bool) -> Sourced<bool> {
        let var_name = self.var_name(name);
        match self.read(&var_name) {
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Sourced::from_env(true, var_name),
                "0" | "false" | "no" | "off" | "" => Sourced::from_env(false, var_name),
                _ => {
                    self.errors.push(EnvError::InvalidValue {
                        var: var_name.clone(),
                        expected: "boolean (true/false/1/0/yes/no/on/off)".to_string(),
                        value,
                    });
                    Sourced::from_env(default, var_name)
                }
            },
            None => Sourced::default_value(default),
        }
    }

    /// Get an optional string (None if not set or empty).
    pub fn get_optional_string(&mut self, name: &str) -> Sourced<Option<String>> {
        let var_name = self.var_name(name);
        match self.read(&var_name) {
            Some(value) if value.is_empty() => Sourced::from_env(None, var_name),
            Some(value) => Sourced::from_env(Some(value), var_name),
            None => Sourced::default_value(None),
        }
    }

    /// Get a log level value with validation.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match self.read(&var_name) {
            Some(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, var_name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: var_name.clone(),
                            value,
                        });
                        Sourced::from_env(default.to_string(), var_name)
                    }
                }
            }
            None => Sourced::default_value(default.to_string()),
        }
    }

    /// Get an [`OutputFormat`] by its kebab-case name.
    pub fn get_output_format(&mut self, name: &str, default: OutputFormat) -> Sourced<OutputFormat> {
        let var_name = self.var_name(name);
        match self.read(&var_name) {
            Some(value) => match value.parse::<OutputFormat>() {
                Ok(format) => Sourced::from_env(format, var_name),
                Err(_) => {
                    self.errors.push(EnvError::InvalidValue {
                        var: var_name.clone(),
                        expected: "output format (short, short-detailed, detailed, full-formatted, full-inline, custom)".to_string(),
                        value,
                    });
                    Sourced::from_env(default, var_name)
                }
            },
            None => Sourced::default_value(default),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}
