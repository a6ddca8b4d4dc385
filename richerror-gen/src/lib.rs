//! Error catalog generator.
//!
//! Reads a JSON catalog of error definitions, filters it by tag and renders
//! one Rust module per entry: an error code constant, a constructor returning
//! a populated [`richerror::RichError`] and a predicate matching the code.
//!
//! ```ignore
//! use richerror_gen::{Generator, LocalFs, OutputSink, TagFilter};
//!
//! let report = Generator::new(&LocalFs, "src".parse()?)?
//!     .with_filter(TagFilter::from_flags(Some("http"), None))
//!     .run("errors.json".as_ref(), &mut std::io::stdout())?;
//! eprintln!("{}", report.summary());
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod generate;
pub mod sink;
pub mod template;
pub mod validate;

pub use catalog::{Catalog, DataItem, ERROR_DATA_TYPE, ErrorData, catalog_schema};
pub use error::GenerateError;
pub use filter::TagFilter;
pub use generate::{GenerationReport, Generator, SkippedEntry};
pub use sink::{FileSystem, LocalFs, OutputSink};
pub use template::{RenderedUnit, RustTemplate};
pub use validate::Validator;
