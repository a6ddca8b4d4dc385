//! Rust source template for one catalog entry.
//!
//! Each entry becomes a self-contained module with an error code constant,
//! a constructor and a predicate:
//!
//! ```text
//! pub const ERR_CODE_NOT_FOUND: &str = "NotFound";
//! pub fn new_not_found_error(id: &str, include_stack: bool) -> RichError { .. }
//! pub fn is_not_found_error(err: &dyn ReadOnlyRichError) -> bool { .. }
//! ```

use crate::catalog::{DataItem, ErrorData};
use crate::error::{GenerateError, Result};
use convert_case::{Case, Casing};
use std::collections::BTreeSet;
use std::fmt::{self, Write};

pub const DEFAULT_CRATE_PATH: &str = "richerror";
pub const DEFAULT_PACKAGE: &str = "errors";
pub const GENERATED_HEADER: &str = "// Code generated by richerror-gen. DO NOT EDIT.";

/// Signatures longer than this put one parameter per line.
const MAX_SIGNATURE_WIDTH: usize = 100;

/// Primitive data type tags and the Rust parameter types they map to.
/// Any other tag is used verbatim as a Rust type.
const PRIMITIVE_TYPES: &[(&str, &str)] = &[
    ("string", "&str"),
    ("bool", "bool"),
    ("byte", "u8"),
    ("int", "i64"),
    ("int8", "i8"),
    ("int16", "i16"),
    ("int32", "i32"),
    ("int64", "i64"),
    ("uint", "u64"),
    ("uint8", "u8"),
    ("uint16", "u16"),
    ("uint32", "u32"),
    ("uint64", "u64"),
    ("float", "f64"),
    ("float32", "f32"),
    ("float64", "f64"),
];

/// A rendered module for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    pub code: String,
    /// Module and file stem: the lower-cased code.
    pub module: String,
    pub source: String,
}

pub fn const_name(code: &str) -> String {
    format!("ERR_CODE_{}", code.to_case(Case::UpperSnake))
}

pub fn constructor_name(code: &str) -> String {
    format!("new_{}_error", code.to_case(Case::Snake))
}

pub fn predicate_name(code: &str) -> String {
    format!("is_{}_error", code.to_case(Case::Snake))
}

pub fn module_name(code: &str) -> String {
    code.to_lowercase()
}

/// Rust type of the constructor parameter for `item`.
pub fn param_type(item: &DataItem) -> String {
    if item.is_error() {
        return "Option<InnerError>".to_string();
    }
    let tag = item.data_type.trim();
    PRIMITIVE_TYPES
        .iter()
        .find(|(name, _)| *name == tag)
        .map_or_else(|| tag.to_string(), |(_, rust)| (*rust).to_string())
}

fn doc_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders catalog entries into Rust modules.
#[derive(Debug, Clone)]
pub struct RustTemplate {
    crate_path: String,
    package: String,
}

impl Default for RustTemplate {
    fn default() -> Self {
        Self {
            crate_path: DEFAULT_CRATE_PATH.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl RustTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path the generated code imports the error types from.
    #[must_use]
    pub fn with_crate_path(mut self, crate_path: impl Into<String>) -> Self {
        self.crate_path = crate_path.into();
        self
    }

    /// Name of the module the generated files live in.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn crate_path(&self) -> &str {
        &self.crate_path
    }

    pub fn render(&self, entry: &ErrorData) -> Result<RenderedUnit> {
        let mut source = String::new();
        self.write_unit(entry, &mut source)
            .map_err(|source| GenerateError::Render {
                code: entry.code.clone(),
                source,
            })?;
        Ok(RenderedUnit {
            code: entry.code.clone(),
            module: module_name(&entry.code),
            source,
        })
    }

    fn write_unit(&self, entry: &ErrorData, out: &mut String) -> fmt::Result {
        writeln!(out, "{GENERATED_HEADER}")?;
        writeln!(
            out,
            "// Module: {}::{}",
            self.package.to_lowercase(),
            module_name(&entry.code)
        )?;
        writeln!(out)?;
        self.write_imports(entry, out)?;
        writeln!(out)?;
        write_constant(entry, out)?;
        writeln!(out)?;
        write_constructor(entry, out)?;
        writeln!(out)?;
        write_predicate(entry, out)
    }

    fn write_imports(&self, entry: &ErrorData, out: &mut String) -> fmt::Result {
        let mut items = Vec::new();
        if entry.has_error_items() {
            items.push("InnerError");
        }
        if entry.include_map {
            items.push("MetaData");
        }
        items.extend(["ReadOnlyRichError", "RichError"]);
        writeln!(out, "use {}::{{{}}};", self.crate_path, items.join(", "))?;

        let extra: BTreeSet<&str> = entry
            .meta_data
            .iter()
            .filter_map(|item| item.import_path.as_deref())
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .collect();
        if !extra.is_empty() {
            writeln!(out)?;
            for path in extra {
                writeln!(out, "use {path};")?;
            }
        }
        Ok(())
    }
}

fn write_constant(entry: &ErrorData, out: &mut String) -> fmt::Result {
    let message = doc_text(&entry.message);
    if !message.is_empty() {
        writeln!(out, "/// {message}")?;
    }
    writeln!(
        out,
        "pub const {}: &str = {:?};",
        const_name(&entry.code),
        entry.code
    )
}

fn write_constructor(entry: &ErrorData, out: &mut String) -> fmt::Result {
    let mut params: Vec<String> = entry
        .meta_data
        .iter()
        .map(|item| format!("{}: {}", item.name, param_type(item)))
        .collect();
    if entry.include_map {
        params.push("fields: MetaData".to_string());
    }
    params.push("include_stack: bool".to_string());

    let name = constructor_name(&entry.code);
    writeln!(out, "/// Creates a `{}` error.", entry.code)?;
    let tags = entry.tags.join(", ");
    if !tags.is_empty() {
        writeln!(out, "///")?;
        writeln!(out, "/// Tags: {}.", doc_text(&tags))?;
    }

    let inline = format!("pub fn {name}({}) -> RichError {{", params.join(", "));
    if inline.len() <= MAX_SIGNATURE_WIDTH {
        writeln!(out, "{inline}")?;
    } else {
        writeln!(out, "pub fn {name}(")?;
        for param in &params {
            writeln!(out, "    {param},")?;
        }
        writeln!(out, ") -> RichError {{")?;
    }

    let mut chain = Vec::new();
    if entry.include_map {
        chain.push(".with_meta_data(fields)".to_string());
    }
    for item in &entry.meta_data {
        if item.is_error() {
            chain.push(format!(".add_error({})", item.name));
        } else {
            chain.push(format!(".add_meta_data({:?}, {})", item.name, item.name));
        }
    }
    if !entry.tags.is_empty() {
        let literals: Vec<String> = entry.tags.iter().map(|tag| format!("{tag:?}")).collect();
        chain.push(format!(".with_tags([{}])", literals.join(", ")));
    }

    write!(
        out,
        "    let mut err = RichError::new({}, {:?})",
        const_name(&entry.code),
        entry.message
    )?;
    for call in &chain {
        write!(out, "\n        {call}")?;
    }
    writeln!(out, ";")?;
    writeln!(out, "    if include_stack {{")?;
    writeln!(out, "        err = err.with_stack(1);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    err")?;
    writeln!(out, "}}")
}

fn write_predicate(entry: &ErrorData, out: &mut String) -> fmt::Result {
    writeln!(out, "/// Reports whether `err` is a `{}` error.", entry.code)?;
    writeln!(
        out,
        "pub fn {}(err: &dyn ReadOnlyRichError) -> bool {{",
        predicate_name(&entry.code)
    )?;
    writeln!(out, "    err.error_code() == {}", const_name(&entry.code))?;
    writeln!(out, "}}")
}
