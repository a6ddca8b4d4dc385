//! Error catalog model.
//!
//! A catalog is a JSON array of error definitions:
//!
//! ```json
//! [
//!   {
//!     "code": "NotFound",
//!     "tags": ["http"],
//!     "message": "resource missing",
//!     "includeMap": false,
//!     "metaData": [{ "name": "id", "dataType": "string" }]
//!   }
//! ]
//! ```
//!
//! `tags`, `includeMap` and `metaData` may be omitted. The JSON Schema for the
//! file is available from [`catalog_schema`].

use crate::error::{GenerateError, Result};
use crate::sink::FileSystem;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Data type tag that wires a parameter to the inner-error list instead of
/// the metadata map.
pub const ERROR_DATA_TYPE: &str = "error";

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataItem {
    /// Parameter name and metadata key.
    pub name: String,
    /// Rust type of the parameter, or a primitive tag such as `string`.
    pub data_type: String,
    /// Path to import for `data_type`, e.g. `chrono::DateTime`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
}

impl DataItem {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            import_path: None,
        }
    }

    #[must_use]
    pub fn with_import_path(mut self, path: impl Into<String>) -> Self {
        self.import_path = Some(path.into());
        self
    }

    /// True when the item carries a wrapped error.
    pub fn is_error(&self) -> bool {
        self.data_type == ERROR_DATA_TYPE
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Stable error code, conventionally PascalCase.
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub message: String,
    /// Adds a free-form `fields: MetaData` parameter to the constructor.
    #[serde(default)]
    pub include_map: bool,
    #[serde(default)]
    pub meta_data: Vec<DataItem>,
}

impl ErrorData {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            tags: Vec::new(),
            message: message.into(),
            include_map: false,
            meta_data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: DataItem) -> Self {
        self.meta_data.push(item);
        self
    }

    #[must_use]
    pub fn with_map(mut self) -> Self {
        self.include_map = true;
        self
    }

    pub fn has_error_items(&self) -> bool {
        self.meta_data.iter().any(DataItem::is_error)
    }
}

/// The parsed catalog, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<ErrorData>,
}

impl Catalog {
    /// Parses catalog JSON. `path` is only used for error reporting.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        let entries: Vec<ErrorData> =
            serde_json::from_slice(bytes).map_err(|source| GenerateError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { entries })
    }

    /// Reads and parses the catalog at `path`.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let bytes = fs.read(path).map_err(|source| GenerateError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&bytes, path)?;
        tracing::debug!(path = %path.display(), entries = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON Schema describing a catalog file.
#[must_use]
pub fn catalog_schema() -> RootSchema {
    schema_for!(Vec<ErrorData>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("errors.json")
    }

    #[test]
    fn test_parse_full_entry() {
        let json = br#"[{
            "code": "NotFound",
            "tags": ["http", "users"],
            "message": "resource missing",
            "includeMap": true,
            "metaData": [
                {"name": "id", "dataType": "string"},
                {"name": "at", "dataType": "DateTime<Utc>", "importPath": "chrono::DateTime"},
                {"name": "cause", "dataType": "error"}
            ]
        }]"#;
        let catalog = Catalog::parse(json, &path()).unwrap();
        assert_eq!(catalog.len(), 1);
        let entry = &catalog.entries[0];
        assert_eq!(entry.code, "NotFound");
        assert_eq!(entry.tags, ["http", "users"]);
        assert!(entry.include_map);
        assert_eq!(entry.meta_data[1].import_path.as_deref(), Some("chrono::DateTime"));
        assert!(entry.meta_data[2].is_error());
        assert!(entry.has_error_items());
    }

    #[test]
    fn test_parse_defaults_optional_fields() {
        let catalog = Catalog::parse(br#"[{"code": "Bare", "message": "m"}]"#, &path()).unwrap();
        let entry = &catalog.entries[0];
        assert!(entry.tags.is_empty());
        assert!(!entry.include_map);
        assert!(entry.meta_data.is_empty());
    }

    #[test]
    fn test_parse_malformed_is_catalog_parse_error() {
        let err = Catalog::parse(b"{ not json", &path()).unwrap_err();
        assert!(matches!(err, GenerateError::CatalogParse { .. }));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("errors.json"));
    }

    #[test]
    fn test_parse_rejects_object_root() {
        let err = Catalog::parse(br#"{"code": "NotFound"}"#, &path()).unwrap_err();
        assert!(matches!(err, GenerateError::CatalogParse { .. }));
    }

    #[test]
    fn test_serialize_uses_catalog_field_names() {
        let entry = ErrorData::new("NotFound", "resource missing")
            .with_tags(["http"])
            .with_item(DataItem::new("id", "string"));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["includeMap"], false);
        assert_eq!(value["metaData"][0]["dataType"], "string");
        assert!(value["metaData"][0].get("importPath").is_none());
    }

    #[test]
    fn test_catalog_schema_describes_entries() {
        let schema = serde_json::to_value(catalog_schema()).unwrap();
        assert_eq!(schema["type"], "array");
        let definitions = &schema["definitions"];
        assert!(definitions["ErrorData"]["properties"]["includeMap"].is_object());
        assert!(definitions["DataItem"]["properties"]["importPath"].is_object());
        let required = definitions["ErrorData"]["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("code")));
        assert!(!required.contains(&serde_json::json!("tags")));
    }
}
