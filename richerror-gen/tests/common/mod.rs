#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn init_test_logging() {
    richerror::testing::init_test_logging();
}

pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected to find '{needle}' in output, got: {haystack}"
    );
}

pub fn assert_path_exists(path: &Path) {
    assert!(path.exists(), "Expected path to exist: {}", path.display());
}

/// A temp directory holding a catalog file and an output directory.
pub struct CatalogFixture {
    pub dir: TempDir,
    pub catalog: PathBuf,
    pub out_dir: PathBuf,
}

impl CatalogFixture {
    pub fn new(catalog_json: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let catalog = dir.path().join("errors.json");
        let out_dir = dir.path().join("out");
        fs::write(&catalog, catalog_json).expect("Failed to write catalog");
        Self {
            dir,
            catalog,
            out_dir,
        }
    }

    pub fn generated(&self, package: &str, file: &str) -> PathBuf {
        self.out_dir.join(package).join(file)
    }

    pub fn read_generated(&self, package: &str, file: &str) -> String {
        let path = self.generated(package, file);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    }
}

pub const NOT_FOUND_CATALOG: &str = r#"[
  {
    "code": "NotFound",
    "tags": ["http"],
    "message": "resource missing",
    "includeMap": false,
    "metaData": [{ "name": "id", "dataType": "string" }]
  }
]"#;

pub const MIXED_CATALOG: &str = r#"[
  { "code": "NotFound", "tags": ["http"], "message": "resource missing" },
  { "code": "DbDown", "tags": ["db"], "message": "database unavailable" },
  {
    "code": "UpstreamFailed",
    "tags": ["HTTP", "upstream"],
    "message": "upstream call failed",
    "includeMap": true,
    "metaData": [
      { "name": "service", "dataType": "string" },
      { "name": "cause", "dataType": "error" }
    ]
  }
]"#;
