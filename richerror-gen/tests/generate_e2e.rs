//! End-to-end generation through the library API.
//!
//! Covers:
//!   - the single-entry catalog producing one constructor and one predicate
//!   - include filtering across a mixed catalog
//!   - per-entry write failures that do not stop the run
//!   - stdout mode banners and ordering
//!   - fatal catalog failures
//!   - filtered runs sharing one package directory
//!   - output matching the units richerror's tests compile

mod common;

use common::{
    CatalogFixture, MIXED_CATALOG, NOT_FOUND_CATALOG, assert_contains, assert_path_exists,
    init_test_logging,
};
use richerror_gen::{FileSystem, GenerateError, Generator, LocalFs, OutputSink, TagFilter};
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

#[ctor::ctor]
fn setup() {
    init_test_logging();
}

#[test]
fn e2e_single_entry_generates_constructor_and_predicate() {
    let fixture = CatalogFixture::new(NOT_FOUND_CATALOG);
    let generator =
        Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone())).unwrap();
    let report = generator.run(&fixture.catalog, &mut io::sink()).unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.matched, 1);
    assert_eq!(report.generated, ["NotFound"]);
    assert!(report.is_clean());

    let source = fixture.read_generated("errors", "notfound.rs");
    assert_eq!(source.matches("pub fn new_").count(), 1);
    assert_eq!(source.matches("pub fn is_").count(), 1);
    assert_contains(
        &source,
        "pub fn new_not_found_error(id: &str, include_stack: bool) -> RichError {",
    );
    assert_contains(&source, "pub const ERR_CODE_NOT_FOUND: &str = \"NotFound\";");
    assert_contains(
        &source,
        "pub fn is_not_found_error(err: &dyn ReadOnlyRichError) -> bool {\n    err.error_code() == ERR_CODE_NOT_FOUND\n}\n",
    );
    assert!(source.ends_with("}\n"));
    assert!(!source.ends_with("\n\n"));

    let index = fixture.read_generated("errors", "mod.rs");
    assert_contains(&index, "pub mod notfound;");
    assert_contains(&index, "pub use notfound::*;");
}

#[test]
fn e2e_include_filter_keeps_only_matching_tags() {
    let fixture = CatalogFixture::new(MIXED_CATALOG);
    let generator = Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone()))
        .unwrap()
        .with_filter(TagFilter::from_flags(Some("http"), Some("upstream")));
    let report = generator.run(&fixture.catalog, &mut io::sink()).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.generated, ["NotFound", "UpstreamFailed"]);
    assert_path_exists(&fixture.generated("errors", "notfound.rs"));
    assert_path_exists(&fixture.generated("errors", "upstreamfailed.rs"));
    assert!(!fixture.generated("errors", "dbdown.rs").exists());

    let upstream = fixture.read_generated("errors", "upstreamfailed.rs");
    assert_contains(&upstream, "cause: Option<InnerError>,");
    assert_contains(&upstream, "fields: MetaData,");
    assert_contains(&upstream, ".add_error(cause)");
    assert_contains(&upstream, ".with_tags([\"HTTP\", \"upstream\"])");
}

#[test]
fn e2e_exclude_filter_drops_matching_tags() {
    let fixture = CatalogFixture::new(MIXED_CATALOG);
    let generator = Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone()))
        .unwrap()
        .with_filter(TagFilter::from_flags(None, Some(" Http ")));
    let report = generator.run(&fixture.catalog, &mut io::sink()).unwrap();
    assert_eq!(report.generated, ["DbDown"]);
}

/// Local filesystem that refuses to write files whose name contains a
/// given fragment.
struct FlakyFs {
    refuse: &'static str,
    attempts: RefCell<Vec<PathBuf>>,
}

impl FileSystem for FlakyFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        LocalFs.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.attempts.borrow_mut().push(path.to_path_buf());
        if path.to_string_lossy().contains(self.refuse) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        LocalFs.write(path, contents)
    }
}

#[test]
fn e2e_write_failure_skips_entry_and_continues() {
    let fixture = CatalogFixture::new(MIXED_CATALOG);
    let fs = FlakyFs {
        refuse: "dbdown",
        attempts: RefCell::new(Vec::new()),
    };
    let generator = Generator::new(&fs, OutputSink::Directory(fixture.out_dir.clone())).unwrap();
    let report = generator.run(&fixture.catalog, &mut io::sink()).unwrap();

    assert_eq!(report.generated, ["NotFound", "UpstreamFailed"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].code, "DbDown");
    assert!(matches!(
        report.skipped[0].error,
        GenerateError::Write { .. }
    ));
    assert_eq!(fs.attempts.borrow().len(), 4);

    let index = fixture.read_generated("errors", "mod.rs");
    assert!(!index.contains("dbdown"));
    assert_contains(&index, "pub mod upstreamfailed;");
}

#[test]
fn e2e_stdout_mode_prints_banners_in_catalog_order() {
    let fixture = CatalogFixture::new(MIXED_CATALOG);
    let generator = Generator::new(&LocalFs, OutputSink::Stdout).unwrap();
    let mut out = Vec::new();
    let report = generator.run(&fixture.catalog, &mut out).unwrap();
    assert_eq!(report.generated.len(), 3);
    assert!(report.files.is_empty());
    assert!(!fixture.out_dir.exists());

    let text = String::from_utf8(out).unwrap();
    let positions: Vec<usize> = ["NotFound", "DbDown", "UpstreamFailed"]
        .iter()
        .map(|code| {
            text.find(&format!("// ************** {code} Error Code **************"))
                .unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn e2e_malformed_catalog_aborts_run() {
    let fixture = CatalogFixture::new("[{\"code\": ");
    let generator =
        Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone())).unwrap();
    let err = generator.run(&fixture.catalog, &mut io::sink()).unwrap_err();
    assert!(matches!(err, GenerateError::CatalogParse { .. }));
    assert!(err.is_fatal());
    assert!(!fixture.out_dir.exists());
}

#[test]
fn e2e_custom_package_lower_cases_directory() {
    let fixture = CatalogFixture::new(NOT_FOUND_CATALOG);
    let generator = Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone()))
        .unwrap()
        .with_template(
            richerror_gen::RustTemplate::new()
                .with_package("AppErrors")
                .with_crate_path("crate::rich"),
        );
    generator.run(&fixture.catalog, &mut io::sink()).unwrap();
    let source = fixture.read_generated("apperrors", "notfound.rs");
    assert_contains(&source, "use crate::rich::{ReadOnlyRichError, RichError};");
}

#[test]
fn e2e_filtered_runs_share_module_index() {
    let fixture = CatalogFixture::new(MIXED_CATALOG);
    let run = |filter: TagFilter| {
        Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone()))
            .unwrap()
            .with_filter(filter)
            .run(&fixture.catalog, &mut io::sink())
            .unwrap()
    };

    let first = run(TagFilter::from_flags(Some("http"), None));
    assert_eq!(first.generated, ["NotFound", "UpstreamFailed"]);
    let second = run(TagFilter::from_flags(None, Some("http")));
    assert_eq!(second.generated, ["DbDown"]);
    assert!(second.is_clean());

    let index = fixture.read_generated("errors", "mod.rs");
    assert_contains(
        &index,
        "pub mod dbdown;\npub mod notfound;\npub mod upstreamfailed;\n",
    );
    assert_contains(
        &index,
        "pub use dbdown::*;\npub use notfound::*;\npub use upstreamfailed::*;\n",
    );
}

const COMPILED_UNITS_CATALOG: &str = r#"[
  {
    "code": "NotFound",
    "tags": ["http"],
    "message": "resource missing",
    "metaData": [{ "name": "id", "dataType": "string" }]
  },
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

#[test]
fn e2e_output_matches_compiled_units() {
    let fixture = CatalogFixture::new(COMPILED_UNITS_CATALOG);
    let generator =
        Generator::new(&LocalFs, OutputSink::Directory(fixture.out_dir.clone())).unwrap();
    let report = generator.run(&fixture.catalog, &mut io::sink()).unwrap();
    assert!(report.is_clean());

    let expected = [
        (
            "notfound.rs",
            include_str!("../../richerror/tests/generated/errors/notfound.rs"),
        ),
        (
            "upstreamfailed.rs",
            include_str!("../../richerror/tests/generated/errors/upstreamfailed.rs"),
        ),
        (
            "mod.rs",
            include_str!("../../richerror/tests/generated/errors/mod.rs"),
        ),
    ];
    for (file, checked_in) in expected {
        assert_eq!(
            fixture.read_generated("errors", file),
            checked_in,
            "richerror/tests/generated/errors/{file} is out of date"
        );
    }
}
