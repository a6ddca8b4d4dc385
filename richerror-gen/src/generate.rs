//! Generation pipeline: load, filter, then validate, render and emit each
//! entry in catalog order.

use crate::catalog::{Catalog, ErrorData};
use crate::error::{GenerateError, Result};
use crate::filter::TagFilter;
use crate::sink::{FileSystem, OutputSink};
use crate::template::{RenderedUnit, RustTemplate};
use crate::validate::Validator;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An entry that was matched but not generated.
#[derive(Debug)]
pub struct SkippedEntry {
    pub code: String,
    pub error: GenerateError,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Entries in the catalog.
    pub total: usize,
    /// Entries kept by the tag filter.
    pub matched: usize,
    /// Codes generated, in order.
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    /// Files written in directory mode, module index included.
    pub files: Vec<PathBuf>,
    /// Set when the module index could not be updated.
    pub index_error: Option<GenerateError>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.index_error.is_none()
    }

    /// One-line summary for the operator.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} catalog entries matched; {} generated, {} skipped",
            self.matched,
            self.total,
            self.generated.len(),
            self.skipped.len()
        );
        if self.index_error.is_some() {
            summary.push_str("; module index not updated");
        }
        summary
    }
}

/// Runs catalog generation against a filesystem and an output sink.
pub struct Generator<'a> {
    fs: &'a dyn FileSystem,
    sink: OutputSink,
    filter: TagFilter,
    template: RustTemplate,
    validator: Validator,
}

impl<'a> Generator<'a> {
    pub fn new(fs: &'a dyn FileSystem, sink: OutputSink) -> Result<Self> {
        Ok(Self {
            fs,
            sink,
            filter: TagFilter::All,
            template: RustTemplate::new(),
            validator: Validator::new()?,
        })
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: RustTemplate) -> Self {
        self.template = template;
        self
    }

    /// Loads the catalog at `catalog_path` and generates every matching
    /// entry. `stdout` receives the units in stdout mode.
    ///
    /// # Errors
    ///
    /// Only catalog failures are returned. Per-entry failures and a failed
    /// module index update are recorded in the report.
    pub fn run(&self, catalog_path: &Path, stdout: &mut dyn Write) -> Result<GenerationReport> {
        let catalog = Catalog::load(self.fs, catalog_path)?;
        self.generate(&catalog, stdout)
    }

    /// Generates every matching entry of an already loaded catalog.
    pub fn generate(&self, catalog: &Catalog, stdout: &mut dyn Write) -> Result<GenerationReport> {
        let matched = self.filter.apply(&catalog.entries);
        info!(
            total = catalog.len(),
            matched = matched.len(),
            filter = %self.filter.describe(),
            "generating errors"
        );

        let mut report = GenerationReport {
            total: catalog.len(),
            matched: matched.len(),
            ..GenerationReport::default()
        };
        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        for entry in matched {
            if !seen.insert(entry.code.to_lowercase()) {
                warn!(code = %entry.code, "duplicate error code; skipping");
                report.skipped.push(SkippedEntry {
                    code: entry.code.clone(),
                    error: GenerateError::DuplicateCode(entry.code.clone()),
                });
                continue;
            }

            match self.generate_entry(entry, stdout) {
                Ok((unit, path)) => {
                    debug!(code = %unit.code, path = ?path, "generated error");
                    report.generated.push(unit.code);
                    modules.push(unit.module);
                    report.files.extend(path);
                }
                Err(error) => {
                    warn!(code = %entry.code, error = %error, "skipping entry");
                    report.skipped.push(SkippedEntry {
                        code: entry.code.clone(),
                        error,
                    });
                }
            }
        }

        match self.sink.finish(self.fs, self.template.package(), &modules) {
            Ok(index) => report.files.extend(index),
            Err(error) => {
                warn!(error = %error, "module index not updated");
                report.index_error = Some(error);
            }
        }
        info!(
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            "generation finished"
        );
        Ok(report)
    }

    fn generate_entry(
        &self,
        entry: &ErrorData,
        stdout: &mut dyn Write,
    ) -> Result<(RenderedUnit, Option<PathBuf>)> {
        self.validator.validate_entry(entry)?;
        let mut unit = self.template.render(entry)?;
        unit.source = self.validator.finish_unit(&unit.code, &unit.source)?;
        let path = self
            .sink
            .emit(self.fs, stdout, self.template.package(), &unit)?;
        Ok((unit, path))
    }
}
