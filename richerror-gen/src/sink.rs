//! Filesystem access and output sinks.

use crate::error::{GenerateError, Result};
use crate::template::{GENERATED_HEADER, RenderedUnit};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `--out-dir` value that selects stdout.
pub const STDOUT_KEYWORD: &str = "stdout";

/// Name of the module index written next to the generated files.
pub const INDEX_FILE: &str = "mod.rs";

/// File access used by the generator.
pub trait FileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `contents`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }
}

/// Where rendered units go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// All units on one stream, separated by banners.
    Stdout,
    /// One file per unit under `<dir>/<package>/`.
    Directory(PathBuf),
}

impl FromStr for OutputSink {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case(STDOUT_KEYWORD) {
            Self::Stdout
        } else {
            Self::Directory(PathBuf::from(s))
        })
    }
}

/// Banner line printed before each unit in stdout mode.
pub fn banner(code: &str) -> String {
    format!("// ************** {code} Error Code **************")
}

/// Module names declared by an existing `mod.rs`.
pub fn indexed_modules(index: &str) -> Vec<String> {
    index
        .lines()
        .filter_map(|line| line.trim().strip_prefix("pub mod ")?.strip_suffix(';'))
        .map(|module| module.trim().to_string())
        .filter(|module| !module.is_empty())
        .collect()
}

/// Contents of `mod.rs` for the given module names.
pub fn module_index(modules: &[String]) -> String {
    let mut output = format!("{GENERATED_HEADER}\n\n");
    for module in modules {
        output.push_str(&format!("pub mod {module};\n"));
    }
    output.push('\n');
    for module in modules {
        output.push_str(&format!("pub use {module}::*;\n"));
    }
    output
}

impl OutputSink {
    /// Directory the units land in, if writing to files.
    pub fn package_dir(&self, package: &str) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::Directory(dir) => Some(dir.join(package.to_lowercase())),
        }
    }

    /// Emits one unit. Returns the written path in directory mode.
    pub fn emit(
        &self,
        fs: &dyn FileSystem,
        stdout: &mut dyn Write,
        package: &str,
        unit: &RenderedUnit,
    ) -> Result<Option<PathBuf>> {
        match self.package_dir(package) {
            None => {
                write!(stdout, "{}\n\n{}\n", banner(&unit.code), unit.source)
                    .map_err(GenerateError::Stdout)?;
                Ok(None)
            }
            Some(dir) => {
                let path = dir.join(format!("{}.rs", unit.module));
                write_file(fs, &path, &unit.source)?;
                Ok(Some(path))
            }
        }
    }

    /// Writes the module index in directory mode. Nothing is written when no
    /// unit was emitted.
    ///
    /// Modules already declared by an existing `mod.rs` are kept. The index
    /// is sorted by module name.
    pub fn finish(
        &self,
        fs: &dyn FileSystem,
        package: &str,
        modules: &[String],
    ) -> Result<Option<PathBuf>> {
        let dir = match self.package_dir(package) {
            Some(dir) if !modules.is_empty() => dir,
            _ => return Ok(None),
        };
        let path = dir.join(INDEX_FILE);
        let existing = match fs.read(&path) {
            Ok(bytes) => indexed_modules(&String::from_utf8_lossy(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(GenerateError::IndexRead { path, source }),
        };
        let merged: BTreeSet<String> = existing.into_iter().chain(modules.iter().cloned()).collect();
        let merged: Vec<String> = merged.into_iter().collect();
        write_file(fs, &path, &module_index(&merged))?;
        Ok(Some(path))
    }
}

fn write_file(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<()> {
    fs.write(path, contents.as_bytes())
        .map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })
}
