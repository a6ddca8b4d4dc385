//! richerror-gen - error catalog generator
//!
//! Turns a JSON error catalog into Rust constructors and predicates built on
//! the richerror crate.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use richerror::{LogConfig, init_logging};
use richerror_gen::template::{DEFAULT_CRATE_PATH, DEFAULT_PACKAGE};
use richerror_gen::{Generator, LocalFs, OutputSink, RustTemplate, TagFilter, catalog_schema};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "richerror-gen")]
#[command(author, version, about = "Generates richerror constructors from an error catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write JSON logs to a daily file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate error constructors and code constants
    Generate {
        /// Path to the errors definition file
        #[arg(
            short = 'i',
            long = "input",
            visible_alias = "errors-definition-file",
            env = "RICHERROR_GEN_INPUT"
        )]
        input: PathBuf,

        /// Output directory, or "stdout" to print the generated code
        #[arg(
            short = 'o',
            long = "out-dir",
            default_value = ".",
            env = "RICHERROR_GEN_OUT_DIR"
        )]
        out_dir: String,

        /// Module the generated files are placed in
        #[arg(
            short = 'e',
            long = "package",
            visible_alias = "output-error-pkg",
            default_value = DEFAULT_PACKAGE,
            env = "RICHERROR_GEN_PACKAGE"
        )]
        package: String,

        /// Only generate entries with one of these comma-separated tags.
        /// Takes precedence over --exclude-tags.
        #[arg(short = 't', long = "include-tags")]
        include_tags: Option<String>,

        /// Skip entries with any of these comma-separated tags
        #[arg(short = 'x', long = "exclude-tags")]
        exclude_tags: Option<String>,

        /// Path the generated code imports richerror from
        #[arg(long, default_value = DEFAULT_CRATE_PATH, env = "RICHERROR_GEN_CRATE_PATH")]
        crate_path: String,
    },

    /// Print the JSON Schema of the catalog file
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("info").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    if let Some(dir) = cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    let _logging_guards = init_logging(&log_config)?;

    match cli.command {
        Commands::Generate {
            input,
            out_dir,
            package,
            include_tags,
            exclude_tags,
            crate_path,
        } => {
            let sink: OutputSink = out_dir.parse()?;
            let filter = TagFilter::from_flags(include_tags.as_deref(), exclude_tags.as_deref());
            eprintln!("Generating {}", filter.describe());

            let template = RustTemplate::new()
                .with_crate_path(crate_path)
                .with_package(package);
            debug!(
                crate_path = template.crate_path(),
                package = template.package(),
                "rendering with template"
            );
            let generator = Generator::new(&LocalFs, sink)?
                .with_filter(filter)
                .with_template(template);

            let mut stdout = std::io::stdout().lock();
            let report = generator
                .run(&input, &mut stdout)
                .with_context(|| format!("failed to generate errors from {}", input.display()))?;
            stdout.flush()?;

            for skipped in &report.skipped {
                eprintln!("  skipped {}: {}", skipped.code, skipped.error);
            }
            for file in &report.files {
                debug!(path = %file.display(), "wrote file");
            }
            eprintln!("{}", report.summary());
            if let Some(error) = report.index_error {
                return Err(anyhow::Error::new(error).context("module index was not updated"));
            }
            Ok(())
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&catalog_schema())?);
            Ok(())
        }
    }
}
