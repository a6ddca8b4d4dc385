//! Structured test logging for CI debugging.
//!
//! Call `init_test_logging()` once per test binary, typically from a
//! constructor:
//!
//! ```ignore
//! #[ctor::ctor]
//! fn setup() {
//!     richerror::testing::init_test_logging();
//! }
//! ```
//!
//! Events go to the libtest writer in compact form and, as JSON lines, to
//! `target/test-logs/richerror_tests.jsonl`.
//!
//! # Environment Variables
//!
//! - `RICHERROR_TEST_LOG_FILE`: override the JSONL path
//! - `RICHERROR_TEST_LOG_LEVEL`: level filter (default: `info`)

use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

static TEST_LOGGING_INIT: Once = Once::new();

/// Installs the test subscriber. Safe to call any number of times.
pub fn init_test_logging() {
    TEST_LOGGING_INIT.call_once(|| {
        let file_layer = create_log_file().map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
        });

        let test_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_level(true)
            .compact();

        let level =
            std::env::var("RICHERROR_TEST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let filter = tracing_subscriber::EnvFilter::try_new(format!(
            "richerror={level},richerror_gen={level}"
        ))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(test_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn create_log_file() -> Option<std::fs::File> {
    if let Ok(custom_path) = std::env::var("RICHERROR_TEST_LOG_FILE") {
        if let Some(parent) = PathBuf::from(&custom_path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        return std::fs::File::create(&custom_path).ok();
    }

    let log_dir = find_target_dir().join("test-logs");
    let _ = std::fs::create_dir_all(&log_dir);
    std::fs::File::create(log_dir.join("richerror_tests.jsonl")).ok()
}

/// Find the target directory by searching up from current dir.
fn find_target_dir() -> PathBuf {
    if let Ok(target_dir) = std::env::var("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir);
    }

    let mut cwd = std::env::current_dir().unwrap_or_default();
    loop {
        let target = cwd.join("target");
        if target.is_dir() {
            return target;
        }
        if !cwd.pop() {
            return PathBuf::from("target");
        }
    }
}
