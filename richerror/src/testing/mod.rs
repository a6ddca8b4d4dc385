//! Test support shared by the workspace's test suites.

pub mod log;

pub use log::init_test_logging;
