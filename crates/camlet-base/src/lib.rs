//! Shared plumbing for the camlet crates.

pub mod logging;

pub use logging::{
    FileLogger, StdoutLogger, init_file_logger, init_stdout_logger, max_level, parse_level,
};

// Re-export log crate so downstream crates can use camlet_base::log::*
pub use log;
