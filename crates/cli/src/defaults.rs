//! Shared default values for the command-line front end.

/// Characters per FASTA sequence line.
pub const LINE_WIDTH: usize = 60;

/// Log filter when neither `--quiet` nor `RUST_LOG` is given.
pub const LOG_FILTER: &str = "info";

/// Log filter with `--quiet`.
pub const QUIET_LOG_FILTER: &str = "warn";

/// Name prefix of internal nodes without a label.
pub const UNNAMED_NODE_PREFIX: &str = "node";
