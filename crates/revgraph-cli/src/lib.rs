//! Revgraph CLI library.
//!
//! Wires the extraction and graph crates into pipeline stages (ingest, load,
//! reload, upload), dispatches interactive commands to them, and owns process
//! concerns: logging setup and exit codes.

pub mod commands;
pub mod exit;
pub mod logging;
pub mod pipeline;

pub use commands::{Command, CommandReport, Dispatcher, Status};
pub use exit::exit_code;
pub use logging::init_tracing;
pub use pipeline::ReviewPipeline;
