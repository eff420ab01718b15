//! CLI module
//!
//! - serve: HTTP API
//! - check-catalog / export-catalog: catalog tooling
//! - interview: terminal interview
//! - pipe: JSON-lines loop over stdin/stdout

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check_catalog, check_catalog_to, export_catalog, export_catalog_to, interview, interview_with,
    pipe, pipe_with, run, run_command, serve, PipeRequest,
};
pub use config::{load_catalog, AppConfig, StoreKind};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_json, write_response};
