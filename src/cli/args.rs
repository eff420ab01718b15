//! CLI argument definitions using clap
//!
//! Commands:
//! - autodiag serve [--config <path>] [--port <port>]
//! - autodiag check-catalog [--catalog <path>]
//! - autodiag export-catalog [--catalog <path>]
//! - autodiag interview --category <category> [--config <path>]
//! - autodiag pipe [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// autodiag - deterministic vehicle-fault self-diagnosis
#[derive(Parser, Debug)]
#[command(name = "autodiag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Path to configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a catalog file (or the built-in catalog) and exit
    CheckCatalog {
        /// JSON catalog to validate instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print a catalog as JSON
    ExportCatalog {
        /// JSON catalog to re-export instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Answer questions interactively on the terminal
    Interview {
        /// Symptom category (engine, brakes, electrical, suspension, climate)
        #[arg(long)]
        category: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// JSON-lines request/response loop over stdin/stdout
    Pipe {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["autodiag", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert!(config.is_none());
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_interview_requires_category() {
        assert!(Cli::try_parse_from(["autodiag", "interview"]).is_err());
        assert!(Cli::try_parse_from(["autodiag", "interview", "--category", "brakes"]).is_ok());
    }
}
