//! # HTTP Server Module
//!
//! JSON API over the diagnosis service.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /diagnose/category` - Start or restart an interview
//! - `POST /diagnose/answer` - Submit a fixed option value
//! - `POST /diagnose/answer-text` - Submit free text
//! - `GET /diagnose/session/:id` - Progress snapshot
//! - `GET /observability/metrics` - Diagnosis counters

pub mod config;
pub mod diagnose_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use diagnose_routes::{DiagnoseState, ErrorResponse, SharedStore};
pub use server::HttpServer;
