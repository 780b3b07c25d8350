//! ClassDesk Common Library
//!
//! Shared code for the ClassDesk services including:
//! - Document models and the `DocumentStore` abstraction
//! - Error types and handling
//! - Configuration management
//! - Password hashing
//! - Metrics and observability
//! - Reporting computations (averages, attendance percentages)

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod reporting;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{DocumentStore, MemoryStore, MongoStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Attendance percentage below which a day or student is flagged
pub const ATTENDANCE_THRESHOLD_PERCENT: f64 = 75.0;

/// Generate a new document id
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
