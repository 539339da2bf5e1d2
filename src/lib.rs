//! Track popularity analytics over a read-only SQLite dataset.
//!
//! This library exposes the internal modules for the binaries and for testing.

pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod filter;
pub mod scoring;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use dashboard::{compute, ComputeOptions, DashboardOutcome, DashboardReport};
pub use dataset::{DatasetError, DatasetStore};
pub use filter::{compile, CompiledPredicate, FilterOptions, FilterSpec};
pub use server::{run_server, RequestsLoggingLevel};
