//! Storage layer: DuckDB tables for surveys, questions, options, segments and results.

mod error;
pub use error::StoreError;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
