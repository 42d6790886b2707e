//! Core types, configuration, and error handling for snapstat.
//!
//! This crate provides the shared foundation used by the other snapstat crates:
//! - [`SnapstatError`]: unified error type using `thiserror` and `miette`
//! - [`SnapstatConfig`]: configuration loaded from `.snapstat.toml`
//! - Shared types: [`Metric`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{BenchConfig, DiffConfig, DirsConfig, SnapstatConfig};
pub use error::SnapstatError;
pub use types::{format_float, Metric, OutputFormat, NOT_APPLICABLE};

/// A convenience `Result` type for snapstat operations.
pub type Result<T> = std::result::Result<T, SnapstatError>;
