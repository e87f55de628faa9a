//! Error types for the edges of the simulation
//!
//! The per-tick core never fails: misses are empty hit sets and releases of
//! unknown objects are no-ops. Only asset loading and configuration can fail,
//! and both happen before the first tick.

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Mesh name or file is not known to the library
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Mesh data is unusable (degenerate or empty)
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Mesh file could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
