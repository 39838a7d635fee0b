//! crates/ld_io/src/lib.rs
//! I/O crate for the draw engine.
//!
//! - `entries`: import eligible entries from spreadsheet-style JSON rows.
//! - `config`: the draw configuration file (`DrawConfig`) and its validation.
//! - `fingerprint`: SHA-256 digests of the entry list and of the results.
//! - `output`: atomic file writes for exported results.
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

use ld_core::{CoreError, DrawError};

/// Unified error for ld_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax or shape errors, with the parser's location.
    #[error("json error at {at}: {msg}")]
    Json { at: String, msg: String },

    /// Configuration values rejected by domain validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),

    /// Entries rejected while building the pool.
    #[error("invalid entries: {0}")]
    Entries(#[from] DrawError),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json {
            at: format!("line {}, column {}", e.line(), e.column()),
            msg: e.to_string(),
        }
    }
}

pub mod config;
pub mod entries;
pub mod fingerprint;
pub mod output;

pub use config::{load_config, parse_config, DrawConfig, TierConfig, TimingConfig};
pub use entries::{import_rows, load_entries, parse_entries, ImportReport};
pub use fingerprint::{entries_sha256, sha256_hex, winners_sha256};
pub use output::write_atomic;

pub mod prelude {
    pub use crate::{IoError, IoResult};
    pub use crate::{config, entries, fingerprint, output};
    pub use crate::{load_config, load_entries, write_atomic, DrawConfig, ImportReport};
}
