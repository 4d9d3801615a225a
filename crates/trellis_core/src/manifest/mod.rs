//! Plugin manifest model.
//!
//! # Responsibility
//! - Parse `*.plugin` descriptors into validated [`PluginInfo`] records.
//! - Discover descriptors across module directories.
//!
//! # Invariants
//! - A failed parse never yields a partial record.
//! - One bad descriptor produces one error; it never aborts discovery of
//!   the others.

use std::path::PathBuf;
use thiserror::Error;

pub mod discovery;
pub mod info;
pub mod keyfile;
pub mod parser;

pub use discovery::{discover, DiscoveryReport};
pub use info::{ActiveInstance, PluginInfo, SharedInstance, SharedPluginInfo};
pub use parser::{parse, parse_contents, parse_with_config};

pub type ManifestResult<T> = Result<T, ManifestError>;

/// Descriptor parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// File unreadable or not in group-file syntax.
    #[error("malformed plugin descriptor {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    /// A required key is absent or empty.
    #[error("plugin descriptor {} is missing `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },
    /// Parser called with an empty file path or application name.
    #[error("invalid parse argument: {0}")]
    InvalidArgument(&'static str),
}

impl ManifestError {
    /// Name of the missing field, for `MissingField` errors.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } => Some(field),
            _ => None,
        }
    }
}
