//! Error types for project description operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PbxError>;

#[derive(Error, Debug)]
pub enum PbxError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Source tree traversal failed
    #[error("directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The directory named after the project does not exist
    #[error("source root does not exist: {}", .0.display())]
    SourceRootNotFound(PathBuf),

    /// Malformed property-list text
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("object {object} has no `{key}` entry")]
    MissingKey { object: String, key: String },

    #[error("object {0} has no isa")]
    MissingIsa(String),

    #[error("identifier {0} is already used in this project")]
    DuplicateIdentifier(String),

    /// A reference points at an object that is not in the document
    #[error("{from}.{key} references missing object {target}")]
    DanglingReference {
        from: String,
        key: String,
        target: String,
    },

    #[error("object {object} has unexpected `{key}` value (expected {expected})")]
    UnexpectedValue {
        object: String,
        key: String,
        expected: &'static str,
    },

    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("project declares no targets")]
    NoTargets,

    #[error("target {target} has no {phase} build phase")]
    MissingBuildPhase { target: String, phase: &'static str },

    /// No group matched a patch anchor
    #[error("no group matches anchor `{anchor}`")]
    GroupNotFound { anchor: String },

    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Atomic rename of a written artifact failed
    #[error("failed to persist {}: {}", .path.display(), .source)]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PbxError {
    pub(crate) fn missing_key(object: &impl ToString, key: &str) -> Self {
        Self::MissingKey {
            object: object.to_string(),
            key: key.to_string(),
        }
    }
}
