use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pbxforge_core::PbxError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to parse config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("{tool} could not be started: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{} already exists; refusing to overwrite it", .0.display())]
    SpecFileExists(PathBuf),

    #[error("every generation strategy failed: {}", .0.join("; "))]
    AllStrategiesFailed(Vec<String>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
