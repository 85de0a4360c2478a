//! Error types for mavt-core.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Custom error types for mavt
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("executable not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("failed to start {tool}: {source}")]
    CommandStart {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {message}")]
    CommandFailed {
        tool: String,
        status: ExitStatus,
        message: String,
    },

    #[error("no video stream found in the input")]
    NoVideoStream,

    #[error("malformed avg_frame_rate: {value}")]
    MalformedFrameRate { value: String },

    #[error("unparseable key frame row: {line}")]
    KeyFrameParse { line: String },

    #[error("unparseable blackframe report: {line}")]
    BlackframeParse { line: String },

    #[error("no input found: {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("invalid {what} expression: {value} (must not contain ',')")]
    InvalidFilterExpr { what: &'static str, value: String },

    #[error("unsupported time syntax: {value}")]
    InvalidTimeCode { value: String },

    #[error("failed to parse ffprobe output: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mavt operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
