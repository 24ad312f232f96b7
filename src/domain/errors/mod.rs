// Domain errors - Error types for the domain layer

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::FragmentKind;

/// Failure reported by the external media engine (ffmpeg / ffprobe)
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited unsuccessfully
    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The engine produced output we could not interpret
    #[error("unexpected engine output: {0}")]
    Output(String),

    /// Task was cancelled or panicked before the engine call completed
    #[error("engine task aborted: {0}")]
    Aborted(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Duration is negative, non-finite or otherwise unusable
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Input clip does not exist on disk
    #[error("Clip {index} not found: {}", .path.display())]
    ClipNotFound { index: usize, path: PathBuf },

    /// Media engine could not open or probe a clip
    #[error("Failed to probe clip {index} ({}): {source}", .path.display())]
    ClipProbe {
        index: usize,
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    /// Adjacent transitions consume the whole clip
    #[error(
        "Transition too long for clip {clip_index}: clip lasts {duration_ms} ms \
         but adjacent transitions consume {consumed_ms} ms"
    )]
    TransitionTooLong {
        clip_index: usize,
        duration_ms: u64,
        consumed_ms: u64,
    },

    /// Rendering the transition at a boundary failed
    #[error("Failed to render transition at boundary {boundary}: {source}")]
    RenderFailure {
        boundary: usize,
        #[source]
        source: EngineError,
    },

    /// Final lossless concat failed
    #[error("Concat of {} failed: {source}", .output.display())]
    ConcatExecution {
        output: PathBuf,
        #[source]
        source: EngineError,
    },

    /// No clips were supplied
    #[error("At least one clip is required")]
    NoClips,

    /// Transition list does not match the clip boundaries
    #[error("Invalid transition specification: {0}")]
    InvalidTransitionSpec(String),

    /// A fragment would copy its whole source or has an empty range
    #[error("Invalid {kind} fragment for clip {clip_index}: {reason}")]
    InvalidFragment {
        clip_index: usize,
        kind: FragmentKind,
        reason: String,
    },

    /// Lossless trim of a fragment failed
    #[error("Failed to trim {kind} fragment of clip {clip_index}: {source}")]
    FragmentTrim {
        clip_index: usize,
        kind: FragmentKind,
        #[source]
        source: EngineError,
    },

    /// Output exists and overwriting was not allowed
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error in the work directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for domain operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;
