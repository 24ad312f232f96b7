// Ports - Interface definitions for the external media engine

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::EngineError;
use crate::domain::model::Transition;

/// What the engine reports about an opened clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub duration_ms: u64,
    pub has_audio: bool,
}

/// Port for opening and probing media files
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Open the media at `path` and report its duration
    async fn probe(&self, path: &Path) -> Result<ProbeReport, EngineError>;
}

/// Lossless range extraction from one source file
#[derive(Debug, Clone, PartialEq)]
pub struct TrimJob {
    pub source: PathBuf,
    /// `HH:MM:SS.mmm`; `None` starts at 0
    pub start: Option<String>,
    /// `HH:MM:SS.mmm` length; `None` runs to the end of the source
    pub duration: Option<String>,
    pub output: PathBuf,
}

/// Two boundary fragments to blend into one transition clip
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionJob {
    pub boundary: usize,
    /// Tail of the left clip
    pub from: PathBuf,
    /// Head of the right clip
    pub to: PathBuf,
    pub transition: Transition,
    /// Both sources carry audio that should be cross-faded
    pub with_audio: bool,
    pub output: PathBuf,
}

/// Port for engine operations that write media files
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Copy a time range of a file without re-encoding
    async fn trim(&self, job: &TrimJob) -> Result<PathBuf, EngineError>;

    /// Render the transition effect between two fragments
    async fn render_transition(&self, job: &TransitionJob) -> Result<PathBuf, EngineError>;

    /// Join the files named in a concat-list file without re-encoding
    async fn concat(&self, list_path: &Path, output: &Path) -> Result<PathBuf, EngineError>;
}
