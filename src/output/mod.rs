//! Concat execution and run reporting

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DomainError;
use crate::ports::ExecutePort;
use crate::utils::path::partial_path;

pub mod writer;

/// Writes the concat list and runs the engine's lossless concat
pub struct ConcatExecutor {
    execute_port: Arc<dyn ExecutePort>,
}

impl ConcatExecutor {
    pub fn new(execute_port: Arc<dyn ExecutePort>) -> Self {
        Self { execute_port }
    }

    /// Join `ordered_paths` into `output`, listing them in `list_path` first.
    ///
    /// Paths are written exactly in the given order; nothing is reordered or
    /// repaired when the engine fails. The engine writes to a sibling partial
    /// file, which replaces `output` only after a successful concat.
    #[instrument(skip(self, ordered_paths), fields(entries = ordered_paths.len()))]
    pub async fn concat(
        &self,
        ordered_paths: &[PathBuf],
        list_path: &Path,
        output: &Path,
    ) -> Result<PathBuf, DomainError> {
        writer::write_concat_list(list_path, ordered_paths)?;

        let staging = partial_path(output);
        if let Err(source) = self.execute_port.concat(list_path, &staging).await {
            discard(&staging).await;
            return Err(DomainError::ConcatExecution {
                output: output.to_path_buf(),
                source,
            });
        }

        if let Err(e) = tokio::fs::rename(&staging, output).await {
            discard(&staging).await;
            return Err(DomainError::Io(e));
        }

        info!("Joined {} fragments into {}", ordered_paths.len(), output.display());
        Ok(output.to_path_buf())
    }
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {}: {}", path.display(), e),
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct ConcatReport {
    pub output_path: PathBuf,
    pub clip_count: usize,
    /// Files handed to the final concat
    pub fragment_count: usize,
    pub transition_count: usize,
    /// Expected length of the joined output
    pub total_duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConcatReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
