//! FFprobe adapter for media file probing
//!
//! Opens a clip with `ffprobe` and reads its container duration and stream types.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapters::command_runner::CommandRunner;
use crate::domain::errors::EngineError;
use crate::ports::{ProbePort, ProbeReport};
use crate::utils::time::millis_from_seconds;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    runner: CommandRunner,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

impl FfprobeAdapter {
    /// Create adapter calling the given `ffprobe` executable
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            runner: CommandRunner::new(ffprobe),
        }
    }

    fn args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type",
            "-of",
            "json",
        ]
        .iter()
        .map(|arg| OsString::from(*arg))
        .collect();
        args.push(path.as_os_str().to_os_string());
        args
    }

    /// Turn ffprobe's JSON into a report
    fn parse(stdout: &str) -> Result<ProbeReport, EngineError> {
        let output: FfprobeOutput = serde_json::from_str(stdout)
            .map_err(|e| EngineError::Output(format!("ffprobe JSON: {}", e)))?;

        let duration = output
            .format
            .and_then(|format| format.duration)
            .ok_or_else(|| EngineError::Output("ffprobe reported no duration".to_string()))?;
        let seconds = duration.trim().parse::<f64>().map_err(|_| {
            EngineError::Output(format!("ffprobe duration '{}' is not a number", duration))
        })?;
        let duration_ms =
            millis_from_seconds(seconds).map_err(|e| EngineError::Output(e.to_string()))?;

        let has_audio = output
            .streams
            .iter()
            .any(|stream| stream.codec_type.as_deref() == Some("audio"));

        Ok(ProbeReport {
            duration_ms,
            has_audio,
        })
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, EngineError> {
        let output = self.runner.run(&Self::args(path)).await?;
        Self::parse(&output.stdout)
    }
}
