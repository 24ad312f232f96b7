//! FFmpeg execution adapter
//!
//! Lossless trim and concat through stream copy, transitions through the
//! `xfade` / `acrossfade` filters.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::adapters::command_runner::CommandRunner;
use crate::config::RenderSettings;
use crate::domain::errors::EngineError;
use crate::ports::*;
use crate::utils::time::seconds_arg;

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    runner: CommandRunner,
    render: RenderSettings,
}

/// Small helper for building OsString argument lists
#[derive(Default)]
struct Args(Vec<OsString>);

impl Args {
    fn arg(mut self, value: impl Into<OsString>) -> Self {
        self.0.push(value.into());
        self
    }

    fn path(mut self, value: &Path) -> Self {
        self.0.push(value.as_os_str().to_os_string());
        self
    }

    fn common() -> Self {
        Self::default()
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
    }
}

impl FfmpegAdapter {
    /// Create adapter calling the given `ffmpeg` executable
    pub fn new(ffmpeg: impl Into<PathBuf>, render: RenderSettings) -> Self {
        Self {
            runner: CommandRunner::new(ffmpeg),
            render,
        }
    }

    fn trim_args(job: &TrimJob) -> Vec<OsString> {
        let mut args = Args::common();
        if let Some(start) = &job.start {
            args = args.arg("-ss").arg(start);
        }
        args = args.arg("-i").path(&job.source);
        if let Some(duration) = &job.duration {
            args = args.arg("-t").arg(duration);
        }
        args.arg("-map")
            .arg("0")
            .arg("-c")
            .arg("copy")
            .arg("-avoid_negative_ts")
            .arg("make_zero")
            .path(&job.output)
            .0
    }

    /// `filter_complex` graph blending input 0 into input 1
    fn transition_filter(job: &TransitionJob) -> String {
        let duration = seconds_arg(job.transition.duration_ms);
        let mut video = format!(
            "[0:v][1:v]xfade=transition={}:duration={}:offset=0",
            job.transition.name, duration
        );
        for (key, value) in &job.transition.params {
            video.push_str(&format!(":{}={}", key, value));
        }
        video.push_str(",format=yuv420p[v]");

        if job.with_audio {
            format!("{};[0:a][1:a]acrossfade=d={}[a]", video, duration)
        } else {
            video
        }
    }

    fn render_args(&self, job: &TransitionJob) -> Vec<OsString> {
        let mut args = Args::common()
            .arg("-i")
            .path(&job.from)
            .arg("-i")
            .path(&job.to)
            .arg("-filter_complex")
            .arg(Self::transition_filter(job))
            .arg("-map")
            .arg("[v]");
        if job.with_audio {
            args = args.arg("-map").arg("[a]");
        }
        args = args
            .arg("-c:v")
            .arg(&self.render.video_codec)
            .arg("-preset")
            .arg(&self.render.preset)
            .arg("-crf")
            .arg(self.render.crf.to_string());
        if job.with_audio {
            args = args.arg("-c:a").arg(&self.render.audio_codec);
        }
        args.path(&job.output).0
    }

    fn concat_args(list_path: &Path, output: &Path) -> Vec<OsString> {
        Args::common()
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .path(list_path)
            .arg("-map")
            .arg("0")
            .arg("-c")
            .arg("copy")
            .path(output)
            .0
    }
}

#[async_trait]
impl ExecutePort for FfmpegAdapter {
    async fn trim(&self, job: &TrimJob) -> Result<PathBuf, EngineError> {
        self.runner.run(&Self::trim_args(job)).await?;
        Ok(job.output.clone())
    }

    async fn render_transition(&self, job: &TransitionJob) -> Result<PathBuf, EngineError> {
        self.runner.run(&self.render_args(job)).await?;
        Ok(job.output.clone())
    }

    async fn concat(&self, list_path: &Path, output: &Path) -> Result<PathBuf, EngineError> {
        self.runner.run(&Self::concat_args(list_path, output)).await?;
        Ok(output.to_path_buf())
    }
}
