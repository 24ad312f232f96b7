// Adapters - External system implementations

pub mod command_runner;
pub mod exec_ffmpeg;
pub mod probe_ffprobe;

// Re-export adapters
pub use command_runner::CommandRunner;
pub use exec_ffmpeg::FfmpegAdapter;
pub use probe_ffprobe::FfprobeAdapter;
