use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, FfprobeAdapter};
use crate::app::concat_interactor::{ConcatInteractor, PipelineSettings};
use crate::config::AppConfig;
use crate::ports::{ExecutePort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn concat_interactor(&self) -> Arc<ConcatInteractor>;
}

pub struct DefaultAppContainer {
    concat_interactor: Arc<ConcatInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffprobe and ffmpeg adapters named in `config`
    pub fn new(config: &AppConfig) -> Self {
        let probe_port = Arc::new(FfprobeAdapter::new(&config.ffprobe_path));
        let execute_port = Arc::new(FfmpegAdapter::new(
            &config.ffmpeg_path,
            config.render.clone(),
        ));

        Self::with_ports(probe_port, execute_port, PipelineSettings::from(config))
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        settings: PipelineSettings,
    ) -> Self {
        let concat_interactor = Arc::new(ConcatInteractor::new(
            probe_port,
            execute_port,
            settings,
        ));

        Self { concat_interactor }
    }
}

impl AppContainer for DefaultAppContainer {
    fn concat_interactor(&self) -> Arc<ConcatInteractor> {
        Arc::clone(&self.concat_interactor)
    }
}
