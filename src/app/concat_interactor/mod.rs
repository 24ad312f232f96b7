// Concat interactor - Orchestrates resolve, plan, trim, render and concat

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::app::fanout::run_indexed;
use crate::app::render_interactor::render_and_reassemble;
use crate::app::resolve_interactor::ClipResolver;
use crate::config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{expected_output_duration_ms, SegmentationPlanner};
use crate::output::{ConcatExecutor, ConcatReport};
use crate::ports::*;
use crate::utils::path::{absolute, FragmentNaming};
use crate::utils::time::format_ms;

/// Request to join clips into one file
#[derive(Debug, Clone)]
pub struct ConcatRequest {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub transitions: TransitionSpec,
}

impl ConcatRequest {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>, transitions: TransitionSpec) -> Self {
        Self {
            inputs,
            output: output.into(),
            transitions,
        }
    }
}

/// Knobs of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_concurrency: usize,
    pub work_dir: Option<PathBuf>,
    pub keep_fragments: bool,
    pub overwrite: bool,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            work_dir: config.work_dir.clone(),
            keep_fragments: config.keep_fragments,
            overwrite: config.overwrite,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Where fragments live for the duration of a run
enum WorkDir {
    /// User-chosen directory; only files we wrote are removed
    Fixed(PathBuf),
    /// Private temporary directory
    Temp(TempDir),
}

impl WorkDir {
    fn create(configured: Option<&Path>) -> Result<Self, DomainError> {
        match configured {
            Some(dir) => {
                let dir = absolute(dir)?;
                std::fs::create_dir_all(&dir)?;
                Ok(WorkDir::Fixed(dir))
            }
            None => Ok(WorkDir::Temp(
                tempfile::Builder::new().prefix("concatx-").tempdir()?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            WorkDir::Fixed(dir) => dir,
            WorkDir::Temp(dir) => dir.path(),
        }
    }

    /// Remove what the run produced, or leave everything for inspection
    fn finish(self, produced: &[PathBuf], keep: bool) {
        match (self, keep) {
            (WorkDir::Temp(dir), true) => {
                let kept = dir.into_path();
                info!("Keeping fragments in {}", kept.display());
            }
            (WorkDir::Temp(dir), false) => {
                if let Err(e) = dir.close() {
                    warn!("Failed to remove work directory: {}", e);
                }
            }
            (WorkDir::Fixed(dir), true) => {
                info!("Keeping fragments in {}", dir.display());
            }
            (WorkDir::Fixed(_), false) => {
                for path in produced {
                    match std::fs::remove_file(path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
                    }
                }
            }
        }
    }
}

/// Interactor for joining clips with transitions
pub struct ConcatInteractor {
    resolver: ClipResolver,
    execute_port: Arc<dyn ExecutePort>,
    concat_executor: ConcatExecutor,
    settings: PipelineSettings,
}

impl ConcatInteractor {
    /// Create new concat interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            resolver: ClipResolver::new(probe_port),
            concat_executor: ConcatExecutor::new(Arc::clone(&execute_port)),
            execute_port,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Resolve and plan without writing anything
    ///
    /// Fragment paths are rooted at the configured work directory, or at a
    /// `<work-dir>` placeholder when none is configured.
    pub async fn plan(
        &self,
        inputs: &[PathBuf],
        transitions: &TransitionSpec,
    ) -> Result<(Vec<Clip>, FragmentPlan), DomainError> {
        let clips = self
            .resolver
            .resolve_all(inputs, self.settings.max_concurrency)
            .await?;
        let work_dir = self
            .settings
            .work_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("<work-dir>"));
        let plan = SegmentationPlanner::new(work_dir).plan(&clips, transitions)?;
        Ok((clips, plan))
    }

    /// Resolve every input without planning
    pub async fn probe(&self, inputs: &[PathBuf]) -> Result<Vec<Clip>, DomainError> {
        self.resolver
            .resolve_all(inputs, self.settings.max_concurrency)
            .await
    }

    /// Run the whole pipeline and return a report for the joined file
    #[instrument(skip(self, request), fields(clips = request.inputs.len()))]
    pub async fn execute(&self, request: ConcatRequest) -> Result<ConcatReport, DomainError> {
        let started_at = Utc::now();
        let output = absolute(&request.output)?;

        if !self.settings.overwrite && tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(DomainError::OutputExists(output));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("Joining {} clips into {}", request.inputs.len(), output.display());

        let clips = self
            .resolver
            .resolve_all(&request.inputs, self.settings.max_concurrency)
            .await?;

        let work_dir = WorkDir::create(self.settings.work_dir.as_deref())?;
        let planner = SegmentationPlanner::new(work_dir.path());
        let plan = match planner.plan(&clips, &request.transitions) {
            Ok(plan) => plan,
            Err(e) => {
                work_dir.finish(&[], self.settings.keep_fragments);
                return Err(e);
            }
        };
        let list_path = FragmentNaming::new(work_dir.path()).concat_list();
        let produced = Self::produced_files(&plan, &list_path);

        let result = self.run_plan(&clips, &plan, &list_path, &output).await;
        work_dir.finish(&produced, self.settings.keep_fragments);
        let fragment_count = result?;

        let report = ConcatReport {
            output_path: output,
            clip_count: clips.len(),
            fragment_count,
            transition_count: plan.transition_pairs.len(),
            total_duration_ms: expected_output_duration_ms(&plan, &clips),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Finished {} in {} ms",
            report.output_path.display(),
            report.elapsed().num_milliseconds()
        );
        Ok(report)
    }

    /// Trim, render and concat; returns how many files went into the concat
    async fn run_plan(
        &self,
        clips: &[Clip],
        plan: &FragmentPlan,
        list_path: &Path,
        output: &Path,
    ) -> Result<usize, DomainError> {
        self.trim_fragments(plan).await?;

        let ordered = render_and_reassemble(plan, self.settings.max_concurrency, |pair| {
            let execute_port = Arc::clone(&self.execute_port);
            let job = Self::transition_job(clips, pair);
            async move { execute_port.render_transition(&job).await }
        })
        .await?;

        self.concat_executor
            .concat(&ordered, list_path, output)
            .await?;
        Ok(ordered.len())
    }

    /// Losslessly cut every planned fragment out of its source clip
    #[instrument(skip(self, plan))]
    async fn trim_fragments(&self, plan: &FragmentPlan) -> Result<(), DomainError> {
        let jobs = plan
            .trim_fragments()
            .into_iter()
            .map(|fragment| Ok((fragment.clone(), Self::trim_job(fragment)?)))
            .collect::<Result<Vec<(Fragment, TrimJob)>, DomainError>>()?;
        let count = jobs.len();
        let kinds: Vec<(usize, FragmentKind)> = jobs
            .iter()
            .map(|(fragment, _)| (fragment.source_clip_index, fragment.kind))
            .collect();

        run_indexed(
            jobs,
            self.settings.max_concurrency,
            |_, (fragment, job)| {
                let execute_port = Arc::clone(&self.execute_port);
                async move {
                    execute_port
                        .trim(&job)
                        .await
                        .map_err(|source| DomainError::FragmentTrim {
                            clip_index: fragment.source_clip_index,
                            kind: fragment.kind,
                            source,
                        })
                }
            },
            |index, join_error| {
                let (clip_index, kind) = kinds
                    .get(index)
                    .copied()
                    .unwrap_or((index, FragmentKind::Base));
                DomainError::FragmentTrim {
                    clip_index,
                    kind,
                    source: EngineError::Aborted(join_error.to_string()),
                }
            },
        )
        .await?;

        info!("Trimmed {} fragments", count);
        Ok(())
    }

    fn trim_job(fragment: &Fragment) -> Result<TrimJob, DomainError> {
        let job = TrimJob {
            source: fragment.source_path.clone(),
            start: fragment.start_ms.map(format_ms).transpose()?,
            duration: fragment.trim_length_ms().map(format_ms).transpose()?,
            output: fragment.output_path.clone(),
        };
        debug!(
            clip = fragment.source_clip_index,
            kind = %fragment.kind,
            start = ?job.start,
            duration = ?job.duration,
            "Planned trim"
        );
        Ok(job)
    }

    fn transition_job(clips: &[Clip], pair: TransitionPair) -> TransitionJob {
        let with_audio = [pair.end.source_clip_index, pair.begin.source_clip_index]
            .iter()
            .all(|&index| clips.get(index).map(|clip| clip.has_audio).unwrap_or(false));

        TransitionJob {
            boundary: pair.boundary,
            from: pair.end.output_path,
            to: pair.begin.output_path,
            transition: pair.transition,
            with_audio,
            output: pair.output_path,
        }
    }

    /// Every file a run may leave in the work directory
    fn produced_files(plan: &FragmentPlan, list_path: &Path) -> Vec<PathBuf> {
        let mut produced: Vec<PathBuf> = plan
            .trim_fragments()
            .into_iter()
            .map(|fragment| fragment.output_path.clone())
            .collect();
        produced.extend(plan.transition_pairs.iter().map(|pair| pair.output_path.clone()));
        produced.push(list_path.to_path_buf());
        produced.push(list_path.with_extension("txt.tmp"));
        produced
    }
}
