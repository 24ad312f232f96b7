//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::errors::DomainError;
use crate::domain::model::{Transition, TransitionSpec};

/// Transition options shared by `join` and `plan`
#[derive(Args, Debug, Clone, Default)]
pub struct TransitionArgs {
    /// Transition at every boundary, as name:duration_ms[:key=value...]
    #[arg(short, long)]
    pub transition: Option<String>,

    /// One transition per boundary, comma separated
    #[arg(long, value_delimiter = ',')]
    pub transitions: Vec<String>,
}

impl TransitionArgs {
    /// Build the transition spec; `fallback` applies when `--transition` is absent
    pub fn to_spec(&self, fallback: Option<Transition>) -> Result<TransitionSpec, DomainError> {
        let global = match &self.transition {
            Some(spec) => Some(Transition::parse(spec)?),
            None => fallback,
        };
        let per_boundary = self
            .transitions
            .iter()
            .map(|spec| Transition::parse(spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransitionSpec::per_boundary(per_boundary).with_global(global))
    }
}

/// Arguments for the join command
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Input clips in playback order (repeat for each clip)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub transitions: TransitionArgs,

    /// Directory for intermediate fragments (default: a temporary directory)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Keep fragments and the concat list after the run
    #[arg(long)]
    pub keep_fragments: bool,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input clips in playback order (repeat for each clip)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub transitions: TransitionArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input clips (repeat for each clip)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
