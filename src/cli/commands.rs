//! Command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::{AppContainer, ConcatRequest};
use crate::cli::args::{JoinArgs, PlanArgs, ProbeArgs};
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::domain::model::{Clip, Fragment, FragmentPlan};
use crate::domain::rules::expected_output_duration_ms;
use crate::utils::format_duration_ms;
use crate::utils::logging::LogLevel;

/// Fold command-line flags into the loaded configuration
pub fn apply_overrides(config: &mut AppConfig, cli: &Cli) -> Result<()> {
    if let Some(level) = &cli.log_level {
        config.log_level = LogLevel::parse(level)
            .with_context(|| format!("Invalid log level '{}'", level))?;
    }
    if let Some(limit) = cli.max_concurrency {
        config.max_concurrency = limit;
    }

    if let Commands::Join(args) = &cli.command {
        if args.work_dir.is_some() {
            config.work_dir = args.work_dir.clone();
        }
        config.keep_fragments |= args.keep_fragments;
        config.overwrite |= args.overwrite;
    }

    config.validate().context("Invalid configuration")?;
    Ok(())
}

/// Execute the join command
pub async fn join(container: &dyn AppContainer, config: &AppConfig, args: JoinArgs) -> Result<()> {
    let transitions = args
        .transitions
        .to_spec(config.transition.clone())
        .context("Invalid transition arguments")?;

    let request = ConcatRequest::new(args.inputs, &args.output, transitions);
    let report = container
        .concat_interactor()
        .execute(request)
        .await
        .with_context(|| format!("Failed to join clips into {}", args.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Output:      {}", report.output_path.display());
        println!("Clips:       {}", report.clip_count);
        println!("Transitions: {}", report.transition_count);
        println!("Fragments:   {}", report.fragment_count);
        println!("Duration:    {}", format_duration_ms(report.total_duration_ms));
        println!(
            "Elapsed:     {}",
            format_duration_ms(report.elapsed().num_milliseconds().max(0) as u64)
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct PlanView<'a> {
    clips: &'a [Clip],
    plan: &'a FragmentPlan,
    concat_order: Vec<std::path::PathBuf>,
    expected_duration_ms: u64,
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, config: &AppConfig, args: PlanArgs) -> Result<()> {
    let transitions = args
        .transitions
        .to_spec(config.transition.clone())
        .context("Invalid transition arguments")?;

    let (clips, plan) = container
        .concat_interactor()
        .plan(&args.inputs, &transitions)
        .await
        .context("Failed to plan fragments")?;
    let expected_duration_ms = expected_output_duration_ms(&plan, &clips);

    if args.json {
        let view = PlanView {
            clips: &clips,
            plan: &plan,
            concat_order: plan.concat_order(),
            expected_duration_ms,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    for (clip, base) in clips.iter().zip(&plan.base_fragments) {
        println!(
            "clip {:>3}  {:>12}  base {}  {}",
            clip.index,
            format_duration_ms(clip.duration_ms),
            describe_range(base, clip.duration_ms),
            clip.path.display()
        );
    }
    for pair in &plan.transition_pairs {
        println!(
            "boundary {:>3}  {}  clip {} tail -> clip {} head  {}",
            pair.boundary,
            pair.transition,
            pair.end.source_clip_index,
            pair.begin.source_clip_index,
            pair.output_path.display()
        );
    }
    println!("expected duration {}", format_duration_ms(expected_duration_ms));

    info!("Planned {} fragments", plan.trim_fragments().len());
    Ok(())
}

fn describe_range(fragment: &Fragment, source_duration_ms: u64) -> String {
    let (start, end) = fragment.bounds(source_duration_ms);
    format!("[{} - {}]", format_duration_ms(start), format_duration_ms(end))
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> Result<()> {
    let clips = container
        .concat_interactor()
        .probe(&args.inputs)
        .await
        .context("Failed to probe clips")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&clips)?);
        return Ok(());
    }

    for clip in &clips {
        println!(
            "{:>3}  {:>12}  {:<8}  {}",
            clip.index,
            format_duration_ms(clip.duration_ms),
            if clip.has_audio { "audio" } else { "no-audio" },
            clip.path.display()
        );
    }
    Ok(())
}
