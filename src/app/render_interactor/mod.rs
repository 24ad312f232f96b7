// Render interactor - Renders transition pairs and reassembles the concat order

use std::future::Future;
use std::path::PathBuf;

use tracing::{info, instrument};

use crate::app::fanout::run_indexed;
use crate::domain::errors::*;
use crate::domain::model::{FragmentPlan, TransitionPair};
use crate::domain::rules::interleave;

/// Render every transition pair concurrently.
///
/// The returned paths are ordered by boundary index. The first failing render
/// aborts the rest and is reported as [`DomainError::RenderFailure`].
#[instrument(skip(plan, render), fields(pairs = plan.transition_pairs.len()))]
pub async fn render_transitions<F, Fut>(
    plan: &FragmentPlan,
    max_concurrency: usize,
    render: F,
) -> Result<Vec<PathBuf>, DomainError>
where
    F: Fn(TransitionPair) -> Fut,
    Fut: Future<Output = Result<PathBuf, EngineError>> + Send + 'static,
{
    let rendered = run_indexed(
        plan.transition_pairs.clone(),
        max_concurrency,
        |_, pair| {
            let boundary = pair.boundary;
            let job = render(pair);
            async move {
                job.await
                    .map_err(|source| DomainError::RenderFailure { boundary, source })
            }
        },
        |boundary, join_error| DomainError::RenderFailure {
            boundary,
            source: EngineError::Aborted(join_error.to_string()),
        },
    )
    .await?;

    info!("Rendered {} transitions", rendered.len());
    Ok(rendered)
}

/// Render all transitions, then interleave them with the base fragments.
///
/// Nothing is returned unless every render succeeded.
pub async fn render_and_reassemble<F, Fut>(
    plan: &FragmentPlan,
    max_concurrency: usize,
    render: F,
) -> Result<Vec<PathBuf>, DomainError>
where
    F: Fn(TransitionPair) -> Fut,
    Fut: Future<Output = Result<PathBuf, EngineError>> + Send + 'static,
{
    let rendered = render_transitions(plan, max_concurrency, render).await?;
    Ok(interleave(&plan.base_fragments, &rendered))
}
