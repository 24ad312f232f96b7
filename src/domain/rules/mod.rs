// Domain rules - Segmentation planning and reassembly order

use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::path::FragmentNaming;

/// Cuts an ordered clip list into base fragments and transition pairs
pub struct SegmentationPlanner {
    naming: FragmentNaming,
}

impl SegmentationPlanner {
    /// Planner writing fragment paths under `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            naming: FragmentNaming::new(work_dir),
        }
    }

    pub fn work_dir(&self) -> &Path {
        self.naming.work_dir()
    }

    /// Compute the fragment plan for `clips`
    ///
    /// Every precondition is checked before any fragment is built, so a
    /// failing plan produces nothing.
    pub fn plan(&self, clips: &[Clip], spec: &TransitionSpec) -> Result<FragmentPlan, DomainError> {
        if clips.is_empty() {
            return Err(DomainError::NoClips);
        }

        if clips.len() == 1 {
            let clip = &clips[0];
            let base = Fragment::new(
                FragmentKind::Base,
                clip,
                None,
                Some(clip.duration_ms),
                self.naming.fragment(clip, FragmentKind::Base),
            )?;
            return Ok(FragmentPlan {
                base_fragments: vec![base],
                transition_pairs: Vec::new(),
            });
        }

        spec.validate(clips.len())?;
        let durations = Self::boundary_durations(clips.len(), spec)?;
        Self::check_consumption(clips, &durations)?;

        let mut base_fragments = Vec::with_capacity(clips.len());
        let mut begins: Vec<Fragment> = Vec::with_capacity(durations.len());
        let mut ends: Vec<Fragment> = Vec::with_capacity(durations.len());

        for (index, clip) in clips.iter().enumerate() {
            let position = Position::classify(index, clips.len());
            let before = if position.has_begin() { Some(durations[index - 1]) } else { None };
            let after = if position.has_end() { Some(durations[index]) } else { None };
            let d = clip.duration_ms;

            let base = match (before, after) {
                (None, Some(t_after)) => (None, Some(d - t_after)),
                (Some(t_before), None) => (Some(t_before), None),
                (Some(t_before), Some(t_after)) => (Some(t_before), Some(d - t_after)),
                (None, None) => (None, Some(d)),
            };
            base_fragments.push(Fragment::new(
                FragmentKind::Base,
                clip,
                base.0,
                base.1,
                self.naming.fragment(clip, FragmentKind::Base),
            )?);

            if let Some(t_before) = before {
                begins.push(Fragment::new(
                    FragmentKind::Begin,
                    clip,
                    None,
                    Some(t_before),
                    self.naming.fragment(clip, FragmentKind::Begin),
                )?);
            }
            if let Some(t_after) = after {
                ends.push(Fragment::new(
                    FragmentKind::End,
                    clip,
                    Some(d - t_after),
                    None,
                    self.naming.fragment(clip, FragmentKind::End),
                )?);
            }
        }

        let transition_pairs = self.pair(clips, ends, begins, spec)?;

        tracing::debug!(
            clips = clips.len(),
            pairs = transition_pairs.len(),
            "Segmentation plan built"
        );

        Ok(FragmentPlan {
            base_fragments,
            transition_pairs,
        })
    }

    /// Effective transition duration at every boundary
    fn boundary_durations(clip_count: usize, spec: &TransitionSpec) -> Result<Vec<u64>, DomainError> {
        (0..clip_count - 1)
            .map(|boundary| {
                spec.at(boundary)
                    .map(|transition| transition.duration_ms)
                    .ok_or_else(|| {
                        DomainError::InvalidTransitionSpec(format!(
                            "no transition for boundary {}",
                            boundary
                        ))
                    })
            })
            .collect()
    }

    /// Each clip must outlast the transitions taken from both of its sides
    fn check_consumption(clips: &[Clip], durations: &[u64]) -> Result<(), DomainError> {
        for (index, clip) in clips.iter().enumerate() {
            let before = if index > 0 { durations[index - 1] } else { 0 };
            let after = durations.get(index).copied().unwrap_or(0);
            let consumed = before.saturating_add(after);

            if clip.duration_ms <= consumed {
                return Err(DomainError::TransitionTooLong {
                    clip_index: index,
                    duration_ms: clip.duration_ms,
                    consumed_ms: consumed,
                });
            }
        }
        Ok(())
    }

    /// Bind end fragment k to begin fragment k + 1, strictly by boundary index
    fn pair(
        &self,
        clips: &[Clip],
        ends: Vec<Fragment>,
        begins: Vec<Fragment>,
        spec: &TransitionSpec,
    ) -> Result<Vec<TransitionPair>, DomainError> {
        if ends.len() != begins.len() {
            return Err(DomainError::InvalidTransitionSpec(format!(
                "{} end fragments cannot pair with {} begin fragments",
                ends.len(),
                begins.len()
            )));
        }

        ends.into_iter()
            .zip(begins)
            .enumerate()
            .map(|(boundary, (end, begin))| {
                debug_assert_eq!(end.source_clip_index, boundary);
                debug_assert_eq!(begin.source_clip_index, boundary + 1);

                let transition = spec.at(boundary).cloned().ok_or_else(|| {
                    DomainError::InvalidTransitionSpec(format!(
                        "no transition for boundary {}",
                        boundary
                    ))
                })?;
                let output_path = self.naming.transition(boundary, &clips[boundary + 1]);

                Ok(TransitionPair {
                    boundary,
                    end,
                    begin,
                    transition,
                    output_path,
                })
            })
            .collect()
    }
}

/// Final concat order: `base[0], rendered[0], base[1], ..., base[n-1]`
///
/// Order comes from the clip index alone; `rendered[k]` is the transition
/// between clip `k` and clip `k + 1`.
pub fn interleave(base_fragments: &[Fragment], rendered: &[PathBuf]) -> Vec<PathBuf> {
    debug_assert!(base_fragments.is_empty() || rendered.len() + 1 == base_fragments.len());

    let mut ordered = Vec::with_capacity(base_fragments.len() + rendered.len());
    for (index, base) in base_fragments.iter().enumerate() {
        ordered.push(base.output_path.clone());
        if let Some(transition) = rendered.get(index) {
            ordered.push(transition.clone());
        }
    }
    ordered
}

/// Duration the joined output should have
pub fn expected_output_duration_ms(plan: &FragmentPlan, clips: &[Clip]) -> u64 {
    let base: u64 = plan
        .base_fragments
        .iter()
        .map(|fragment| {
            clips
                .get(fragment.source_clip_index)
                .map(|clip| fragment.duration_ms(clip.duration_ms))
                .unwrap_or(0)
        })
        .sum();
    let transitions: u64 = plan
        .transition_pairs
        .iter()
        .map(|pair| pair.transition.duration_ms)
        .sum();
    base + transitions
}
