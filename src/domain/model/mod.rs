// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Effect name used when a transition does not name one
pub const DEFAULT_TRANSITION_NAME: &str = "fade";

/// A resolved input clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clip {
    /// Position of the clip in the user-supplied list
    pub index: usize,
    /// Absolute path to the media file
    pub path: PathBuf,
    /// Duration reported by the media engine
    pub duration_ms: u64,
    /// File extension including the leading dot (".mp4"), empty if none
    pub extension: String,
    /// Whether the engine reported at least one audio stream
    pub has_audio: bool,
}

impl Clip {
    /// Create a clip, deriving the extension from the path
    pub fn new(index: usize, path: PathBuf, duration_ms: u64) -> Self {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Self {
            index,
            path,
            duration_ms,
            extension,
            has_audio: false,
        }
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }
}

/// Effect applied at one boundary between two adjacent clips
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Effect identifier understood by the render collaborator
    #[serde(default = "default_transition_name")]
    pub name: String,
    /// Milliseconds taken from the tail of the left clip and the head of the right clip
    pub duration_ms: u64,
    /// Extra effect parameters, passed through untouched
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

fn default_transition_name() -> String {
    DEFAULT_TRANSITION_NAME.to_string()
}

impl Transition {
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parse `name:duration_ms[:key=value...]`, e.g. `wipeleft:750` or `fade:1000:easing=linear`
    pub fn parse(spec: &str) -> Result<Self, DomainError> {
        let mut parts = spec.trim().split(':');

        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(DomainError::InvalidTransitionSpec(format!(
                "missing effect name in '{}'",
                spec
            )));
        }

        let duration = parts.next().ok_or_else(|| {
            DomainError::InvalidTransitionSpec(format!(
                "missing duration in '{}'. Expected name:duration_ms",
                spec
            ))
        })?;
        let duration_ms = duration.trim().parse::<u64>().map_err(|_| {
            DomainError::InvalidDuration(format!(
                "'{}' is not a whole number of milliseconds",
                duration
            ))
        })?;

        let mut transition = Self::new(name, duration_ms);
        for param in parts {
            let (key, value) = param.split_once('=').ok_or_else(|| {
                DomainError::InvalidTransitionSpec(format!(
                    "parameter '{}' must be key=value",
                    param
                ))
            })?;
            transition = transition.with_param(key.trim(), value.trim());
        }

        Ok(transition)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.duration_ms)?;
        for (key, value) in &self.params {
            write!(f, ":{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Transitions for every boundary of a clip list
///
/// A per-boundary list, when present, must hold exactly `clip_count - 1`
/// entries and takes precedence over the global transition at each index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub global: Option<Transition>,
    #[serde(default)]
    pub per_boundary: Vec<Transition>,
}

impl TransitionSpec {
    /// Same transition at every boundary
    pub fn uniform(transition: Transition) -> Self {
        Self {
            global: Some(transition),
            per_boundary: Vec::new(),
        }
    }

    /// One transition per boundary
    pub fn per_boundary(transitions: Vec<Transition>) -> Self {
        Self {
            global: None,
            per_boundary: transitions,
        }
    }

    pub fn with_global(mut self, transition: Option<Transition>) -> Self {
        self.global = transition;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.per_boundary.is_empty()
    }

    /// Effective transition at `boundary`
    pub fn at(&self, boundary: usize) -> Option<&Transition> {
        self.per_boundary.get(boundary).or(self.global.as_ref())
    }

    /// Check the spec against a clip count
    pub fn validate(&self, clip_count: usize) -> Result<(), DomainError> {
        if clip_count < 2 {
            return Ok(());
        }

        let boundaries = clip_count - 1;
        if !self.per_boundary.is_empty() && self.per_boundary.len() != boundaries {
            return Err(DomainError::InvalidTransitionSpec(format!(
                "{} clips have {} boundaries but {} transitions were given",
                clip_count,
                boundaries,
                self.per_boundary.len()
            )));
        }

        for boundary in 0..boundaries {
            let transition = self.at(boundary).ok_or_else(|| {
                DomainError::InvalidTransitionSpec(format!(
                    "no transition for boundary {} between clips {} and {}",
                    boundary,
                    boundary,
                    boundary + 1
                ))
            })?;
            if transition.duration_ms == 0 {
                return Err(DomainError::InvalidDuration(format!(
                    "transition at boundary {} has zero duration",
                    boundary
                )));
            }
        }

        Ok(())
    }
}

/// Where a clip sits in the list, which decides how it is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    /// The only clip; copied whole
    Only,
    First,
    Middle,
    Last,
}

impl Position {
    /// Classify the clip at `index` of `count`
    pub fn classify(index: usize, count: usize) -> Self {
        match index {
            _ if count <= 1 => Position::Only,
            0 => Position::First,
            i if i == count - 1 => Position::Last,
            _ => Position::Middle,
        }
    }

    /// Clip is joined to a predecessor
    pub fn has_begin(&self) -> bool {
        matches!(self, Position::Middle | Position::Last)
    }

    /// Clip is joined to a successor
    pub fn has_end(&self) -> bool {
        matches!(self, Position::First | Position::Middle)
    }
}

/// Kind of sub-range cut out of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    /// Part of the clip not consumed by any transition
    Base,
    /// Head consumed by the transition with the predecessor
    Begin,
    /// Tail consumed by the transition with the successor
    End,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Base => write!(f, "base"),
            FragmentKind::Begin => write!(f, "begin"),
            FragmentKind::End => write!(f, "end"),
        }
    }
}

/// A sub-range of one clip written to its own file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub source_clip_index: usize,
    pub source_path: PathBuf,
    /// `None` means from the start of the source
    pub start_ms: Option<u64>,
    /// `None` means to the end of the source
    pub end_ms: Option<u64>,
    pub output_path: PathBuf,
}

impl Fragment {
    /// Build a fragment, rejecting open ranges and empty ranges
    pub fn new(
        kind: FragmentKind,
        clip: &Clip,
        start_ms: Option<u64>,
        end_ms: Option<u64>,
        output_path: PathBuf,
    ) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidFragment {
            clip_index: clip.index,
            kind,
            reason: reason.to_string(),
        };

        if start_ms.is_none() && end_ms.is_none() {
            return Err(invalid("range must be bounded on at least one side"));
        }
        let (start, end) = resolve_bounds(start_ms, end_ms, clip.duration_ms);
        if start >= end {
            return Err(invalid(&format!("empty range [{}, {})", start, end)));
        }
        if end > clip.duration_ms {
            return Err(invalid(&format!(
                "range ends at {} ms past clip duration {} ms",
                end, clip.duration_ms
            )));
        }

        Ok(Self {
            kind,
            source_clip_index: clip.index,
            source_path: clip.path.clone(),
            start_ms,
            end_ms,
            output_path,
        })
    }

    /// Concrete `[start, end)` bounds against the source duration
    pub fn bounds(&self, source_duration_ms: u64) -> (u64, u64) {
        resolve_bounds(self.start_ms, self.end_ms, source_duration_ms)
    }

    /// Length of the fragment in milliseconds
    pub fn duration_ms(&self, source_duration_ms: u64) -> u64 {
        let (start, end) = self.bounds(source_duration_ms);
        end.saturating_sub(start)
    }

    /// Length to hand to the trim operation; `None` means "to the end"
    pub fn trim_length_ms(&self) -> Option<u64> {
        self.end_ms
            .map(|end| end.saturating_sub(self.start_ms.unwrap_or(0)))
    }

    pub fn output(&self) -> &Path {
        &self.output_path
    }
}

fn resolve_bounds(start_ms: Option<u64>, end_ms: Option<u64>, duration_ms: u64) -> (u64, u64) {
    (start_ms.unwrap_or(0), end_ms.unwrap_or(duration_ms))
}

/// The tail of clip `boundary` bound to the head of clip `boundary + 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionPair {
    pub boundary: usize,
    pub end: Fragment,
    pub begin: Fragment,
    pub transition: Transition,
    /// Where the rendered transition is written
    pub output_path: PathBuf,
}

/// Output of the segmentation planner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FragmentPlan {
    /// One per clip, in clip order
    pub base_fragments: Vec<Fragment>,
    /// One per boundary, in boundary order
    pub transition_pairs: Vec<TransitionPair>,
}

impl FragmentPlan {
    pub fn clip_count(&self) -> usize {
        self.base_fragments.len()
    }

    /// Every fragment that has to be trimmed out of a source clip,
    /// ordered by clip index then begin, base, end
    pub fn trim_fragments(&self) -> Vec<&Fragment> {
        let mut fragments: Vec<&Fragment> = Vec::with_capacity(self.clip_count() * 3);
        for (index, base) in self.base_fragments.iter().enumerate() {
            if index > 0 {
                if let Some(pair) = self.transition_pairs.get(index - 1) {
                    fragments.push(&pair.begin);
                }
            }
            fragments.push(base);
            if let Some(pair) = self.transition_pairs.get(index) {
                fragments.push(&pair.end);
            }
        }
        fragments
    }

    /// Paths in final concat order assuming every transition renders to its planned path
    pub fn concat_order(&self) -> Vec<PathBuf> {
        let rendered: Vec<PathBuf> = self
            .transition_pairs
            .iter()
            .map(|pair| pair.output_path.clone())
            .collect();
        crate::domain::rules::interleave(&self.base_fragments, &rendered)
    }
}

#[cfg(test)]
mod tests;
