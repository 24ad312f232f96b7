//! Path helpers: input resolution and collision-free fragment names

use std::path::{Path, PathBuf};

use crate::domain::model::{Clip, FragmentKind};

/// Name of the concat-list file written next to the fragments
pub const CONCAT_LIST_FILE: &str = "concat.txt";

/// Turn a user-supplied path into an absolute one without touching the filesystem
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Fragment file names derived from clip index and fragment kind
///
/// Names never depend on the source file name, so two clips with the same
/// name in different directories cannot collide.
#[derive(Debug, Clone)]
pub struct FragmentNaming {
    work_dir: PathBuf,
}

impl FragmentNaming {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// `{index}{ext}`, `{index}.begin{ext}` or `{index}.end{ext}`
    pub fn fragment(&self, clip: &Clip, kind: FragmentKind) -> PathBuf {
        let name = match kind {
            FragmentKind::Base => format!("{}{}", clip.index, clip.extension),
            FragmentKind::Begin | FragmentKind::End => {
                format!("{}.{}{}", clip.index, kind, clip.extension)
            }
        };
        self.work_dir.join(name)
    }

    /// `{k}.end-{k+1}.begin{ext}` for the rendered transition at boundary `k`
    pub fn transition(&self, boundary: usize, right: &Clip) -> PathBuf {
        self.work_dir.join(format!(
            "{}.end-{}.begin{}",
            boundary,
            boundary + 1,
            right.extension
        ))
    }

    pub fn concat_list(&self) -> PathBuf {
        self.work_dir.join(CONCAT_LIST_FILE)
    }
}

/// Sibling of `output` the engine writes to before it is renamed into place.
///
/// The extension stays last so the engine still picks the container from it:
/// `out.mp4` becomes `out.partial.mp4`.
pub fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!("{}.partial", stem),
    };
    output.with_file_name(name)
}
