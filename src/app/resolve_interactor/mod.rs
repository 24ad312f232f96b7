// Resolve interactor - Turns user paths into probed clips

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::app::fanout::run_indexed;
use crate::domain::errors::*;
use crate::domain::model::Clip;
use crate::ports::ProbePort;
use crate::utils::path::absolute;

/// Resolves clip paths and queries their duration through the probe port
///
/// Holds no mutable state, so concurrent calls for distinct clips are fine.
#[derive(Clone)]
pub struct ClipResolver {
    probe_port: Arc<dyn ProbePort>,
}

impl ClipResolver {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Resolve the clip at list position `index`
    pub async fn resolve(&self, index: usize, path: &Path) -> Result<Clip, DomainError> {
        let path = absolute(path)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DomainError::ClipNotFound { index, path });
        }

        let report = self
            .probe_port
            .probe(&path)
            .await
            .map_err(|source| DomainError::ClipProbe {
                index,
                path: path.clone(),
                source,
            })?;

        debug!(
            index,
            path = %path.display(),
            duration_ms = report.duration_ms,
            has_audio = report.has_audio,
            "Clip resolved"
        );

        Ok(Clip::new(index, path, report.duration_ms).with_audio(report.has_audio))
    }

    /// Resolve every clip concurrently; the result keeps input order
    #[instrument(skip(self, paths), fields(clips = paths.len()))]
    pub async fn resolve_all(
        &self,
        paths: &[PathBuf],
        max_concurrency: usize,
    ) -> Result<Vec<Clip>, DomainError> {
        if paths.is_empty() {
            return Err(DomainError::NoClips);
        }

        let clips = run_indexed(
            paths.to_vec(),
            max_concurrency,
            |index, path| {
                let resolver = self.clone();
                async move { resolver.resolve(index, &path).await }
            },
            |index, join_error| DomainError::ClipProbe {
                index,
                path: paths.get(index).cloned().unwrap_or_default(),
                source: EngineError::Aborted(join_error.to_string()),
            },
        )
        .await?;

        info!("Resolved {} clips", clips.len());
        Ok(clips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ProbeReport;
    use async_trait::async_trait;

    struct FixedProbe(u64);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe(&self, _path: &Path) -> Result<ProbeReport, EngineError> {
            Ok(ProbeReport {
                duration_ms: self.0,
                has_audio: true,
            })
        }
    }

    struct BrokenProbe;

    #[async_trait]
    impl ProbePort for BrokenProbe {
        async fn probe(&self, _path: &Path) -> Result<ProbeReport, EngineError> {
            Err(EngineError::Output("moov atom not found".to_string()))
        }
    }

    #[tokio::test]
    async fn test_resolve_existing_clip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mkv");
        std::fs::write(&path, b"").unwrap();

        let clip = ClipResolver::new(Arc::new(FixedProbe(4_200)))
            .resolve(3, &path)
            .await
            .unwrap();

        assert_eq!(clip.index, 3);
        assert_eq!(clip.duration_ms, 4_200);
        assert_eq!(clip.extension, ".mkv");
        assert!(clip.has_audio);
        assert!(clip.path.is_absolute());
    }

    #[tokio::test]
    async fn test_missing_clip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp4");

        let err = ClipResolver::new(Arc::new(FixedProbe(1_000)))
            .resolve(1, &path)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ClipNotFound { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_probe_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp4");
        std::fs::write(&path, b"").unwrap();

        let err = ClipResolver::new(Arc::new(BrokenProbe))
            .resolve(0, &path)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::ClipProbe {
                index: 0,
                source: EngineError::Output(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| {
                let path = dir.path().join(format!("clip{}.mp4", i));
                std::fs::write(&path, b"").unwrap();
                path
            })
            .collect();

        let clips = ClipResolver::new(Arc::new(FixedProbe(2_000)))
            .resolve_all(&paths, 2)
            .await
            .unwrap();

        let indices: Vec<usize> = clips.iter().map(|clip| clip.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(clips[4].path, paths[4]);
    }

    #[tokio::test]
    async fn test_resolve_all_empty() {
        let result = ClipResolver::new(Arc::new(FixedProbe(1)))
            .resolve_all(&[], 2)
            .await;
        assert!(matches!(result, Err(DomainError::NoClips)));
    }
}
