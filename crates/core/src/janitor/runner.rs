use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::{JanitorConfig, MediaConfig};
use crate::metrics::JANITOR_FILES_REMOVED;

use super::JanitorError;

/// A directory to sweep, optionally restricted to matching file names.
#[derive(Debug, Clone)]
pub struct SweepTarget {
    pub dir: PathBuf,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl SweepTarget {
    /// Every regular file in `dir`.
    pub fn all(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: None,
            suffix: None,
        }
    }

    /// Files in `dir` named `{prefix}*{suffix}`.
    pub fn matching(dir: impl Into<PathBuf>, prefix: &str, suffix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: Some(prefix.to_string()),
            suffix: Some(suffix.to_string()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.prefix.as_deref().map_or(true, |p| name.starts_with(p))
            && self.suffix.as_deref().map_or(true, |s| name.ends_with(s))
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Periodic remover of expired local files.
pub struct Janitor {
    config: JanitorConfig,
    targets: Vec<SweepTarget>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Janitor {
    pub fn new(config: JanitorConfig, targets: Vec<SweepTarget>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            targets,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Janitor over the staging directory and generated thumbnails.
    pub fn for_media(config: JanitorConfig, media: &MediaConfig) -> Self {
        Self::new(
            config,
            vec![
                SweepTarget::all(&media.staging_dir),
                SweepTarget::matching(&media.public_dir, "thumbnail-", ".jpg"),
            ],
        )
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run a single sweep over every target now.
    pub async fn sweep(&self) -> Result<SweepReport, JanitorError> {
        Self::sweep_targets(&self.targets, Duration::from_secs(self.config.max_age_secs)).await
    }

    /// Start the periodic sweep loop.
    pub fn start(&self) {
        if !self.config.enabled {
            info!("Janitor disabled");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Janitor already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let targets = self.targets.clone();
        let interval = Duration::from_secs(self.config.interval_secs);
        let max_age = Duration::from_secs(self.config.max_age_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                max_age_secs = max_age.as_secs(),
                "Janitor loop started"
            );
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Janitor received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        match Self::sweep_targets(&targets, max_age).await {
                            Ok(report) if report.removed > 0 || report.failed > 0 => {
                                info!(
                                    scanned = report.scanned,
                                    removed = report.removed,
                                    failed = report.failed,
                                    "Janitor sweep finished"
                                );
                            }
                            Ok(_) => debug!("Janitor sweep found nothing to remove"),
                            Err(e) => warn!(error = %e, "Janitor sweep failed"),
                        }
                    }
                }
            }
            info!("Janitor loop stopped");
        });
    }

    /// Stop the sweep loop.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    async fn sweep_targets(
        targets: &[SweepTarget],
        max_age: Duration,
    ) -> Result<SweepReport, JanitorError> {
        let mut report = SweepReport::default();
        let now = SystemTime::now();

        for target in targets {
            let mut entries = match tokio::fs::read_dir(&target.dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(JanitorError::ReadDir {
                        path: target.dir.clone(),
                        source,
                    })
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(source) => {
                        return Err(JanitorError::ReadDir {
                            path: target.dir.clone(),
                            source,
                        })
                    }
                };

                let name = entry.file_name();
                if !target.matches(&name.to_string_lossy()) {
                    continue;
                }

                let metadata = match entry.metadata().await {
                    Ok(m) if m.is_file() => m,
                    _ => continue,
                };
                report.scanned += 1;

                if !Self::is_expired(&metadata, now, max_age) {
                    continue;
                }

                Self::remove(&entry.path(), &mut report).await;
            }
        }

        Ok(report)
    }

    fn is_expired(metadata: &std::fs::Metadata, now: SystemTime, max_age: Duration) -> bool {
        metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age >= max_age)
    }

    async fn remove(path: &Path, report: &mut SweepReport) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                report.removed += 1;
                JANITOR_FILES_REMOVED.inc();
                debug!(path = %path.display(), "Removed expired file");
            }
            // Raced with another remover.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                report.failed += 1;
                warn!(path = %path.display(), error = %e, "Failed to remove expired file");
            }
        }
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}
