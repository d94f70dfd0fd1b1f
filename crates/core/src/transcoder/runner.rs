//! Transcode job runner.
//!
//! Runs one job at a time per call, in a fixed order:
//! download, probe, plan, then encode and upload each rendition in ascending
//! order. The first failure stops the job; nothing after it runs.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::encoder::{list_segments, RenditionEncoder, PLAYLIST_FILE_NAME};
use crate::metrics;
use crate::probe::MediaProber;
use crate::rendition::{self, Rendition};
use crate::storage::keys::{content_type_for, source_extension};
use crate::storage::{DestinationKeys, StorageError, StorageGateway};

use super::config::TranscoderConfig;
use super::ledger::UploadLedger;
use super::locks::PrefixLocks;
use super::types::{TranscodeError, TranscodeResult};
use super::workspace::ScratchWorkspace;

/// Keeps the active-jobs gauge accurate even when a job is cancelled.
struct ActiveJob;

impl ActiveJob {
    fn start() -> Self {
        metrics::JOBS_ACTIVE.inc();
        Self
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        metrics::JOBS_ACTIVE.dec();
    }
}

/// Turns one source object into an HLS rendition ladder in the destination store.
///
/// Dropping the future returned by [`run`](Self::run) cancels the job: running
/// subprocesses are killed, the scratch workspace is removed and, when
/// rollback is enabled, objects the job created are deleted.
///
/// Jobs whose sources share a base name write the same destination keys and
/// run one after another.
pub struct Transcoder {
    config: TranscoderConfig,
    storage: Arc<dyn StorageGateway>,
    prober: Arc<dyn MediaProber>,
    encoder: Arc<dyn RenditionEncoder>,
    job_slots: Option<Arc<Semaphore>>,
    prefix_locks: PrefixLocks,
}

impl Transcoder {
    /// Create a new transcoder.
    pub fn new(
        config: TranscoderConfig,
        storage: Arc<dyn StorageGateway>,
        prober: Arc<dyn MediaProber>,
        encoder: Arc<dyn RenditionEncoder>,
    ) -> Self {
        let job_slots = match config.max_concurrent_jobs {
            0 => None,
            max => Some(Arc::new(Semaphore::new(max))),
        };

        Self {
            config,
            storage,
            prober,
            encoder,
            job_slots,
            prefix_locks: PrefixLocks::new(),
        }
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Name of the storage backend in use.
    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    /// Transcode `source_key` into every rendition its resolution allows.
    pub async fn run(&self, source_key: &str) -> Result<TranscodeResult, TranscodeError> {
        let job_id = Uuid::new_v4().to_string();
        let span = info_span!("transcode", job_id = %job_id, source_key = %source_key);

        async {
            let keys = DestinationKeys::for_source(source_key);
            let prefix_guard = self.prefix_locks.acquire(&keys.prefix()).await;
            let _permit = self.acquire_slot().await;
            let _active = ActiveJob::start();
            let start = Instant::now();

            let result = self.execute(&job_id, source_key, &keys, prefix_guard).await;
            let elapsed = start.elapsed().as_secs_f64();

            match &result {
                Ok(done) => {
                    metrics::JOBS_TOTAL.with_label_values(&["success"]).inc();
                    metrics::JOB_DURATION
                        .with_label_values(&["success"])
                        .observe(elapsed);
                    info!(
                        "Transcode complete: {} renditions, {} objects in {:.1}s",
                        done.renditions.len(),
                        done.uploaded_objects,
                        elapsed
                    );
                }
                Err(e) => {
                    metrics::JOBS_TOTAL.with_label_values(&["failed"]).inc();
                    metrics::JOB_FAILURES
                        .with_label_values(&[e.stage().as_str()])
                        .inc();
                    metrics::JOB_DURATION
                        .with_label_values(&["failed"])
                        .observe(elapsed);
                    error!(stage = %e.stage(), "Transcode failed: {}", e);
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        let slots = self.job_slots.as_ref()?;
        if slots.available_permits() == 0 {
            debug!("Waiting for a free job slot");
        }
        Arc::clone(slots).acquire_owned().await.ok()
    }

    async fn execute(
        &self,
        job_id: &str,
        source_key: &str,
        keys: &DestinationKeys,
        prefix_guard: OwnedMutexGuard<()>,
    ) -> Result<TranscodeResult, TranscodeError> {
        let workspace =
            ScratchWorkspace::create(&self.config.scratch_dir, &source_extension(source_key))
                .map_err(TranscodeError::Workspace)?;

        info!("Downloading source to {:?}", workspace.source_path());
        let download_start = Instant::now();
        self.storage
            .download(source_key, workspace.source_path())
            .await
            .map_err(TranscodeError::Download)?;
        metrics::DOWNLOAD_DURATION.observe(download_start.elapsed().as_secs_f64());

        let metadata = self
            .prober
            .probe(workspace.source_path())
            .await
            .map_err(TranscodeError::Probe)?;

        let plan = rendition::plan(metadata.width, metadata.height);
        let names: Vec<&str> = plan.renditions().iter().map(Rendition::name).collect();
        info!(
            "Source is {} ({} ms), producing renditions: {}",
            metadata.dimensions(),
            metadata.duration_millis,
            names.join(", ")
        );

        let mut ledger =
            UploadLedger::new(Arc::clone(&self.storage), self.config.rollback_on_failure)
                .holding(prefix_guard);
        let mut produced: Vec<Rendition> = Vec::with_capacity(plan.len());

        for &rendition in &plan {
            if let Err(e) = self
                .produce(&workspace, rendition, keys, &mut ledger, &produced)
                .await
            {
                let removed = ledger.rollback().await;
                if removed > 0 {
                    info!("Rolled back {} uploaded objects", removed);
                }
                return Err(e);
            }
            produced.push(rendition);
            metrics::RENDITIONS_PRODUCED
                .with_label_values(&[rendition.name()])
                .inc();
        }

        if produced.is_empty() {
            ledger.rollback().await;
            return Err(TranscodeError::NoOutput);
        }

        let uploaded_objects = ledger.commit();

        Ok(TranscodeResult {
            job_id: job_id.to_string(),
            renditions: produced,
            source_duration_millis: metadata.duration_millis,
            uploaded_objects,
        })
    }

    /// Encodes one rendition and uploads its playlist and segments.
    async fn produce(
        &self,
        workspace: &ScratchWorkspace,
        rendition: Rendition,
        keys: &DestinationKeys,
        ledger: &mut UploadLedger,
        completed: &[Rendition],
    ) -> Result<(), TranscodeError> {
        let output_dir =
            workspace
                .rendition_dir(rendition)
                .await
                .map_err(|source| TranscodeError::OutputDir {
                    rendition,
                    completed: completed.to_vec(),
                    source,
                })?;

        info!("Encoding {}", rendition);
        let output = self
            .encoder
            .encode(workspace.source_path(), rendition, &output_dir)
            .await
            .map_err(|source| TranscodeError::Encode {
                rendition,
                completed: completed.to_vec(),
                source,
            })?;
        metrics::ENCODE_DURATION
            .with_label_values(&[rendition.name()])
            .observe(output.elapsed_ms as f64 / 1000.0);
        debug!(
            "Encoded {} in {} ms ({} segments)",
            rendition,
            output.elapsed_ms,
            output.segments.len()
        );

        let before = ledger.len();
        self.upload_rendition(&output_dir, rendition, keys, ledger)
            .await
            .map_err(|source| TranscodeError::Upload {
                rendition,
                completed: completed.to_vec(),
                source,
            })?;
        info!(
            "Uploaded {} ({} objects) to {}",
            rendition,
            ledger.len() - before,
            keys.rendition_prefix(rendition)
        );

        Ok(())
    }

    /// Uploads the playlist first, then every segment in playback order.
    async fn upload_rendition(
        &self,
        output_dir: &Path,
        rendition: Rendition,
        keys: &DestinationKeys,
        ledger: &mut UploadLedger,
    ) -> Result<(), StorageError> {
        let playlist = output_dir.join(PLAYLIST_FILE_NAME);
        let playlist_key = keys.playlist(rendition);
        self.upload_file(&playlist, playlist_key, ledger).await?;

        for segment in list_segments(output_dir).await? {
            let Some(name) = segment.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            self.upload_file(&segment, keys.file(rendition, name), ledger)
                .await?;
        }

        Ok(())
    }

    async fn upload_file(
        &self,
        local: &Path,
        key: String,
        ledger: &mut UploadLedger,
    ) -> Result<(), StorageError> {
        let created = ledger.is_armed() && !self.already_published(&key).await;
        self.storage
            .upload(local, &key, content_type_for(local))
            .await?;
        ledger.record(key, created);
        Ok(())
    }

    /// A key whose existence cannot be checked counts as published, so
    /// rollback never removes it.
    async fn already_published(&self, key: &str) -> bool {
        match self.storage.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Could not check {}, it will not be rolled back: {}", key, e);
                true
            }
        }
    }
}
