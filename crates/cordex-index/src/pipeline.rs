//! Indexing driver.
//!
//! Segments are independent, so each one runs on its own blocking worker
//! (`spawn_blocking`), at most `threads` at a time. Workers project records
//! and push documents through a bounded channel; the calling task drains the
//! channel into the sink. A segment-fatal error is counted and the run goes
//! on; a sink error aborts the run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cordex_collection::Collection;
use cordex_common::PipelineConfig;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::document::NormalizedDocument;
use crate::error::{GeneratorError, IndexError, Result};
use crate::generator::DocumentGenerator;

// ── Sink ──────────────────────────────────────────────────────────────────────

/// The external indexer, seen from this side.
#[async_trait]
pub trait IndexSink: Send + Sync {
    async fn add_document(&self, doc: NormalizedDocument) -> Result<()>;

    /// Called once after every segment has been drained.
    async fn commit(&self) -> Result<()>;
}

/// Collects documents in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    docs: Mutex<Vec<NormalizedDocument>>,
    commits: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn documents(&self) -> Vec<NormalizedDocument> {
        self.docs.lock().await.clone()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexSink for MemorySink {
    async fn add_document(&self, doc: NormalizedDocument) -> Result<()> {
        self.docs.lock().await.push(doc);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct IndexingResult {
    pub run_id: Uuid,
    pub segments_total: usize,
    pub segments_failed: usize,
    pub records_seen: usize,
    pub documents_indexed: usize,
    pub documents_empty: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl IndexingResult {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            segments_total: 0,
            segments_failed: 0,
            records_seen: 0,
            documents_indexed: 0,
            documents_empty: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

enum SegmentEvent {
    Document(NormalizedDocument),
    Empty { id: String },
    Finished { path: PathBuf, records: usize, error: Option<String> },
}

/// Index every segment of `collection` into `sink`, then commit.
#[instrument(skip_all, fields(kind = %collection.kind(), root = %collection.root().display()))]
pub async fn run_collection(
    collection: &Collection,
    generator: Arc<DocumentGenerator>,
    sink: &dyn IndexSink,
    config: &PipelineConfig,
) -> Result<IndexingResult> {
    let run_id = Uuid::new_v4();
    let t0 = std::time::Instant::now();
    let mut result = IndexingResult::new(run_id);

    let files = collection.discover()?;
    result.segments_total = files.len();
    info!(run_id = %run_id, segments = files.len(), threads = config.threads, "Starting indexing run");

    let (tx, mut rx) = mpsc::channel::<SegmentEvent>(config.channel_capacity.max(1));
    let semaphore = Arc::new(Semaphore::new(config.threads.max(1)));

    let dispatcher = {
        let collection = collection.clone();
        tokio::spawn(async move {
            let mut workers = Vec::with_capacity(files.len());
            for path in files {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                if tx.is_closed() {
                    break;
                }
                let tx = tx.clone();
                let collection = collection.clone();
                let generator = Arc::clone(&generator);
                workers.push(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    index_segment(&collection, &generator, &path, &tx);
                }));
            }
            drop(tx);
            for worker in workers {
                worker.await.map_err(|e| IndexError::Join(e.to_string()))?;
            }
            Ok::<(), IndexError>(())
        })
    };

    while let Some(event) = rx.recv().await {
        match event {
            SegmentEvent::Document(doc) => {
                result.records_seen += 1;
                if let Err(e) = sink.add_document(doc).await {
                    error!(run_id = %run_id, error = %e, "Sink rejected document, aborting run");
                    dispatcher.abort();
                    return Err(e);
                }
                result.documents_indexed += 1;
            }
            SegmentEvent::Empty { id } => {
                result.records_seen += 1;
                result.documents_empty += 1;
                info!(id = %id, "Skipping document with empty contents");
            }
            SegmentEvent::Finished { path, records, error: None } => {
                debug!(path = %path.display(), records, "Segment complete");
            }
            SegmentEvent::Finished { path, records, error: Some(reason) } => {
                error!(path = %path.display(), records, error = %reason, "Segment failed");
                result.segments_failed += 1;
                result.errors.push(format!("{}: {}", path.display(), reason));
            }
        }
    }

    dispatcher
        .await
        .map_err(|e| IndexError::Join(e.to_string()))??;

    sink.commit().await?;

    result.duration_ms = t0.elapsed().as_millis() as u64;
    info!(
        run_id          = %run_id,
        segments        = result.segments_total,
        segments_failed = result.segments_failed,
        records         = result.records_seen,
        indexed         = result.documents_indexed,
        empty           = result.documents_empty,
        duration_ms     = result.duration_ms,
        "Indexing run complete"
    );
    Ok(result)
}

/// Drain one segment on the current (blocking) thread.
fn index_segment(
    collection: &Collection,
    generator: &DocumentGenerator,
    path: &Path,
    tx: &mpsc::Sender<SegmentEvent>,
) {
    let finished = |records, error| SegmentEvent::Finished { path: path.to_path_buf(), records, error };

    let mut segment = match collection.open_segment(path) {
        Ok(segment) => segment,
        Err(e) => {
            let _ = tx.blocking_send(finished(0, Some(e.to_string())));
            return;
        }
    };

    let mut records = 0usize;
    let error = loop {
        match segment.advance() {
            Ok(Some(record)) => {
                records += 1;
                let event = match generator.create_document(&record) {
                    Ok(doc) => SegmentEvent::Document(doc),
                    Err(GeneratorError::EmptyDocument { id }) => SegmentEvent::Empty { id },
                };
                if tx.blocking_send(event).is_err() {
                    debug!(path = %path.display(), "Receiver gone, abandoning segment");
                    return;
                }
            }
            Ok(None) => break None,
            Err(e) => break Some(e.to_string()),
        }
    };

    segment.close();
    let _ = tx.blocking_send(finished(records, error));
}
