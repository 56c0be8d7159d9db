//! Batch reading of observation files into a station store

use super::file_lists::FileTask;
use super::stats::{FailedFile, ReadOutcome, ReadStats};
use crate::app::models::{ParsedFile, StationRecord, VariableRegistry};
use crate::app::services::station_extractor::StationExtractor;
use crate::app::services::station_store::StationStore;
use crate::config::ProcessorConfig;
use crate::error::{ObsError, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, info, warn};

/// Format-specific parser turning a file on disk into a [`ParsedFile`]
pub trait FileReader: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<ParsedFile>;
}

/// Parse, resolve and extract one file
fn process_file<R: FileReader + ?Sized>(
    reader: &R,
    extractor: &StationExtractor,
    registry: &VariableRegistry,
    task: &FileTask,
) -> Result<StationRecord> {
    let parsed = reader.read_file(&task.path)?;
    extractor.extract(&parsed, task.vars.as_slice(), registry)
}

/// Single writer owning the store during a batch read
struct BatchWriter {
    store: StationStore,
    failed: Vec<FailedFile>,
    stats: ReadStats,
    progress: Option<ProgressBar>,
}

impl BatchWriter {
    fn new(config: &ProcessorConfig, files_total: usize) -> Result<Self> {
        let progress = config.show_progress.then(|| {
            let pb = ProgressBar::new(files_total as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message("Reading files");
            pb
        });

        Ok(Self {
            store: StationStore::new(config.store.clone())?,
            failed: Vec::new(),
            stats: ReadStats {
                files_total,
                ..Default::default()
            },
            progress,
        })
    }

    /// Append a record or record a recoverable failure
    fn handle(&mut self, path: PathBuf, result: Result<StationRecord>) -> Result<()> {
        match result {
            Ok(record) => {
                let before = self.store.len();
                self.store.append_record(&record)?;
                self.stats.rows_appended += self.store.len() - before;
                self.stats.files_read += 1;
            }
            Err(e) if e.is_recoverable() => {
                warn!("Skipping {}: {}", path.display(), e);
                self.stats.files_failed += 1;
                self.failed.push(FailedFile {
                    path,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
        Ok(())
    }

    fn finish(mut self, started: Instant) -> Result<ReadOutcome> {
        self.store.finalize()?;
        self.stats.elapsed = started.elapsed();
        if let Some(pb) = &self.progress {
            pb.finish_with_message("Done");
        }
        info!("Batch read complete: {}", self.stats.summary());
        Ok(ReadOutcome {
            store: self.store,
            files_failed: self.failed,
            stats: self.stats,
        })
    }
}

/// Reads batches of files into a fresh station store per call
pub struct ObservationReader<R: FileReader + 'static> {
    reader: Arc<R>,
    extractor: Arc<StationExtractor>,
    registry: Arc<VariableRegistry>,
    config: ProcessorConfig,
}

impl<R: FileReader + 'static> ObservationReader<R> {
    /// Create a reader; the configuration is validated here
    pub fn new(reader: R, registry: VariableRegistry, config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: Arc::new(reader),
            extractor: Arc::new(StationExtractor::from_config(&config)),
            registry: Arc::new(registry),
            config,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Select `tasks[first_file..last_file]` and check every variable is known
    fn select<'a>(
        &self,
        tasks: &'a [FileTask],
        first_file: Option<usize>,
        last_file: Option<usize>,
    ) -> Result<&'a [FileTask]> {
        let first = first_file.unwrap_or(0);
        let last = last_file.unwrap_or(tasks.len());
        if first > last || last > tasks.len() {
            return Err(ObsError::configuration(format!(
                "Invalid file range {}..{} for {} files",
                first,
                last,
                tasks.len()
            )));
        }
        let selected = &tasks[first..last];
        for task in selected {
            for var in &task.vars {
                self.registry.get(var)?;
            }
        }
        debug!("Selected {} of {} files", selected.len(), tasks.len());
        Ok(selected)
    }

    /// Read files one after another.
    ///
    /// Recoverable per-file errors are collected in `files_failed`; any other
    /// error aborts the batch.
    pub fn read(
        &self,
        tasks: &[FileTask],
        first_file: Option<usize>,
        last_file: Option<usize>,
    ) -> Result<ReadOutcome> {
        let started = Instant::now();
        let selected = self.select(tasks, first_file, last_file)?;
        let mut writer = BatchWriter::new(&self.config, selected.len())?;

        for task in selected {
            let result = process_file(self.reader.as_ref(), &self.extractor, &self.registry, task);
            writer.handle(task.path.clone(), result)?;
        }
        writer.finish(started)
    }

    /// Read files on blocking worker tasks, appending through one writer.
    ///
    /// Results are consumed in file order, so `meta_key`s match a sequential
    /// read of the same files.
    pub async fn read_concurrent(
        &self,
        tasks: &[FileTask],
        first_file: Option<usize>,
        last_file: Option<usize>,
    ) -> Result<ReadOutcome> {
        let started = Instant::now();
        let selected = self.select(tasks, first_file, last_file)?.to_vec();
        let mut writer = BatchWriter::new(&self.config, selected.len())?;

        let workers = self.config.workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        debug!("Reading {} files with {} workers", selected.len(), workers);

        let results = stream::iter(selected)
            .map(|file_task| {
                let sem = semaphore.clone();
                let reader = self.reader.clone();
                let extractor = self.extractor.clone();
                let registry = self.registry.clone();
                async move {
                    let _permit = sem
                        .acquire_owned()
                        .await
                        .map_err(|e| ObsError::task_failed(e.to_string()))?;
                    let path = file_task.path.clone();
                    let result = task::spawn_blocking(move || {
                        process_file(reader.as_ref(), &extractor, &registry, &file_task)
                    })
                    .await
                    .map_err(|e| ObsError::task_failed(e.to_string()))?;
                    Ok::<_, ObsError>((path, result))
                }
            })
            .buffered(workers);
        tokio::pin!(results);

        while let Some(item) = results.next().await {
            let (path, result) = item?;
            writer.handle(path, result)?;
        }
        writer.finish(started)
    }
}
