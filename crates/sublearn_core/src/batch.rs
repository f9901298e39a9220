//! Batch processing over independent files.
//!
//! Each file runs its own [`pipeline`](crate::pipeline) on a bounded rayon
//! pool. Files share only the read-only settings; a failing file is
//! reported in its own [`FileResult`] and never stops its siblings.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use crate::align::AlignStrategy;
use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::logging::{JobLogger, LogConfig};
use crate::pipeline::{self, output_path_for, PipelineInput};

/// Errors setting up a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// One file to process.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Display name; also names the per-file log.
    pub name: String,
    pub input: PipelineInput,
    pub output_path: PathBuf,
}

impl BatchJob {
    pub fn new(name: impl Into<String>, input: PipelineInput, output_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input,
            output_path: output_path.into(),
        }
    }

    /// Job writing next to its video, named after the video's stem.
    pub fn for_video(video: impl AsRef<Path>, input: PipelineInput, settings: &Settings) -> Self {
        let video = video.as_ref();
        let name = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| video.display().to_string());
        Self::new(name, input, output_path_for(video, settings))
    }
}

/// Outcome of a successful file.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub strategy: AlignStrategy,
    pub event_count: usize,
    pub diagnostics: Diagnostics,
}

/// Result of processing a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub name: String,
    pub output_path: PathBuf,
    /// Summary on success, error message on failure.
    pub outcome: Result<FileSummary, String>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }
}

/// Runs batch jobs on a bounded worker pool.
pub struct BatchProcessor {
    settings: Settings,
    pool: ThreadPool,
}

impl BatchProcessor {
    /// Create a processor with `settings.batch.workers` threads
    /// (0 = one per available core).
    pub fn new(settings: Settings) -> Result<Self, BatchError> {
        settings.validate().map_err(BatchError::InvalidSettings)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.batch.workers)
            .thread_name(|i| format!("sublearn-worker-{}", i))
            .build()?;

        tracing::debug!("Batch pool ready with {} workers", pool.current_num_threads());
        Ok(Self { settings, pool })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Process all jobs, returning one result per job in input order.
    pub fn process(&self, jobs: &[BatchJob]) -> Vec<FileResult> {
        tracing::info!(
            "Processing {} files on {} workers",
            jobs.len(),
            self.worker_count()
        );

        let results: Vec<FileResult> = self
            .pool
            .install(|| jobs.par_iter().map(|job| self.process_job(job)).collect());

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "Batch finished: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );
        results
    }

    /// Process a single job.
    pub fn process_job(&self, job: &BatchJob) -> FileResult {
        let logger = self.create_logger(&job.name);
        if let Some(logger) = &logger {
            logger.phase(&job.name);
        }

        let outcome = match pipeline::run_to_file(&job.input, &self.settings, &job.output_path) {
            Ok(output) => {
                if let Some(logger) = &logger {
                    logger.info(&format!("Strategy: {}", output.strategy.name()));
                    for diagnostic in output.diagnostics.iter() {
                        logger.diagnostic(diagnostic);
                    }
                    logger.success(&format!(
                        "{} events written to {}",
                        output.event_count,
                        job.output_path.display()
                    ));
                }
                Ok(FileSummary {
                    strategy: output.strategy,
                    event_count: output.event_count,
                    diagnostics: output.diagnostics,
                })
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("{}: {}", job.name, message);
                if let Some(logger) = &logger {
                    logger.error(&message);
                    logger.show_tail("pipeline");
                }
                Err(message)
            }
        };

        FileResult {
            name: job.name.clone(),
            output_path: job.output_path.clone(),
            outcome,
        }
    }

    fn create_logger(&self, name: &str) -> Option<JobLogger> {
        if !self.settings.logging.per_file_logs {
            return None;
        }

        let config = LogConfig::from_settings(&self.settings.logging);
        match JobLogger::new(name, &self.settings.paths.logs_folder, config, None) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!("No per-file log for {}: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Provenance;
    use crate::pipeline::TrackSource;
    use crate::track::Role;
    use std::fs;
    use tempfile::tempdir;

    const ORIGINAL: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,000 --> 00:00:04,000\nWorld\n";
    const DUB: &str = "1\n00:00:00,100 --> 00:00:02,100\nSzia\n\n2\n00:00:02,300 --> 00:00:04,300\nVilág\n";

    fn input(dub: &str) -> PipelineInput {
        PipelineInput {
            original: TrackSource::new(ORIGINAL, "en", Provenance::TitleSearched),
            dub: TrackSource::new(dub, "hu", Provenance::TitleSearched),
            native: None,
        }
    }

    fn settings(workers: usize) -> Settings {
        let mut settings = Settings::default();
        settings.batch.workers = workers;
        settings
    }

    #[test]
    fn worker_count_follows_settings() {
        let processor = BatchProcessor::new(settings(2)).unwrap();
        assert_eq!(processor.worker_count(), 2);
    }

    #[test]
    fn invalid_settings_fail_before_pool_setup() {
        let mut bad = settings(1);
        bad.compose.layout = vec![Role::Original, Role::Original, Role::Dub];

        let err = BatchProcessor::new(bad).err().unwrap();
        assert!(matches!(err, BatchError::InvalidSettings(_)));
    }

    #[test]
    fn processes_all_files_in_order() {
        let dir = tempdir().unwrap();
        let processor = BatchProcessor::new(settings(3)).unwrap();

        let jobs: Vec<_> = (0..5)
            .map(|i| {
                BatchJob::new(
                    format!("ep{}", i),
                    input(DUB),
                    dir.path().join(format!("ep{}.ass", i)),
                )
            })
            .collect();

        let results = processor.process(&jobs);

        assert_eq!(results.len(), 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.name, format!("ep{}", i));
            assert!(result.is_success());
            assert!(result.output_path.exists());
        }
    }

    #[test]
    fn failure_does_not_affect_siblings() {
        let dir = tempdir().unwrap();
        let processor = BatchProcessor::new(settings(2)).unwrap();

        let jobs = vec![
            BatchJob::new("good1", input(DUB), dir.path().join("good1.ass")),
            BatchJob::new("empty_dub", input(""), dir.path().join("bad.ass")),
            BatchJob::new("good2", input(DUB), dir.path().join("good2.ass")),
        ];

        let results = processor.process(&jobs);

        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[1].error().unwrap().contains("timing master"));
        assert!(!dir.path().join("bad.ass").exists());
        assert!(results[2].is_success());
        assert_eq!(results[2].outcome.as_ref().unwrap().event_count, 4);
    }

    #[test]
    fn per_file_logs_are_written() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let mut settings = settings(1);
        settings.logging.per_file_logs = true;
        settings.paths.logs_folder = logs.to_string_lossy().into_owned();
        let processor = BatchProcessor::new(settings).unwrap();

        let jobs = vec![
            BatchJob::new("ok", input(DUB), dir.path().join("ok.ass")),
            BatchJob::new("broken", input(""), dir.path().join("broken.ass")),
        ];
        let results = processor.process(&jobs);
        drop(processor);

        assert_eq!(results.len(), 2);
        let ok_log = fs::read_to_string(logs.join("ok.log")).unwrap();
        assert!(ok_log.contains("[SUCCESS] 4 events written"));
        let broken_log = fs::read_to_string(logs.join("broken.log")).unwrap();
        assert!(broken_log.contains("[ERROR]"));
        assert!(broken_log.contains("[pipeline/tail]"));
    }

    #[test]
    fn job_for_video_names_output() {
        let job = BatchJob::for_video("/media/show/ep01.mkv", input(DUB), &Settings::default());

        assert_eq!(job.name, "ep01");
        assert_eq!(job.output_path, PathBuf::from("/media/show/ep01.sublearn.ass"));
    }
}
