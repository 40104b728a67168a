//! Pipeline execution implementation.

use crate::core::comparator::{ComparatorConfig, PairwiseComparator};
use crate::core::grouper::{DuplicateGroup, DuplicateGrouper, GroupingMode};
use crate::core::normalizer::ImageNormalizer;
use crate::core::oracle::SimilarityOracle;
use crate::core::reporter::{ReportWriter, RunReport};
use crate::core::resolver::{FileRemover, FsRemover, ResolutionOutcome, Resolver, RetentionPolicy};
use crate::core::scanner::{CandidateScanner, ScanConfig, WalkDirScanner};
use crate::error::Result;
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// All duplicate groups found
    pub groups: Vec<DuplicateGroup>,
    /// One outcome per group, same order
    pub outcomes: Vec<ResolutionOutcome>,
    /// The report that was written
    pub report: RunReport,
    /// Where the report was written
    pub report_path: PathBuf,
    /// Candidate images discovered
    pub total_candidates: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn deleted_count(&self) -> usize {
        self.report.deleted_files.len()
    }

    pub fn failed_count(&self) -> usize {
        self.report.failed_deletions.len()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub directory: PathBuf,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// Comparator thresholds and envelope
    pub comparator: ComparatorConfig,
    /// How duplicates are clustered
    pub grouping_mode: GroupingMode,
    /// Where run reports are written
    pub report_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            scan_config: ScanConfig::default(),
            comparator: ComparatorConfig::default(),
            grouping_mode: GroupingMode::default(),
            report_dir: PathBuf::from("dedup-reports"),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    policy: RetentionPolicy,
    normalizer: Option<Arc<dyn ImageNormalizer>>,
    oracle: Option<Arc<dyn SimilarityOracle>>,
    remover: Option<Box<dyn FileRemover>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory to scan
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Include hidden files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Set comparator configuration
    pub fn comparator(mut self, config: ComparatorConfig) -> Self {
        self.config.comparator = config;
        self
    }

    pub fn grouping_mode(mut self, mode: GroupingMode) -> Self {
        self.config.grouping_mode = mode;
        self
    }

    /// Directory run reports are written to
    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.report_dir = dir.into();
        self
    }

    pub fn policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the image normalizer
    pub fn normalizer(mut self, normalizer: Arc<dyn ImageNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Replace the similarity oracle
    pub fn oracle(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Replace the file remover
    pub fn remover(mut self, remover: Box<dyn FileRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    /// Build the pipeline, validating the comparator configuration
    pub fn build(self) -> Result<Pipeline> {
        let mut comparator = PairwiseComparator::new(self.config.comparator)?;
        if let Some(normalizer) = self.normalizer {
            comparator = comparator.with_normalizer(normalizer);
        }
        if let Some(oracle) = self.oracle {
            comparator = comparator.with_oracle(oracle);
        }

        Ok(Pipeline {
            grouper: DuplicateGrouper::new(comparator, self.config.grouping_mode),
            resolver: Resolver::new(self.remover.unwrap_or_else(|| Box::new(FsRemover))),
            writer: ReportWriter::new(&self.config.report_dir),
            policy: self.policy,
            config: self.config,
        })
    }
}

/// The duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    grouper: DuplicateGrouper,
    resolver: Resolver,
    writer: ReportWriter,
    policy: RetentionPolicy,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&mut self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&mut self, events: &EventSender) -> Result<PipelineResult> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);
        if let Err(ref e) = result {
            error!(error = %e, "run failed");
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(&mut self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();

        // Phase 1: Scanning
        phase(events, PipelinePhase::Scanning);
        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let files = scanner.scan_with_events(&self.config.directory, events)?;
        let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        let total_candidates = paths.len();

        info!(
            directory = %self.config.directory.display(),
            candidates = total_candidates,
            "scan complete"
        );

        // Phase 2: Comparing
        phase(events, PipelinePhase::Comparing);
        let groups = self.grouper.group_files(&paths, events)?;

        // Phase 3: Resolving
        phase(events, PipelinePhase::Resolving);
        let outcomes = self
            .resolver
            .resolve_with_events(&groups, &mut self.policy, events);

        // Phase 4: Reporting
        phase(events, PipelinePhase::Reporting);
        let report = RunReport::new(&groups, &outcomes, Utc::now());
        let report_path = self.writer.write(&report)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_candidates,
                duplicate_groups: groups.len(),
                deleted_files: report.deleted_files.len(),
                failed_deletions: report.failed_deletions.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            groups,
            outcomes,
            report,
            report_path,
            total_candidates,
            duration_ms,
        })
    }
}

fn phase(events: &EventSender, phase: PipelinePhase) {
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}
