//! # CLI Module
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # List duplicates without touching anything
//! image-dedup scan ~/Pictures --mode list-only
//!
//! # Keep the first image of every group, delete the rest
//! image-dedup scan ~/Pictures --mode auto-keep-first
//!
//! # Pick the survivor of each group by hand
//! image-dedup scan ~/Pictures --mode interactive
//!
//! # Print the run report as JSON
//! image-dedup scan ~/Pictures --mode list-only --output json
//! ```
//!
//! A missing directory or mode is asked for interactively. Declining to
//! answer cancels the run.

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dialoguer::{Input, Select};
use image_dedup::core::pipeline::{Pipeline, PipelineResult};
use image_dedup::core::{ComparatorConfig, DuplicateGroup, GroupingMode, RetentionPolicy};
use image_dedup::core::resolver::KeepChooser;
use image_dedup::error::{DedupError, ReportError, Result};
use image_dedup::events::{
    CompareEvent, Event, EventChannel, PipelineEvent, PipelinePhase, ResolveEvent, ScanEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::warn;

/// Image Dedup - Find and clean up visually duplicate images
#[derive(Parser, Debug)]
#[command(name = "image-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory for duplicate images
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan (prompted for when omitted)
    directory: Option<PathBuf>,

    /// What to do with each duplicate group (prompted for when omitted)
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Directory the JSON run report is written to
    #[arg(long, default_value = "dedup-reports")]
    report_dir: PathBuf,

    /// Per-channel tolerance, as a fraction of the full range (0-1)
    #[arg(long, default_value_t = 0.1)]
    tolerance: f64,

    /// Largest number of differing pixels still counted as a duplicate
    #[arg(long, default_value_t = 200)]
    max_diff_pixels: u64,

    /// Width of the comparison envelope
    #[arg(long, default_value_t = 800)]
    max_width: u32,

    /// Height of the comparison envelope
    #[arg(long, default_value_t = 533)]
    max_height: u32,

    /// How duplicates are clustered
    #[arg(short, long, default_value = "anchor")]
    grouping: Grouping,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    exclude_hidden: bool,

    /// Never prompt; missing arguments cancel the run
    #[arg(long)]
    no_input: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Report duplicates, delete nothing
    ListOnly,
    /// Ask which image of each group to keep
    Interactive,
    /// Keep the first image of each group
    AutoKeepFirst,
}

impl Mode {
    const ALL: [Mode; 3] = [Mode::ListOnly, Mode::Interactive, Mode::AutoKeepFirst];

    fn label(self) -> &'static str {
        match self {
            Mode::ListOnly => "list-only        (report only)",
            Mode::Interactive => "interactive      (choose a keeper per group)",
            Mode::AutoKeepFirst => "auto-keep-first  (keep the first, delete the rest)",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grouping {
    /// Members must match the group's first image
    Anchor,
    /// Any chain of matches joins a group
    Connected,
}

impl From<Grouping> for GroupingMode {
    fn from(grouping: Grouping) -> Self {
        match grouping {
            Grouping::Anchor => GroupingMode::Anchor,
            Grouping::Connected => GroupingMode::Connected,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// The JSON run report on stdout
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            image_dedup::init_tracing(args.verbose);
            run_scan(args)
        }
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(args.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Image Dedup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let directory = resolve_directory(args.directory, args.no_input)?;
    let mode = resolve_mode(args.mode, args.no_input)?;

    if mode == Mode::Interactive && args.no_input {
        return Err(DedupError::Config(
            "interactive mode cannot be combined with --no-input".to_string(),
        ));
    }

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let policy = match mode {
        Mode::ListOnly => RetentionPolicy::ListOnly,
        Mode::AutoKeepFirst => RetentionPolicy::AutoKeepFirst,
        Mode::Interactive => RetentionPolicy::interactive(DialoguerChooser {
            progress: progress.clone(),
        }),
    };

    let comparator = ComparatorConfig::new()
        .envelope(args.max_width, args.max_height)
        .pixel_tolerance(args.tolerance)
        .max_differing_pixels(args.max_diff_pixels);

    let mut pipeline = Pipeline::builder()
        .directory(&directory)
        .recursive(args.recursive)
        .include_hidden(!args.exclude_hidden)
        .comparator(comparator)
        .grouping_mode(args.grouping.into())
        .policy(policy)
        .report_dir(&args.report_dir)
        .build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let progress_clone = progress.clone();
    let verbose = args.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if phase == PipelinePhase::Resolving {
                        pb.finish_and_clear();
                    } else {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Scan(ScanEvent::Completed { total_candidates }) => {
                    pb.set_length(total_candidates as u64);
                }
                Event::Compare(CompareEvent::Progress(p)) => {
                    pb.set_position(p.candidates_settled as u64);
                    pb.set_message(format!("{} groups", p.groups_found));
                }
                Event::Compare(CompareEvent::Unreadable { path, message }) if verbose => {
                    pb.println(format!(
                        "  {} {}: {}",
                        style("!").yellow(),
                        display_path(&path),
                        message
                    ));
                }
                Event::Resolve(ResolveEvent::DeletionFailed { path, message }) => {
                    pb.println(format!(
                        "  {} could not delete {}: {}",
                        style("✗").red(),
                        display_path(&path),
                        message
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, verbose),
        OutputFormat::Json => print_json_results(&result)?,
    }

    Ok(())
}

fn resolve_directory(directory: Option<PathBuf>, no_input: bool) -> Result<PathBuf> {
    if let Some(directory) = directory {
        return Ok(directory);
    }
    if no_input {
        return Err(DedupError::Cancelled);
    }

    let answer: String = Input::new()
        .with_prompt("Directory to scan")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(DedupError::Cancelled);
    }
    Ok(PathBuf::from(answer))
}

fn resolve_mode(mode: Option<Mode>, no_input: bool) -> Result<Mode> {
    if let Some(mode) = mode {
        return Ok(mode);
    }
    if no_input {
        return Err(DedupError::Cancelled);
    }

    let labels: Vec<&str> = Mode::ALL.iter().map(|m| m.label()).collect();
    let selection = Select::new()
        .with_prompt("What should happen to duplicates?")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    selection
        .map(|index| Mode::ALL[index])
        .ok_or(DedupError::Cancelled)
}

/// No terminal, end of input or an interrupt all mean the question went
/// unanswered.
fn prompt_error(error: dialoguer::Error) -> DedupError {
    match error {
        dialoguer::Error::IO(e)
            if matches!(
                e.kind(),
                ErrorKind::NotConnected | ErrorKind::UnexpectedEof | ErrorKind::Interrupted
            ) =>
        {
            DedupError::Cancelled
        }
        other => DedupError::Prompt(other.to_string()),
    }
}

/// Asks on the terminal which member of each group survives
struct DialoguerChooser {
    progress: Option<ProgressBar>,
}

impl DialoguerChooser {
    fn prompt(group: &DuplicateGroup) -> Option<PathBuf> {
        let mut items: Vec<String> = group.members.iter().map(|p| display_path(p)).collect();
        items.push("Keep all".to_string());

        let selection = Select::new()
            .with_prompt(format!(
                "Keep which image? ({} matches, {})",
                group.len(),
                group.match_kind
            ))
            .items(&items)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(index)) => group.members.get(index).cloned(),
            Ok(None) => None,
            Err(e) => {
                warn!(group = %group.id, error = %e, "prompt failed; keeping all");
                None
            }
        }
    }
}

impl KeepChooser for DialoguerChooser {
    fn choose_keep(&mut self, group: &DuplicateGroup) -> Option<PathBuf> {
        match &self.progress {
            Some(pb) => pb.suspend(|| Self::prompt(group)),
            None => Self::prompt(group),
        }
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_candidates).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups found",
        style(result.groups.len()).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate images",
        style(result.report.duplicate_count()).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} files deleted",
        style(result.deleted_count()).yellow()
    ))
    .ok();

    if result.failed_count() > 0 {
        term.write_line(&format!(
            "  {} deletions failed",
            style(result.failed_count()).red()
        ))
        .ok();
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!(
            "{}",
            style("Duplicate Groups:").bold().underlined()
        ))
        .ok();
        term.write_line("").ok();

        for (i, (group, outcome)) in result.groups.iter().zip(&result.outcomes).enumerate() {
            term.write_line(&format!(
                "  {} {} ({} images)",
                style(format!("Group {}:", i + 1)).bold(),
                style(format!("{}", group.match_kind)).yellow(),
                group.len(),
            ))
            .ok();

            for member in &group.members {
                let marker = if outcome.keep.as_deref() == Some(member.as_path()) {
                    style("★").green().to_string()
                } else if outcome.deleted.contains(member) {
                    style("✗").red().to_string()
                } else {
                    style("○").dim().to_string()
                };

                term.write_line(&format!("    {} {}", marker, display_path(member)))
                    .ok();
            }

            if verbose {
                for failure in &outcome.failed {
                    term.write_line(&format!(
                        "    {} {}",
                        style("Failed:").red(),
                        style(&failure.error).dim()
                    ))
                    .ok();
                }
            }

            term.write_line("").ok();
        }
    }

    term.write_line(&format!(
        "{} {}",
        style("Report:").dim(),
        display_path(&result.report_path)
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&result.report).map_err(ReportError::from)?;
    println!("{}", json);
    Ok(())
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|relative| format!("~/{}", relative.display()))
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn missing_directory_without_input_is_cancelled() {
        assert!(matches!(
            resolve_directory(None, true),
            Err(DedupError::Cancelled)
        ));
    }

    #[test]
    fn missing_mode_without_input_is_cancelled() {
        assert!(matches!(resolve_mode(None, true), Err(DedupError::Cancelled)));
    }

    #[test]
    fn supplied_values_pass_through() {
        let dir = PathBuf::from("/photos/vacation");
        assert_eq!(resolve_directory(Some(dir.clone()), true).unwrap(), dir);
        assert_eq!(
            resolve_mode(Some(Mode::AutoKeepFirst), true).unwrap(),
            Mode::AutoKeepFirst
        );
    }

    #[test]
    fn unanswerable_prompt_is_cancelled() {
        for kind in [ErrorKind::NotConnected, ErrorKind::UnexpectedEof, ErrorKind::Interrupted] {
            let error = dialoguer::Error::IO(io::Error::new(kind, "no answer"));
            assert!(matches!(prompt_error(error), DedupError::Cancelled));
        }
    }

    #[test]
    fn other_prompt_failures_are_errors() {
        let error = dialoguer::Error::IO(io::Error::new(ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(prompt_error(error), DedupError::Prompt(_)));
    }

    #[test]
    fn cli_accepts_every_mode() {
        let cli = Cli::try_parse_from([
            "image-dedup",
            "scan",
            "/photos",
            "--mode",
            "auto-keep-first",
            "--grouping",
            "connected",
        ])
        .unwrap();

        let Commands::Scan(args) = cli.command;
        assert_eq!(args.directory, Some(PathBuf::from("/photos")));
        assert_eq!(args.mode, Some(Mode::AutoKeepFirst));
        assert!(matches!(args.grouping, Grouping::Connected));
        assert_eq!(args.max_diff_pixels, 200);
    }
}
