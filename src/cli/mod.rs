//! # CLI Module
//!
//! Command-line interface for the histogram sorter.
//!
//! ## Usage
//! ```bash
//! # Sort images into ./sorted
//! imgsort a.jpg b.jpg c.png
//!
//! # Finer histograms, four workers, custom output folder
//! imgsort shots/*.jpg --bins 32 --threads 4 --path ~/ordered
//!
//! # Skip unreadable files and just print the order
//! imgsort shots/ --ignore-errors --dry-run --output minimal
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use histogram_sorter::core::comparator::HistogramMetric;
use histogram_sorter::core::output::OperationMode;
use histogram_sorter::core::pipeline::{SortResult, Sorter};
use histogram_sorter::error::{OutputError, Result};
use histogram_sorter::events::{
    Event, EventChannel, ExtractEvent, OutputEvent, PipelineEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;

/// Sort images so that similar colours end up next to each other
#[derive(Parser, Debug)]
#[command(name = "imgsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input images (directories expand to the images they contain)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Output directory for sorted images
    #[arg(short, long, value_name = "PATH", default_value = "sorted")]
    path: PathBuf,

    /// Histogram bins per channel (more = finer but slower matching)
    #[arg(short, long, default_value = "10")]
    bins: u32,

    /// Worker threads for reading and comparing images
    #[arg(short, long, default_value = "1")]
    threads: usize,

    /// Skip unreadable images instead of aborting
    #[arg(short, long)]
    ignore_errors: bool,

    /// Histogram comparison metric
    #[arg(short, long, default_value = "intersection")]
    metric: Metric,

    /// Descend into subdirectories of directory arguments
    #[arg(short, long)]
    recursive: bool,

    /// Follow symlinked directories when recursing
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Include hidden files when expanding directories
    #[arg(long)]
    include_hidden: bool,

    /// Move images instead of copying them
    #[arg(long = "move")]
    move_files: bool,

    /// Compute and print the order without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Report format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Metric {
    /// Shared colour mass (default)
    Intersection,
    /// Symmetric chi-square
    ChiSquare,
    /// Bhattacharyya / Hellinger distance
    Bhattacharyya,
    /// One minus Pearson correlation
    Correlation,
}

impl From<Metric> for HistogramMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Intersection => HistogramMetric::Intersection,
            Metric::ChiSquare => HistogramMetric::ChiSquare,
            Metric::Bhattacharyya => HistogramMetric::Bhattacharyya,
            Metric::Correlation => HistogramMetric::Correlation,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (sorted paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    histogram_sorter::init_tracing(default_log_level(cli.verbose, cli.output));

    let term = Term::stderr();

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Histogram Sorter").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let metric: HistogramMetric = cli.metric.into();
    let sorter = Sorter::builder()
        .paths(cli.images.clone())
        .output_dir(cli.path.clone())
        .bins(cli.bins)
        .threads(cli.threads)
        .metric(metric)
        .ignore_errors(cli.ignore_errors)
        .operation(if cli.move_files {
            OperationMode::Move
        } else {
            OperationMode::Copy
        })
        .dry_run(cli.dry_run)
        .recursive(cli.recursive)
        .follow_symlinks(cli.follow_symlinks)
        .include_hidden(cli.include_hidden)
        .build();

    let (sender, receiver) = EventChannel::new();

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

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_position(0);
                    pb.set_message(format!("{}", phase));
                }
                Event::Extract(ExtractEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Extract(ExtractEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Extract(ExtractEvent::Skipped { path, message }) => {
                    pb.println(format!(
                        "  {} skipped {}: {}",
                        style("!").yellow(),
                        display_path(&path),
                        message
                    ));
                }
                Event::Output(OutputEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Output(OutputEvent::Progress { completed, .. }) => {
                    pb.set_position(completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = sorter.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, &cli.path, verbose),
        OutputFormat::Json => print_json_results(&result, metric),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    let failed = result.output_failures();
    if failed > 0 {
        return Err(OutputError::Incomplete {
            failed,
            total: result.order.len(),
        }
        .into());
    }

    Ok(())
}

/// Pretty mode reports skips and write failures itself, so warnings
/// would only repeat them around the progress bar.
fn default_log_level(verbose: bool, format: OutputFormat) -> &'static str {
    match (verbose, format) {
        (true, _) => "debug",
        (false, OutputFormat::Pretty) => "error",
        (false, _) => "warn",
    }
}

fn print_pretty_results(term: &Term, result: &SortResult, out_dir: &Path, verbose: bool) {
    term.write_line(&format!("{} Sort Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} of {} images sequenced in {:.1}s",
        style(result.order.len()).cyan(),
        result.total_images,
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} total distance along the sequence",
        style(format!("{:.3}", result.total_distance)).cyan()
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} unreadable images skipped",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    match &result.output {
        Some(output) => {
            term.write_line(&format!(
                "  {} files written to {}",
                style(output.written.len()).cyan(),
                display_path(out_dir)
            ))
            .ok();

            if output.existing_entries > 0 {
                term.write_line(&format!(
                    "  {} {} files from earlier runs are still in the folder",
                    style("!").yellow(),
                    output.existing_entries
                ))
                .ok();
            }

            for failure in &output.failures {
                term.write_line(&format!(
                    "    {} {}: {}",
                    style("✗").red(),
                    display_path(&failure.source),
                    failure.message
                ))
                .ok();
            }
        }
        None => {
            term.write_line(&format!("  {}", style("Dry run: nothing written").dim()))
                .ok();
        }
    }

    if verbose || result.output.is_none() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Order:").bold().underlined()))
            .ok();
        let width = result.order.len().to_string().len();
        for (i, path) in result.order.iter().enumerate() {
            term.write_line(&format!(
                "  {} {}",
                style(format!("{:>width$}.", i + 1, width = width)).dim(),
                display_path(path)
            ))
            .ok();
        }
    }
}

fn print_json_results(result: &SortResult, metric: HistogramMetric) {
    let output = serde_json::json!({
        "total_images": result.total_images,
        "sequenced": result.order.len(),
        "metric": metric.to_string(),
        "total_distance": result.total_distance,
        "duration_ms": result.duration_ms,
        "order": result.order,
        "skipped": result.skipped,
        "written": result.output.as_ref().map(|o| &o.written),
        "failures": result.output.as_ref().map(|o| &o.failures),
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to render JSON report: {}", e),
    }
}

fn print_minimal_results(result: &SortResult) {
    for path in &result.order {
        println!("{}", path.display());
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
