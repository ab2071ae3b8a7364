//! Command line driver: extract statistics from a font corpus and write
//! them as JSON for plotting.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use font_census::stats::{
    sample_stride, CommandBreakdown, CountDistribution, LogHistogram, COMMAND_LABELS,
};
use font_census::{
    build, discover, extract, reduce, BuildError, CodePointSet, CorpusConfig, CorpusError,
    ReducedMatrix, ReductionPolicy,
};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CorpusArgs {
    /// Font files or directories to search (may use glob syntax)
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Skip fonts whose path contains this keyword (repeatable)
    #[arg(long, default_value = "adobeblank")]
    exclude: Vec<String>,
    /// Number of worker threads, defaults to one per core
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Directory for the JSON reports, or `-` for stdout
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

impl CorpusArgs {
    fn config(&self) -> CorpusConfig {
        CorpusConfig {
            inputs: self.files.clone(),
            exclude: self.exclude.clone(),
            jobs: self.jobs,
            ..Default::default()
        }
    }
}

#[derive(clap::Args, Debug)]
struct CoverageArgs {
    /// Only count code points below this value (e.g. 0x10000 for the BMP)
    #[arg(long, value_parser = parse_codepoint)]
    limit: Option<u32>,
    /// Crop to the densest square (the default when no policy is given)
    #[arg(long)]
    square: bool,
    /// Keep code points at or below this value (repeatable)
    #[arg(long, value_parser = parse_codepoint)]
    threshold: Vec<u32>,
    /// Keep this many of the most supported code points, sorting them twice
    /// (repeatable)
    #[arg(long)]
    rank: Vec<usize>,
    /// Keep this many of the most supported code points (repeatable)
    #[arg(long)]
    top: Vec<usize>,
}

impl CoverageArgs {
    fn policies(&self) -> Vec<ReductionPolicy> {
        let mut policies = Vec::new();
        if self.square {
            policies.push(ReductionPolicy::SquareCrop);
        }
        policies.extend(
            self.threshold
                .iter()
                .map(|max_codepoint| ReductionPolicy::CodePointThreshold {
                    max_codepoint: *max_codepoint,
                }),
        );
        policies.extend(
            self.rank
                .iter()
                .map(|max_columns| ReductionPolicy::RankThreshold {
                    max_columns: *max_columns,
                }),
        );
        policies.extend(
            self.top
                .iter()
                .map(|k| ReductionPolicy::TopKColumns { k: *k }),
        );
        if policies.is_empty() {
            policies.push(ReductionPolicy::SquareCrop);
        }
        policies
    }
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Build the coverage matrix and write one reduced matrix per policy
    Coverage {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[command(flatten)]
        coverage: CoverageArgs,
    },
    /// Count fonts per units-per-em value
    Upem {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Count fonts per OS/2 weight class
    Weights {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Histogram of outline commands per glyph
    OutlineLengths {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of log-spaced bins
        #[arg(long, default_value_t = 64)]
        bins: usize,
    },
    /// Average outline commands per glyph, by command kind
    OutlineCommands {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// A subsample of all outline points, in em units
    OutlineCoords {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Fraction of points to keep
        #[arg(long, default_value_t = 0.001)]
        ratio: f64,
    },
    /// Every report with default settings
    All {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to write {}: {}", .0.display(), .1)]
    Write(PathBuf, #[source] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_codepoint(arg: &str) -> Result<u32, String> {
    let hex = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .or_else(|| arg.strip_prefix("U+"))
        .or_else(|| arg.strip_prefix("u+"));
    let parsed = match hex {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => arg.parse(),
    };
    parsed.map_err(|err| format!("invalid code point '{arg}': {err}"))
}

#[derive(Serialize)]
struct CoverageReport<'a> {
    policy: String,
    /// Fonts in the corpus, before reduction.
    fonts: usize,
    rows: usize,
    columns: usize,
    /// The font of each row, top to bottom.
    row_fonts: Vec<&'a Path>,
    /// The code point of each column, left to right.
    codepoints: &'a [u32],
    /// `(column, row)` of every supported cell.
    points: Vec<(usize, usize)>,
}

impl<'a> CoverageReport<'a> {
    fn new(policy: ReductionPolicy, fonts: &'a [PathBuf], reduced: &'a ReducedMatrix) -> Self {
        Self {
            policy: policy.to_string(),
            fonts: fonts.len(),
            rows: reduced.row_count(),
            columns: reduced.column_count(),
            row_fonts: reduced
                .font_rows()
                .iter()
                .map(|row| fonts[*row].as_path())
                .collect(),
            codepoints: reduced.codepoints(),
            points: reduced.points().collect(),
        }
    }
}

#[derive(Serialize)]
struct CommandReport {
    labels: [&'static str; 5],
    per_glyph: [f64; 5],
    #[serde(flatten)]
    breakdown: CommandBreakdown,
}

#[derive(Serialize)]
struct CoordinateReport {
    total: usize,
    ratio: f64,
    points: Vec<[f32; 2]>,
}

struct Reporter {
    output: PathBuf,
}

impl Reporter {
    fn write(&self, stem: &str, report: &impl Serialize) -> Result<(), CliError> {
        if self.output == Path::new("-") {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer(&mut stdout, report)?;
            writeln!(stdout).map_err(|err| CliError::Write(self.output.clone(), err))?;
            return Ok(());
        }
        std::fs::create_dir_all(&self.output)
            .map_err(|err| CliError::Write(self.output.clone(), err))?;
        let path = self.output.join(format!("{stem}.json"));
        let json = serde_json::to_vec_pretty(report)?;
        std::fs::write(&path, json).map_err(|err| CliError::Write(path.clone(), err))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

fn coverage(
    paths: &[PathBuf],
    corpus: &CorpusArgs,
    args: &CoverageArgs,
    reporter: &Reporter,
) -> Result<(), CliError> {
    let limit = args.limit;
    let extraction = extract(paths, corpus.jobs, |font| font.code_points(limit))?;
    let sets: &[CodePointSet] = &extraction.values;
    let (matrix, index) = build(sets)?;
    for policy in args.policies() {
        let reduced = reduce(&matrix, &index, policy);
        if reduced.is_empty() {
            log::warn!("{policy} reduction left nothing to render");
        }
        let report = CoverageReport::new(policy, &extraction.fonts, &reduced);
        reporter.write(&format!("coverage-{policy}"), &report)?;
    }
    Ok(())
}

fn upem(paths: &[PathBuf], corpus: &CorpusArgs, reporter: &Reporter) -> Result<(), CliError> {
    let extraction = extract(paths, corpus.jobs, |font| font.units_per_em())?;
    let distribution: CountDistribution<u16> = extraction.values.into_iter().collect();
    reporter.write("upem", &distribution)
}

fn weights(paths: &[PathBuf], corpus: &CorpusArgs, reporter: &Reporter) -> Result<(), CliError> {
    let extraction = extract(paths, corpus.jobs, |font| font.weight_class())?;
    let distribution: CountDistribution<u16> = extraction.values.into_iter().collect();
    reporter.write("weights", &distribution)
}

fn outline_lengths(
    paths: &[PathBuf],
    corpus: &CorpusArgs,
    bins: usize,
    reporter: &Reporter,
) -> Result<(), CliError> {
    let extraction = extract(paths, corpus.jobs, |font| font.glyph_command_counts())?;
    let counts: Vec<u32> = extraction.values.into_iter().flatten().collect();
    reporter.write("outline-lengths", &LogHistogram::new(&counts, bins))
}

fn outline_commands(
    paths: &[PathBuf],
    corpus: &CorpusArgs,
    reporter: &Reporter,
) -> Result<(), CliError> {
    let extraction = extract(paths, corpus.jobs, |font| font.command_breakdown())?;
    let mut breakdown = CommandBreakdown::default();
    for font in &extraction.values {
        breakdown.merge(font);
    }
    let report = CommandReport {
        labels: COMMAND_LABELS,
        per_glyph: breakdown.per_glyph(),
        breakdown,
    };
    reporter.write("outline-commands", &report)
}

fn outline_coords(
    paths: &[PathBuf],
    corpus: &CorpusArgs,
    ratio: f64,
    reporter: &Reporter,
) -> Result<(), CliError> {
    let extraction = extract(paths, corpus.jobs, |font| font.outline_coordinates())?;
    let points: Vec<[f32; 2]> = extraction.values.into_iter().flatten().collect();
    let report = CoordinateReport {
        total: points.len(),
        ratio,
        points: sample_stride(&points, ratio),
    };
    reporter.write("outline-coords", &report)
}

fn run(command: Command) -> Result<(), CliError> {
    let corpus = match &command {
        Command::Coverage { corpus, .. }
        | Command::Upem { corpus }
        | Command::Weights { corpus }
        | Command::OutlineLengths { corpus, .. }
        | Command::OutlineCommands { corpus }
        | Command::OutlineCoords { corpus, .. }
        | Command::All { corpus } => corpus,
    };
    let paths = discover(&corpus.config())?;
    let reporter = Reporter {
        output: corpus.output.clone(),
    };
    match &command {
        Command::Coverage { coverage: args, .. } => coverage(&paths, corpus, args, &reporter),
        Command::Upem { .. } => upem(&paths, corpus, &reporter),
        Command::Weights { .. } => weights(&paths, corpus, &reporter),
        Command::OutlineLengths { bins, .. } => {
            outline_lengths(&paths, corpus, *bins, &reporter)
        }
        Command::OutlineCommands { .. } => outline_commands(&paths, corpus, &reporter),
        Command::OutlineCoords { ratio, .. } => outline_coords(&paths, corpus, *ratio, &reporter),
        Command::All { .. } => {
            let bmp = CoverageArgs {
                limit: Some(0x10000),
                square: true,
                threshold: Vec::new(),
                rank: Vec::new(),
                top: Vec::new(),
            };
            outline_lengths(&paths, corpus, 64, &reporter)?;
            outline_coords(&paths, corpus, 0.001, &reporter)?;
            outline_commands(&paths, corpus, &reporter)?;
            coverage(&paths, corpus, &bmp, &reporter)?;
            upem(&paths, corpus, &reporter)?;
            weights(&paths, corpus, &reporter)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse_from(wild::args());
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
