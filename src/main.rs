use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use snapstat_core::{BenchConfig, DiffConfig, DirsConfig, OutputFormat, SnapstatConfig, SnapstatError};
use snapstat_difflens::{
    discover_snapshots, scan_snapshot, CodeClassifier, DiffCollector, DirectorySnapshot,
    DiscoverOptions, VersionReport,
};
use snapstat_report::{to_json, CsvWriter};
use snapstat_stats::bench::find_inputs;
use snapstat_stats::{aggregate, summary_record, BenchmarkReader, GroupSummary, TailPolicy, VersionLabeler};

const CONFIG_FILE: &str = ".snapstat.toml";

#[derive(Parser)]
#[command(
    name = "snapstat",
    version,
    about = "Benchmark confidence intervals and snapshot diff statistics",
    long_about = "Snapstat summarizes benchmark runs and source-tree snapshots as CSV.\n\n\
                   Examples:\n  \
                     snapstat bench                           Aggregate Algorithm_benchmark_*.csv\n  \
                     snapstat bench --input runs.csv --confidence 0.99\n  \
                     snapstat dirs --pattern 'srsRAN-release_*'  Compare release directories\n  \
                     snapstat init                            Write a default .snapstat.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .snapstat.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for results printed to stdout.\n\n\
                       Formats:\n  \
                         text  Short summary (default)\n  \
                         json  Computed rows as JSON with camelCase keys\n\n\
                       The CSV file is written in both cases."
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate benchmark samples per version with confidence intervals
    #[command(long_about = "Aggregate benchmark samples per version with confidence intervals.\n\n\
        Reads rows of `version, metric...` that are already grouped by version and\n\
        writes one row per version with the mean and Student-t confidence half-width\n\
        of every metric.\n\n\
        Examples:\n  snapstat bench\n  snapstat bench --input Algorithm_benchmark_1.csv --output ci.csv")]
    Bench {
        /// Benchmark CSV (default: the single file matching bench.input_pattern)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Confidence level in (0, 1) (default: 0.95)
        #[arg(long)]
        confidence: Option<f64>,

        /// Also emit a final version that has only one sample
        #[arg(long)]
        emit_trailing_singleton: bool,
    },
    /// Compare consecutive snapshot directories
    #[command(long_about = "Compare consecutive snapshot directories.\n\n\
        Each directory holds one version of a source tree. Every directory is scanned\n\
        for file counts and sizes, then diffed against the one before it with\n\
        `git diff --no-index --numstat`. The first directory has no predecessor and\n\
        reports N/A for all change columns.\n\n\
        Examples:\n  snapstat dirs --pattern 'srsRAN-release_*'\n  snapstat dirs --dir v1 --dir v2 --output changes.csv")]
    Dirs {
        /// Directory containing the snapshots
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Glob matched against directory names under --root
        #[arg(long)]
        pattern: Option<String>,

        /// Explicit snapshot directory relative to --root, in order (repeatable)
        #[arg(long)]
        dir: Vec<PathBuf>,

        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Process discovered directories in reverse name order
        #[arg(long)]
        reverse: bool,
    },
    /// Create a default .snapstat.toml configuration file
    #[command(long_about = "Create a default .snapstat.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .snapstat.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Snapstat Configuration

[bench]
# input_pattern = "Algorithm_benchmark_*.csv"
# output = "Algorithm_benchmark_CI_output.csv"
# confidence = 0.95
# columns = ["Construct leaves (ms)", "Form tree (ms)", "Generate proof (ms)", "Verify proof (ms)", "Number of files"]
# version_pattern = ".*bitcoin-([^/]+)"
# version_prefix = "v"
# emit_trailing_singleton = false

[dirs]
# pattern = "*"
# sort_suffix = "_zzz"
# code_extensions = ["cpp", "py", "c", "h", "sh", "go", "js", "java"]
# version_header = "Version"
# output = "logDirectoryOutput.csv"
# reverse = false

[diff]
# program = "git"
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SnapstatConfig> {
    let config = match path {
        Some(path) => SnapstatConfig::from_file(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                SnapstatConfig::from_file(default_path)?
            } else {
                SnapstatConfig::default()
            }
        }
    };
    Ok(config)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(format = %cli.format, "starting");

    match cli.command {
        Command::Bench {
            input,
            output,
            confidence,
            emit_trailing_singleton,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(output) = output {
                config.bench.output = output;
            }
            if let Some(confidence) = confidence {
                config.bench.confidence = confidence;
            }
            if emit_trailing_singleton {
                config.bench.emit_trailing_singleton = true;
            }
            config.validate()?;
            run_bench(&config.bench, input, cli.format)?;
        }
        Command::Dirs {
            root,
            pattern,
            dir,
            output,
            reverse,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(pattern) = pattern {
                config.dirs.pattern = pattern;
            }
            if let Some(output) = output {
                config.dirs.output = output;
            }
            if reverse {
                config.dirs.reverse = true;
            }
            config.validate()?;
            run_dirs(&config.dirs, &config.diff, &root, &dir, cli.format)?;
        }
        Command::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "snapstat", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Pick the benchmark input: the explicit path, or the only match of the
/// configured pattern in the working directory.
fn resolve_bench_input(config: &BenchConfig, input: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(input) = input {
        if !input.is_file() {
            return Err(SnapstatError::FileNotFound(input).into());
        }
        return Ok(Some(input));
    }

    let mut found = find_inputs(Path::new("."), &config.input_pattern)?;
    // The default output name matches the default input pattern.
    if let Ok(output) = std::fs::canonicalize(&config.output) {
        found.retain(|p| !matches!(std::fs::canonicalize(p), Ok(p) if p == output));
    }
    if found.len() > 1 {
        let names: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
        miette::bail!(
            "{} files match \"{}\" ({}); choose one with --input",
            found.len(),
            config.input_pattern,
            names.join(", ")
        );
    }
    Ok(found.pop())
}

fn run_bench(config: &BenchConfig, input: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let Some(input) = resolve_bench_input(config, input)? else {
        eprintln!("No files were found that match \"{}\"", config.input_pattern);
        return Ok(());
    };

    let labeler = VersionLabeler::new(config.version_pattern.as_deref(), &config.version_prefix)?;
    let policy = if config.emit_trailing_singleton {
        TailPolicy::Emit
    } else {
        TailPolicy::DropTrailingSingleton
    };

    let file = File::open(&input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open {}", input.display()))?;
    let reader = BenchmarkReader::new(BufReader::new(file), config.columns.len());
    let mut writer = CsvWriter::create(&config.output)?;
    let mut json_rows: Vec<GroupSummary> = Vec::new();

    let written = itertools::process_results(reader, |rows| -> snapstat_core::Result<usize> {
        for summary in aggregate(rows, config.confidence, policy)? {
            writer.write_record(&summary_record(&summary, &config.columns, &labeler))?;
            if format == OutputFormat::Json {
                let key = labeler.label(&summary.key);
                json_rows.push(GroupSummary { key, ..summary });
            }
        }
        Ok(writer.rows_written())
    })
    .wrap_err_with(|| format!("failed to read {}", input.display()))??;
    writer.finish()?;

    tracing::debug!(input = %input.display(), groups = written, "benchmark summary written");
    if format == OutputFormat::Json {
        println!("{}", to_json(&json_rows)?);
    }
    eprintln!("Successfully wrote to \"{}\".", config.output.display());
    Ok(())
}

fn run_dirs(
    config: &DirsConfig,
    diff: &DiffConfig,
    root: &Path,
    explicit: &[PathBuf],
    format: OutputFormat,
) -> Result<()> {
    let snapshots = if explicit.is_empty() {
        let options = DiscoverOptions {
            sort_suffix: config.sort_suffix.clone(),
            reverse: config.reverse,
        };
        discover_snapshots(root, &config.pattern, &options)?
    } else {
        explicit
            .iter()
            .map(|dir| DirectorySnapshot::new(root.join(dir), config.sort_suffix.as_deref()))
            .collect()
    };

    if snapshots.is_empty() {
        eprintln!("No directories were found that match \"{}\"", config.pattern);
        return Ok(());
    }

    if format == OutputFormat::Text {
        println!("List of directories:");
        for (i, snapshot) in snapshots.iter().enumerate() {
            println!("  Directory {}  -  {}", i + 1, snapshot.path.display());
        }
        println!();
    }

    let is_tty = std::io::stderr().is_terminal();
    let progress = if is_tty {
        let pb = indicatif::ProgressBar::new(snapshots.len() as u64);
        pb.set_style(
            indicatif::ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg} ({elapsed})")
                .into_diagnostic()?,
        );
        Some(pb)
    } else {
        None
    };

    let reports = write_dir_reports(config, diff, root, &snapshots, progress.as_ref()).inspect_err(|_e| {
        if let Some(pb) = &progress {
            pb.abandon_with_message("Failed");
        }
    })?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if format == OutputFormat::Json {
        println!("{}", to_json(&reports)?);
    }
    eprintln!("Successfully wrote to \"{}\".", config.output.display());
    Ok(())
}

fn write_dir_reports(
    config: &DirsConfig,
    diff: &DiffConfig,
    root: &Path,
    snapshots: &[DirectorySnapshot],
    progress: Option<&indicatif::ProgressBar>,
) -> Result<Vec<VersionReport>> {
    let classifier = CodeClassifier::new(&config.code_extensions);
    let collector = DiffCollector::git(&diff.program, root, classifier.clone());
    let mut writer = CsvWriter::create(&config.output)?;
    let mut reports = Vec::with_capacity(snapshots.len());

    let mut previous: Option<&DirectorySnapshot> = None;
    for snapshot in snapshots {
        if let Some(pb) = progress {
            pb.set_message(snapshot.label.clone());
        }
        let stats = scan_snapshot(snapshot, &classifier)?;
        let changes = collector
            .diff_stats(previous, snapshot)
            .wrap_err_with(|| format!("failed to compare {}", snapshot.path.display()))?;
        let report = VersionReport::new(snapshot, stats, changes);
        writer.write_record(&report.to_record(&classifier, &config.version_header))?;
        reports.push(report);
        previous = Some(snapshot);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    writer.finish()?;
    Ok(reports)
}
