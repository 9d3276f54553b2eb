use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use repochunk_indexer::{export, ChunkStats, RepoChunkerConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "repochunk")]
#[command(about = "Split a source repository into metadata-rich text chunks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk every admitted file under a repository root
    Chunk(ChunkArgs),

    /// List admitted files with their language and chunking strategy
    Files(FilesArgs),

    /// Print the default configuration as YAML
    Config(ConfigArgs),
}

#[derive(Args)]
struct ChunkArgs {
    /// Repository root
    root: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Override the configured window size (lines)
    #[arg(long)]
    window_size: Option<usize>,

    /// Override the configured window overlap (lines)
    #[arg(long)]
    overlap_size: Option<usize>,

    /// Chunk files on all cores (output order is unchanged)
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct FilesArgs {
    /// Repository root
    root: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Write the configuration here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum)]
enum OutputFormat {
    /// One pretty-printed JSON array
    Json,
    /// One record per line
    Jsonl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Chunk(args) => run_chunk(args),
        Commands::Files(args) => run_files(args),
        Commands::Config(args) => run_config(args),
    }
}

fn run_chunk(args: ChunkArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(window_size) = args.window_size {
        config.window_size = window_size;
    }
    if let Some(overlap_size) = args.overlap_size {
        config.overlap_size = overlap_size;
    }
    let router = config
        .build_router()
        .context("Invalid configuration")?;

    let writer = open_output(args.output.as_deref())?;
    let root = args.root.as_path();

    let stats: ChunkStats = if args.parallel {
        let (records, stats) = router
            .chunk_repository_parallel(root)
            .with_context(|| format!("Failed to chunk {}", root.display()))?;
        match args.format {
            OutputFormat::Json => export::write_json(&records, writer)?,
            OutputFormat::Jsonl => {
                export::write_jsonl(records, writer)?;
            }
        }
        stats
    } else {
        let mut chunks = router
            .chunk_repository(root)
            .with_context(|| format!("Failed to chunk {}", root.display()))?;
        match args.format {
            OutputFormat::Json => {
                let records: Vec<_> = chunks.by_ref().collect();
                export::write_json(&records, writer)?;
            }
            OutputFormat::Jsonl => {
                export::write_jsonl(chunks.by_ref(), writer)?;
            }
        }
        chunks.into_stats()
    };

    for skipped in &stats.skipped {
        log::debug!("Skipped {}: {}", skipped.filepath, skipped.reason);
    }
    if let Some(path) = &args.output {
        log::info!("Wrote {} chunks to {}", stats.chunks, path.display());
    }
    Ok(())
}

fn run_files(args: FilesArgs) -> Result<()> {
    let router = load_config(args.config.as_deref())?
        .build_router()
        .context("Invalid configuration")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let files = router
        .files(&args.root)
        .with_context(|| format!("Failed to walk {}", args.root.display()))?;
    for (descriptor, classification) in files {
        writeln!(
            out,
            "{}\t{}\t{}",
            descriptor.filepath,
            classification.language,
            classification.strategy.as_str()
        )?;
    }
    out.flush()?;
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    let yaml = RepoChunkerConfig::default().to_yaml_string()?;
    let mut writer = open_output(args.output.as_deref())?;
    writer.write_all(yaml.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RepoChunkerConfig> {
    match path {
        Some(path) => RepoChunkerConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(RepoChunkerConfig::default()),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
