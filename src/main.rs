use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repofacts::core::{AnalysisConfig, CodebaseAnalyzer};
use repofacts::formatters::JsonFormatter;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "repofacts",
    version,
    about = "Per-file code facts and a resolved file dependency graph for a source tree"
)]
struct Cli {
    /// Input directory to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = "repofacts.json")]
    output: PathBuf,

    /// Comma-separated list of languages to analyze
    #[arg(short, long, value_name = "LANGS", value_delimiter = ',')]
    languages: Option<Vec<String>>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum dependents for a key module
    #[arg(long, value_name = "N")]
    key_threshold: Option<usize>,

    /// File count above which the visualization collapses to directories
    #[arg(long, value_name = "N")]
    max_nodes: Option<usize>,

    /// Maximum number of cycles to enumerate
    #[arg(long, value_name = "N")]
    max_cycles: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
    format: OutputFormat,

    /// Include the per-file fact map in the output
    #[arg(long)]
    facts: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Compact,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(cli)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(languages) = &cli.languages {
        let languages: Vec<String> = languages
            .iter()
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect();
        config = config.with_languages(languages);
    }
    if let Some(threshold) = cli.key_threshold {
        config = config.with_key_module_threshold(threshold);
    }
    if let Some(max_nodes) = cli.max_nodes {
        config = config.with_max_visual_nodes(max_nodes);
    }
    if let Some(max_cycles) = cli.max_cycles {
        config = config.with_max_cycles(max_cycles);
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let config = build_config(&cli)?;
    info!(input = %cli.input.display(), languages = ?config.languages, "starting analysis");

    let analyzer = CodebaseAnalyzer::with_config(config)?;
    let analysis = analyzer.analyze(&cli.input)?;

    JsonFormatter::new()
        .with_pretty(cli.format == OutputFormat::Pretty)
        .with_facts(cli.facts)
        .format_to_file(&analysis, &cli.output)?;

    info!(
        output = %cli.output.display(),
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "analysis written"
    );
    Ok(())
}
