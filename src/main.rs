use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use manuscript_metrics::{
    analyze, restyle, AnalysisConfig, Canon, Module, Modules, RollingWindow, TextStyle,
};

#[derive(Parser)]
#[command(
    name = "manuscript-metrics",
    about = "Heuristic emotion, style and continuity metrics for manuscripts",
    version
)]
struct Cli {
    /// File paths to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Rolling window for emotion trendlines, in sentences
    #[arg(long, allow_negative_numbers = true)]
    window: Option<i64>,

    /// TOML file with analysis settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Comma-separated canonical names, e.g. "Thea, Declan"
    #[arg(long)]
    names: Option<String>,

    /// JSON canon: {"canon": [{"name": .., "aliases": [..]}]}
    #[arg(long, value_name = "FILE")]
    canon_json: Option<PathBuf>,

    /// CSV canon; every cell is a name
    #[arg(long, value_name = "FILE")]
    canon_csv: Option<PathBuf>,

    /// Run only these modules
    #[arg(long, value_name = "MODULE", num_args = 1.., value_delimiter = ',')]
    only: Vec<Module>,

    /// Write a re-styled copy of the (last) input here
    #[arg(long, value_name = "FILE")]
    normalized_out: Option<PathBuf>,

    /// Glyph style for --normalized-out: plain or smart
    #[arg(long, default_value = "plain")]
    style: TextStyle,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(window) = cli.window {
        config.rolling_window = RollingWindow::try_from(window)?;
    }

    let canon = load_canon(&cli)?;
    let modules = Modules::only(cli.only.iter().copied());

    let inputs: Vec<(String, String)> = if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        vec![("<stdin>".to_string(), input)]
    } else {
        cli.files
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))
                    .map(|text| (path.display().to_string(), text))
            })
            .collect::<Result<_>>()?
    };

    for (name, text) in &inputs {
        let report =
            analyze(text, &config, &canon, &modules).with_context(|| format!("analyzing {name}"))?;
        let json = if cli.compact {
            serde_json::to_string(&report)?
        } else {
            serde_json::to_string_pretty(&report)?
        };
        println!("{json}");
    }

    if let (Some(out), Some((_, text))) = (&cli.normalized_out, inputs.last()) {
        write_restyled(out, text, cli.style)?;
    }

    Ok(())
}

fn load_canon(cli: &Cli) -> Result<Canon> {
    let mut canon = Canon::new();
    if let Some(names) = &cli.names {
        canon.add_inline(names);
    }
    if let Some(path) = &cli.canon_json {
        canon
            .load_json_file(path)
            .with_context(|| format!("loading canon {}", path.display()))?;
    }
    if let Some(path) = &cli.canon_csv {
        canon
            .load_csv_file(path)
            .with_context(|| format!("loading canon {}", path.display()))?;
    }
    tracing::debug!(entries = canon.len(), "canon loaded");
    Ok(canon)
}

fn write_restyled(path: &Path, text: &str, style: TextStyle) -> Result<()> {
    std::fs::write(path, restyle(text, style))
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), ?style, "wrote restyled text");
    Ok(())
}
