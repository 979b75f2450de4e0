//! apimd: generate Markdown API reference pages from `*.api.json` files.
//!
//! ```text
//! apimd -i temp/api -o docs/api -l export
//! apimd -c api-documenter.json --exclude '*-internal' -p docs/_prefix.md
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use apimd::config::{DocumenterConfig, FileLevelSetting, NewlineKind, CONFIG_FILENAME};
use apimd::loader::{self, PackageFilter};
use apimd::model::ApiModel;
use apimd::plugin::{DocumenterFeature, NoFeature, PrefixFeature};

#[derive(Parser)]
#[command(
    name = "apimd",
    version,
    about = "Generate Markdown API reference pages from api-extractor doc models"
)]
struct Cli {
    /// Folder containing the *.api.json files
    #[arg(short = 'i', long, default_value = "input")]
    input: PathBuf,

    /// Output folder; its contents are deleted before generation
    #[arg(short = 'o', long, default_value = "markdown")]
    output: PathBuf,

    /// Config file (defaults to ./api-documenter.json when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// File granularity: model, package, namespace, export, member, or all
    #[arg(short = 'l', long)]
    file_level: Option<FileLevelSetting>,

    /// Newline convention for written pages: crlf, lf, or os
    #[arg(long)]
    newline: Option<NewlineKind>,

    /// Only document packages matching this glob. Can be given multiple times.
    #[arg(long)]
    include: Vec<String>,

    /// Skip packages matching this glob. Can be given multiple times.
    #[arg(long)]
    exclude: Vec<String>,

    /// Prefix template file, or a directory containing _prefix.md.
    /// Supports ${name} substitution.
    #[arg(short = 'p', long)]
    prefix: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let filter = PackageFilter::new(&config.include_package_names, &config.exclude_package_names)?;

    let mut model = ApiModel::new();
    let loaded = loader::load_folder(&mut model, &cli.input, &filter)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    if loaded.is_empty() {
        tracing::warn!(folder = %cli.input.display(), "no packages to document");
    }

    let mut feature: Box<dyn DocumenterFeature> = match resolve_prefix(cli.prefix.as_deref())? {
        Some(template) => Box::new(PrefixFeature::new(template)),
        None => Box::new(NoFeature),
    };

    let report = apimd::generate(&model, &config, &cli.output, feature.as_mut())
        .with_context(|| format!("failed to generate {}", cli.output.display()))?;
    tracing::info!(files = report.file_count(), "done");
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The config file (explicit, or `./api-documenter.json`), with CLI overrides applied.
fn load_config(cli: &Cli) -> Result<DocumenterConfig> {
    let default_path = Path::new(CONFIG_FILENAME);
    let mut config = match &cli.config {
        Some(path) => DocumenterConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if default_path.is_file() => DocumenterConfig::load(default_path)
            .with_context(|| format!("failed to load config {CONFIG_FILENAME}"))?,
        None => DocumenterConfig::default(),
    };

    if let Some(level) = cli.file_level {
        config.markdown_options.file_level = level;
    }
    if let Some(newline) = cli.newline {
        config.newline_kind = newline;
    }
    if !cli.include.is_empty() {
        config.include_package_names = cli.include.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude_package_names = cli.exclude.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Read the prefix template from the -p flag: a file, or `_prefix.md` inside a directory.
fn resolve_prefix(prefix: Option<&Path>) -> Result<Option<String>> {
    let Some(path) = prefix else {
        return Ok(None);
    };
    let file = if path.is_dir() {
        let candidate = path.join("_prefix.md");
        if !candidate.is_file() {
            return Ok(None);
        }
        candidate
    } else if path.is_file() {
        path.to_path_buf()
    } else {
        anyhow::bail!("prefix not found: {}", path.display());
    };
    let template = fs::read_to_string(&file)
        .with_context(|| format!("failed to read prefix file: {}", file.display()))?;
    Ok(Some(template))
}
