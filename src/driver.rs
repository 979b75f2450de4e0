//! Runs the page renderer once per configured granularity.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::collision::CollisionLookup;
use crate::config::{DocumenterConfig, FileLevelSetting};
use crate::error::{DocumenterError, Result};
use crate::kinds::Granularity;
use crate::model::ApiModel;
use crate::plugin::DocumenterFeature;
use crate::render::{FsPageWriter, MarkdownDocumenter, RenderStats};

/// One completed renderer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRun {
    pub granularity: Granularity,
    pub output_folder: PathBuf,
    pub stats: RenderStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub runs: Vec<GenerationRun>,
}

impl GenerationReport {
    pub fn file_count(&self) -> usize {
        self.runs.iter().map(|r| r.stats.file_count).sum()
    }
}

/// Render `model` into `output`.
///
/// With `fileLevel: "all"` every granularity is rendered into its own
/// `<output>/<granularity>` folder, and `output` itself is emptied first.
/// Each target folder is emptied before its run.
pub fn generate(
    model: &ApiModel,
    config: &DocumenterConfig,
    output: &Path,
    feature: &mut dyn DocumenterFeature,
) -> Result<GenerationReport> {
    config.validate()?;
    let lookup = CollisionLookup::build(model);
    let setting = config.markdown_options.file_level;

    if setting == FileLevelSetting::All {
        clear_folder(output)?;
    }

    let mut report = GenerationReport::default();
    for granularity in setting.granularities() {
        let folder = match setting {
            FileLevelSetting::All => output.join(granularity.as_str()),
            FileLevelSetting::Single(_) => output.to_path_buf(),
        };
        clear_folder(&folder)?;

        let mut writer = FsPageWriter::new(config.newline_kind);
        let stats = MarkdownDocumenter::new(
            model,
            &lookup,
            granularity,
            config,
            &folder,
            &mut *feature,
            &mut writer,
        )
        .generate_files()?;

        info!(
            granularity = %granularity,
            packages = stats.package_count,
            files = stats.file_count,
            folder = %folder.display(),
            "generated"
        );
        report.runs.push(GenerationRun {
            granularity,
            output_folder: folder,
            stats,
        });
    }

    feature.on_finished();
    Ok(report)
}

fn clear_folder(folder: &Path) -> Result<()> {
    if folder.exists() {
        fs::remove_dir_all(folder)
            .map_err(|e| DocumenterError::io(format!("failed to clear {}", folder.display()), e))?;
    }
    fs::create_dir_all(folder)
        .map_err(|e| DocumenterError::io(format!("failed to create {}", folder.display()), e))
}
