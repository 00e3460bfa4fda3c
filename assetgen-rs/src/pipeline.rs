//! Runs the stages end to end.
//!
//! Stages are strict barriers: each one finishes for every entry before the
//! next begins, and the first error aborts the run. The destination file is
//! only written once every entry has been extracted.

use crate::bundler::{BundleOptions, Bundler};
use crate::emit::{self, EmitOptions};
use crate::entry::{entries_from_names, Entry};
use crate::error::AssetgenResult;
use crate::extract::extract_assets;
use crate::resolve::resolve_bundles;
use crate::synthesize::{prepare_directories, write_shells};
use std::path::PathBuf;

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Project root holding `src/`, the scratch directory and the output.
    pub root: PathBuf,
    pub bundle: BundleOptions,
    pub emit: EmitOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bundle: BundleOptions::default(),
            emit: EmitOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Absolute or root-relative destination of the generated source.
    pub fn dest_path(&self) -> PathBuf {
        self.root.join(&self.emit.dest_file)
    }

    pub fn dist_path(&self) -> PathBuf {
        self.root.join(&self.bundle.dist_dir)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// File the generated source was written to.
    pub dest_file: PathBuf,
    /// Generated constants, in entry order.
    pub identifiers: Vec<String>,
    /// Number of files the bundler produced, compiled HTML included.
    pub bundle_count: usize,
}

/// The asset pipeline, generic over the bundling engine.
pub struct AssetPipeline<B> {
    config: PipelineConfig,
    bundler: B,
}

impl<B: Bundler> AssetPipeline<B> {
    pub fn new(config: PipelineConfig, bundler: B) -> Self {
        Self { config, bundler }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Bundles `names` and writes the generated source.
    ///
    /// Names and options are validated before anything touches the filesystem.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> AssetgenResult<PipelineReport> {
        let config = &self.config;
        let entries = entries_from_names(names, &config.root)?;
        emit::validate_module_name(&config.emit.module_name)?;
        config.bundle.validate()?;

        log::info!("Preparing directories");
        prepare_directories(&config.root, &config.bundle.dist_dir).await?;

        log::info!("Collecting {} entry point(s)", entries.len());
        write_shells(&entries).await?;

        log::info!("Bundling assets");
        let shells: Vec<PathBuf> = entries.iter().map(Entry::relative_shell_path).collect();
        let graph = self
            .bundler
            .bundle(&config.root, &shells, &config.bundle)
            .await?;
        log::debug!("bundler produced {} file(s)", graph.len());

        log::info!("Finding assets in output");
        let resolved = resolve_bundles(&graph, &entries)?;
        let assets = extract_assets(
            &resolved,
            &config.dist_path(),
            &config.bundle.public_url,
        )
        .await?;

        let dest = config.dest_path();
        log::info!("Writing {}", dest.display());
        let source = emit::render(&entries, &assets, &config.emit.module_name)?;
        emit::write_source(&dest, &source, config.emit.rustfmt).await?;

        Ok(PipelineReport {
            dest_file: dest,
            identifiers: entries.iter().map(Entry::identifier).collect(),
            bundle_count: graph.len(),
        })
    }
}
