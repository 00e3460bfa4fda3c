//! Error types for assetgen.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AssetgenError.
pub type AssetgenResult<T> = Result<T, AssetgenError>;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesize,
    Bundle,
    Resolve,
    Extract,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Synthesize => "synthesize",
            Stage::Bundle => "bundle",
            Stage::Resolve => "resolve",
            Stage::Extract => "extract",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while running the asset pipeline.
///
/// Every variant is fatal: the pipeline never produces partial output.
#[derive(Debug, Error)]
pub enum AssetgenError {
    /// No entry points were supplied.
    #[error("no entry points given")]
    NoEntries,

    /// Entry names must be non-empty and limited to `[A-Za-z0-9_-]`.
    #[error("invalid entry name `{0}`: only ASCII letters, digits, `_` and `-` are allowed")]
    InvalidEntryName(String),

    /// Two entries would produce the same generated constant.
    ///
    /// Exact duplicates are rejected too: each entry becomes a `pub const`,
    /// and a repeated name would make the generated module fail to compile.
    #[error("entry `{name}` conflicts with `{existing}` (both generate `{identifier}`)")]
    DuplicateEntry {
        name: String,
        existing: String,
        identifier: String,
    },

    /// The public URL is empty, so served references cannot be told apart
    /// from external ones.
    #[error("public URL must not be empty")]
    EmptyPublicUrl,

    /// The generated module name is not a Rust identifier.
    #[error("invalid module name `{0}`")]
    InvalidModuleName(String),

    #[error("failed to prepare directory {path:?}: {source}")]
    PrepareDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write shell for `{entry}` to {path:?}: {source}")]
    WriteShell {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bundler executable could not be started.
    #[error("failed to run bundler `{program}`: {source}")]
    BundlerSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The bundler ran but reported a failure.
    #[error("bundler exited with {status}:\n{stderr}")]
    BundlerFailed { status: String, stderr: String },

    #[error("failed to scan bundler output in {path:?}: {source}")]
    ScanDist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No compiled bundle matches an entry.
    #[error("unable to find bundle for {0}")]
    MissingBundle(String),

    #[error("failed to read bundle for `{entry}` at {path:?}: {source}")]
    ReadBundle {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A compiled bundle references an asset that is not on disk.
    #[error("bundle for `{entry}` references {reference}, which does not exist at {path:?}")]
    MissingAsset {
        entry: String,
        reference: String,
        path: PathBuf,
    },

    /// A bundle references a served path that climbs out of the distribution
    /// directory.
    #[error("bundle for `{entry}` references {reference}, which is outside the distribution directory")]
    AssetOutsideDist { entry: String, reference: String },

    #[error("failed to check asset for `{entry}` at {path:?}: {source}")]
    CheckAsset {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove bundle for `{entry}` at {path:?}: {source}")]
    RemoveBundle {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write generated source to {path:?}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// rustfmt could not be run, or rejected the generated source.
    #[error("rustfmt failed on {path:?}: {message}")]
    Format { path: PathBuf, message: String },
}

impl AssetgenError {
    /// Returns the pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            AssetgenError::NoEntries
            | AssetgenError::InvalidEntryName(_)
            | AssetgenError::DuplicateEntry { .. }
            | AssetgenError::PrepareDir { .. }
            | AssetgenError::WriteShell { .. } => Stage::Synthesize,
            AssetgenError::EmptyPublicUrl
            | AssetgenError::BundlerSpawn { .. }
            | AssetgenError::BundlerFailed { .. }
            | AssetgenError::ScanDist { .. } => Stage::Bundle,
            AssetgenError::MissingBundle(_) => Stage::Resolve,
            AssetgenError::ReadBundle { .. }
            | AssetgenError::MissingAsset { .. }
            | AssetgenError::AssetOutsideDist { .. }
            | AssetgenError::CheckAsset { .. }
            | AssetgenError::RemoveBundle { .. } => Stage::Extract,
            AssetgenError::InvalidModuleName(_)
            | AssetgenError::WriteOutput { .. }
            | AssetgenError::Format { .. } => Stage::Emit,
        }
    }
}
