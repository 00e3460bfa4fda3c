#![doc = include_str!("../README.md")]

pub mod bundler;
pub mod emit;
pub mod entry;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod resolve;
pub mod synthesize;

#[macro_use]
extern crate lazy_static;

pub use bundler::{BundleGraph, BundleOptions, Bundler, CompiledBundle, ParcelBundler};
pub use emit::EmitOptions;
pub use entry::Entry;
pub use error::{AssetgenError, AssetgenResult, Stage};
pub use extract::ExtractedAsset;
pub use pipeline::{AssetPipeline, PipelineConfig, PipelineReport};
