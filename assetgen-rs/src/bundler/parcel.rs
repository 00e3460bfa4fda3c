//! Drives the Parcel command line interface.

use super::{BundleGraph, BundleOptions, Bundler};
use crate::error::{AssetgenError, AssetgenResult};
use itertools::Itertools;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Runs `parcel build` once over all shells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelBundler {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for ParcelBundler {
    fn default() -> Self {
        Self {
            program: "parcel".to_string(),
            prefix_args: vec![],
        }
    }
}

impl ParcelBundler {
    /// Creates a bundler from a command line such as `parcel` or `npx parcel`.
    ///
    /// Returns `None` if `command` is blank.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            prefix_args: parts.collect(),
        })
    }

    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.prefix_args.iter())
            .join(" ")
    }

    /// Arguments passed after the program name.
    pub fn build_args(&self, shells: &[PathBuf], options: &BundleOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();
        args.push("build".into());
        args.extend(shells.iter().map(|p| p.as_os_str().to_os_string()));

        if !options.cache {
            args.push("--no-cache".into());
        }
        if !options.content_hash {
            args.push("--no-content-hash".into());
        }
        if !options.optimize {
            args.push("--no-optimize".into());
        }
        if !options.scope_hoist {
            args.push("--no-scope-hoist".into());
        }
        if !options.source_maps {
            args.push("--no-source-maps".into());
        }
        args.push("--dist-dir".into());
        args.push(options.dist_dir.as_os_str().to_os_string());
        args.push("--public-url".into());
        args.push(options.public_url.as_str().into());
        args
    }
}

impl Bundler for ParcelBundler {
    async fn bundle(
        &self,
        root: &Path,
        shells: &[PathBuf],
        options: &BundleOptions,
    ) -> AssetgenResult<BundleGraph> {
        log::debug!(
            "running {} over {} shell(s) in {}",
            self.command_line(),
            shells.len(),
            root.display()
        );

        let output = Command::new(&self.program)
            .args(self.build_args(shells, options))
            .current_dir(root)
            .env("BROWSERSLIST", &options.browsers)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| AssetgenError::BundlerSpawn {
                program: self.command_line(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!("parcel: {line}");
        }

        if !output.status.success() {
            return Err(AssetgenError::BundlerFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        BundleGraph::scan(&root.join(&options.dist_dir)).await
    }
}
