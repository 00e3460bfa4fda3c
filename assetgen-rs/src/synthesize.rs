//! Shell documents handed to the bundler.
//!
//! Each entry gets a tiny HTML file that references the shared base module,
//! the entry's own module and the entry's stylesheet. The bundler compiles
//! these shells; the document itself is thrown away after extraction.

use crate::entry::{Entry, ENTRY_DIR};
use crate::error::{AssetgenError, AssetgenResult};
use futures::future::try_join_all;
use std::io;
use std::path::Path;

/// Renders the shell document for an entry.
///
/// Paths are relative to the shell, which lives in [`ENTRY_DIR`] next to `src/`.
pub fn shell_document(name: &str) -> String {
    format!(
        r#"
<script type='module' src='../src/base/index.ts'></script>
<script type='module' src='../src/entry/{name}/index.ts'></script>
<link rel='stylesheet' href='../src/entry/{name}/index.css'>
"#
    )
}

/// Creates the scratch directory and resets the distribution directory.
///
/// `dist_dir` is removed with force semantics (a missing directory is fine)
/// and created again empty, so no output of a previous run survives.
pub async fn prepare_directories(root: &Path, dist_dir: &Path) -> AssetgenResult<()> {
    let entry_dir = root.join(ENTRY_DIR);
    let dist_dir = root.join(dist_dir);

    let make_scratch = async {
        tokio::fs::create_dir_all(&entry_dir)
            .await
            .map_err(|source| AssetgenError::PrepareDir {
                path: entry_dir.clone(),
                source,
            })
    };

    let reset_dist = async {
        match tokio::fs::remove_dir_all(&dist_dir).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(AssetgenError::PrepareDir {
                    path: dist_dir.clone(),
                    source,
                })
            }
        }
        tokio::fs::create_dir_all(&dist_dir)
            .await
            .map_err(|source| AssetgenError::PrepareDir {
                path: dist_dir.clone(),
                source,
            })
    };

    tokio::try_join!(make_scratch, reset_dist)?;
    Ok(())
}

/// Writes one shell per entry, concurrently.
///
/// The scratch directory must already exist (see [`prepare_directories`]).
pub async fn write_shells(entries: &[Entry]) -> AssetgenResult<()> {
    try_join_all(entries.iter().map(|entry| async move {
        let path = entry.shell_path();
        tokio::fs::write(path, shell_document(entry.name()))
            .await
            .map_err(|source| AssetgenError::WriteShell {
                entry: entry.name().to_string(),
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("wrote shell for {} to {}", entry.name(), path.display());
        Ok::<_, AssetgenError>(())
    }))
    .await?;
    Ok(())
}
