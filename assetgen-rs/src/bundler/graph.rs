use crate::error::{AssetgenError, AssetgenResult};
use std::path::{Path, PathBuf};

/// A single compiled output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBundle {
    /// File name of the bundle, e.g. `odbc.html` or `odbc.38d394c2.js`.
    pub name: String,
    pub file_path: PathBuf,
}

/// The bundler's output, reduced to a flat list of compiled files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleGraph {
    bundles: Vec<CompiledBundle>,
}

impl BundleGraph {
    pub fn new(bundles: Vec<CompiledBundle>) -> Self {
        Self { bundles }
    }

    /// Builds a graph from the regular files directly inside `dist_dir`.
    ///
    /// Bundles are sorted by name so the graph does not depend on directory
    /// iteration order.
    pub async fn scan(dist_dir: &Path) -> AssetgenResult<Self> {
        let scan_err = |source| AssetgenError::ScanDist {
            path: dist_dir.to_path_buf(),
            source,
        };

        let mut bundles = Vec::new();
        let mut dir = tokio::fs::read_dir(dist_dir).await.map_err(scan_err)?;
        while let Some(item) = dir.next_entry().await.map_err(scan_err)? {
            if !item.file_type().await.map_err(scan_err)?.is_file() {
                continue;
            }
            let Some(name) = item.file_name().to_str().map(str::to_string) else {
                log::warn!("skipping non UTF-8 file name in {}", dist_dir.display());
                continue;
            };
            bundles.push(CompiledBundle {
                name,
                file_path: item.path(),
            });
        }
        bundles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { bundles })
    }

    /// Returns the bundle whose name is exactly `name`, if any.
    pub fn find(&self, name: &str) -> Option<&CompiledBundle> {
        self.bundles.iter().find(|b| b.name == name)
    }

    pub fn bundles(&self) -> &[CompiledBundle] {
        &self.bundles
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_exact_name() {
        let graph = BundleGraph::new(vec![
            CompiledBundle {
                name: "odbc.html".to_string(),
                file_path: PathBuf::from("dist/odbc.html"),
            },
            CompiledBundle {
                name: "odbc.38d394c2.js".to_string(),
                file_path: PathBuf::from("dist/odbc.38d394c2.js"),
            },
        ]);

        assert_eq!(
            graph.find("odbc.html").map(|b| b.file_path.as_path()),
            Some(Path::new("dist/odbc.html"))
        );
        assert!(graph.find("odbc").is_none());
        assert!(graph.find("ODBC.html").is_none());
    }

    #[tokio::test]
    async fn test_scan_lists_files_only() {
        let dist = tempdir().unwrap();
        std::fs::write(dist.path().join("b.html"), "").unwrap();
        std::fs::write(dist.path().join("a.1234abcd.js"), "").unwrap();
        std::fs::create_dir(dist.path().join("images")).unwrap();

        let graph = BundleGraph::scan(dist.path()).await.unwrap();

        let names: Vec<_> = graph.bundles().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a.1234abcd.js", "b.html"]);
        assert_eq!(
            graph.find("b.html").unwrap().file_path,
            dist.path().join("b.html")
        );
    }

    #[tokio::test]
    async fn test_scan_missing_dir() {
        let root = tempdir().unwrap();
        let err = BundleGraph::scan(&root.path().join("dist"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetgenError::ScanDist { .. }));
    }
}
