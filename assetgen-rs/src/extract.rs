//! Pulls `<script>` and `<link>` markup out of compiled bundles.

use crate::error::{AssetgenError, AssetgenResult};
use crate::resolve::ResolvedEntry;
use futures::future::try_join_all;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref SCRIPT_SELECTOR: Selector = Selector::parse("script").unwrap();
    static ref LINK_SELECTOR: Selector = Selector::parse("link").unwrap();
}

/// Markup extracted from one compiled bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedAsset {
    /// Every `<script>` element, in document order, without separators.
    pub scripts: String,
    /// Every `<link>` element, in document order, without separators.
    pub styles: String,
}

/// Result of parsing a compiled bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBundle {
    pub asset: ExtractedAsset,
    /// `src` and `href` attributes of the extracted elements, in document order.
    pub references: Vec<String>,
}

/// Parses compiled HTML and serializes its script and link elements.
pub fn parse_bundle(html: &str) -> ParsedBundle {
    let document = Html::parse_document(html);
    let mut parsed = ParsedBundle::default();

    for script in document.select(&SCRIPT_SELECTOR) {
        parsed.asset.scripts.push_str(&script.html());
        if let Some(src) = script.value().attr("src") {
            parsed.references.push(src.to_string());
        }
    }
    for link in document.select(&LINK_SELECTOR) {
        parsed.asset.styles.push_str(&link.html());
        if let Some(href) = link.value().attr("href") {
            parsed.references.push(href.to_string());
        }
    }
    parsed
}

/// Returns the part of `reference` below `public_url`, without query or
/// fragment.
///
/// Returns `None` for references the server does not serve from the
/// distribution directory (other origins, data URIs, other prefixes).
pub fn served_path<'a>(reference: &'a str, public_url: &str) -> Option<&'a str> {
    if public_url.is_empty() || reference.starts_with("//") {
        return None;
    }
    let relative = reference
        .strip_prefix(public_url)?
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');
    (!relative.is_empty()).then_some(relative)
}

/// Maps a served path into `dist_dir`.
///
/// Returns `None` if the path climbs out of the directory with `..`.
pub fn dist_path(dist_dir: &Path, served: &str) -> Option<PathBuf> {
    let mut path = dist_dir.to_path_buf();
    for segment in served.split('/') {
        match segment {
            ".." => return None,
            "" | "." => {}
            segment => path.push(segment),
        }
    }
    Some(path)
}

async fn extract_one(
    resolved: &ResolvedEntry<'_>,
    dist_dir: &Path,
    public_url: &str,
) -> AssetgenResult<ExtractedAsset> {
    let name = resolved.entry.name();
    let path = &resolved.bundle_path;

    let html = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AssetgenError::ReadBundle {
            entry: name.to_string(),
            path: path.clone(),
            source,
        })?;
    let ParsedBundle { asset, references } = parse_bundle(&html);

    for reference in references {
        let Some(served) = served_path(&reference, public_url) else {
            continue;
        };
        let Some(asset_path) = dist_path(dist_dir, served) else {
            return Err(AssetgenError::AssetOutsideDist {
                entry: name.to_string(),
                reference,
            });
        };
        let exists = tokio::fs::try_exists(&asset_path)
            .await
            .map_err(|source| AssetgenError::CheckAsset {
                entry: name.to_string(),
                path: asset_path.clone(),
                source,
            })?;
        if !exists {
            return Err(AssetgenError::MissingAsset {
                entry: name.to_string(),
                reference,
                path: asset_path,
            });
        }
    }

    if asset.scripts.is_empty() && asset.styles.is_empty() {
        log::warn!("bundle for {name} contains no script or link tags");
    }

    tokio::fs::remove_file(path)
        .await
        .map_err(|source| AssetgenError::RemoveBundle {
            entry: name.to_string(),
            path: path.clone(),
            source,
        })?;

    log::debug!("extracted assets for {name}");
    Ok(asset)
}

/// Extracts the markup of every resolved bundle concurrently, then deletes
/// the compiled HTML files.
///
/// Results are keyed by entry name. Referenced files under `public_url` must
/// exist in `dist_dir`, otherwise the whole extraction fails.
pub async fn extract_assets(
    resolved: &[ResolvedEntry<'_>],
    dist_dir: &Path,
    public_url: &str,
) -> AssetgenResult<HashMap<String, ExtractedAsset>> {
    let extracted = try_join_all(resolved.iter().map(|r| async move {
        let asset = extract_one(r, dist_dir, public_url).await?;
        Ok::<_, AssetgenError>((r.entry.name().to_string(), asset))
    }))
    .await?;
    Ok(extracted.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::error::Stage;
    use rstest::rstest;
    use tempfile::tempdir;

    const ODBC_HTML: &str = r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="/assets/odbc.0acd24a7.css"><script type="module" src="/assets/odbc.38d394c2.js"></script></head><body><script src="/assets/odbc.2845d50f.js" nomodule="" defer></script></body></html>"#;

    #[test]
    fn test_parse_bundle_document_order() {
        let parsed = parse_bundle(ODBC_HTML);
        assert_eq!(
            parsed.asset.scripts,
            concat!(
                r#"<script type="module" src="/assets/odbc.38d394c2.js"></script>"#,
                r#"<script src="/assets/odbc.2845d50f.js" nomodule="" defer=""></script>"#,
            )
        );
        assert_eq!(
            parsed.asset.styles,
            r#"<link rel="stylesheet" href="/assets/odbc.0acd24a7.css">"#
        );
        assert_eq!(
            parsed.references,
            vec![
                "/assets/odbc.38d394c2.js",
                "/assets/odbc.2845d50f.js",
                "/assets/odbc.0acd24a7.css",
            ]
        );
    }

    #[test]
    fn test_parse_bundle_inline_script() {
        let parsed = parse_bundle("<script>window.x = 1;</script>");
        assert_eq!(parsed.asset.scripts, "<script>window.x = 1;</script>");
        assert!(parsed.asset.styles.is_empty());
        assert!(parsed.references.is_empty());
    }

    #[rstest]
    #[case("/assets/odbc.38d394c2.js", Some("odbc.38d394c2.js"))]
    #[case("/assets/fonts/a.woff2?v=1", Some("fonts/a.woff2"))]
    #[case("/assets/odbc.css#top", Some("odbc.css"))]
    #[case("/assets/", None)]
    #[case("/static/odbc.js", None)]
    #[case("https://cdn.example.com/x.js", None)]
    #[case("//cdn.example.com/x.js", None)]
    fn test_served_path(#[case] reference: &str, #[case] expected: Option<&str>) {
        assert_eq!(served_path(reference, "/assets/"), expected);
    }

    #[rstest]
    #[case("https://cdn.example.com/x.js")]
    #[case("/assets/odbc.js")]
    fn test_served_path_empty_public_url(#[case] reference: &str) {
        assert_eq!(served_path(reference, ""), None);
    }

    #[rstest]
    #[case("odbc.38d394c2.js", Some("dist/odbc.38d394c2.js"))]
    #[case("fonts/a.woff2", Some("dist/fonts/a.woff2"))]
    #[case("./fonts//a.woff2", Some("dist/fonts/a.woff2"))]
    #[case("../secret.txt", None)]
    #[case("fonts/../../secret.txt", None)]
    fn test_dist_path(#[case] served: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            dist_path(Path::new("dist"), served),
            expected.map(PathBuf::from)
        );
    }

    #[tokio::test]
    async fn test_extract_deletes_html_only() {
        let root = tempdir().unwrap();
        let dist = root.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        for file in ["odbc.0acd24a7.css", "odbc.38d394c2.js", "odbc.2845d50f.js"] {
            std::fs::write(dist.join(file), "").unwrap();
        }
        std::fs::write(dist.join("odbc.html"), ODBC_HTML).unwrap();

        let entry = Entry::new("odbc", root.path()).unwrap();
        let resolved = vec![ResolvedEntry {
            entry: &entry,
            bundle_path: dist.join("odbc.html"),
        }];

        let assets = extract_assets(&resolved, &dist, "/assets/").await.unwrap();

        assert_eq!(assets.len(), 1);
        assert!(assets["odbc"].scripts.contains("odbc.38d394c2.js"));
        assert!(!dist.join("odbc.html").exists());
        assert!(dist.join("odbc.0acd24a7.css").exists());
        assert!(dist.join("odbc.38d394c2.js").exists());
    }

    #[tokio::test]
    async fn test_extract_missing_asset() {
        let root = tempdir().unwrap();
        let dist = root.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        std::fs::write(dist.join("odbc.0acd24a7.css"), "").unwrap();
        std::fs::write(dist.join("odbc.html"), ODBC_HTML).unwrap();

        let entry = Entry::new("odbc", root.path()).unwrap();
        let resolved = vec![ResolvedEntry {
            entry: &entry,
            bundle_path: dist.join("odbc.html"),
        }];

        let err = extract_assets(&resolved, &dist, "/assets/")
            .await
            .unwrap_err();
        match err {
            AssetgenError::MissingAsset {
                entry, reference, ..
            } => {
                assert_eq!(entry, "odbc");
                assert_eq!(reference, "/assets/odbc.38d394c2.js");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_extract_unreadable_bundle() {
        let root = tempdir().unwrap();
        let entry = Entry::new("odbc", root.path()).unwrap();
        let resolved = vec![ResolvedEntry {
            entry: &entry,
            bundle_path: root.path().join("dist").join("odbc.html"),
        }];

        let err = extract_assets(&resolved, &root.path().join("dist"), "/assets/")
            .await
            .unwrap_err();
        assert!(matches!(err, AssetgenError::ReadBundle { .. }));
    }

    fn resolved_odbc<'a>(entry: &'a Entry, dist: &Path) -> Vec<ResolvedEntry<'a>> {
        vec![ResolvedEntry {
            entry,
            bundle_path: dist.join("odbc.html"),
        }]
    }

    #[tokio::test]
    async fn test_extract_rejects_reference_outside_dist() {
        let root = tempdir().unwrap();
        let dist = root.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        std::fs::write(root.path().join("secret.js"), "").unwrap();
        std::fs::write(
            dist.join("odbc.html"),
            r#"<script src="/assets/../secret.js"></script>"#,
        )
        .unwrap();

        let entry = Entry::new("odbc", root.path()).unwrap();
        let err = extract_assets(&resolved_odbc(&entry, &dist), &dist, "/assets/")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssetgenError::AssetOutsideDist { ref reference, .. } if reference == "/assets/../secret.js"
        ));
        assert!(dist.join("odbc.html").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_io_error_is_not_missing_asset() {
        let root = tempdir().unwrap();
        let dist = root.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        // A regular file used as a directory fails with ENOTDIR, not NotFound.
        std::fs::write(dist.join("odbc.css"), "").unwrap();
        std::fs::write(
            dist.join("odbc.html"),
            r#"<script src="/assets/odbc.css/odbc.js"></script>"#,
        )
        .unwrap();

        let entry = Entry::new("odbc", root.path()).unwrap();
        let err = extract_assets(&resolved_odbc(&entry, &dist), &dist, "/assets/")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Extract);
        match err {
            AssetgenError::CheckAsset { entry, path, .. } => {
                assert_eq!(entry, "odbc");
                assert_eq!(path, dist.join("odbc.css").join("odbc.js"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
