use std::path::{Path, PathBuf};

use crate::config::LocalizeConfig;
use crate::error::AppError;
use crate::markup::{find_image_references, is_external, splice};
use crate::models::{FetchedAsset, LocalizeReport, StoredAsset};
use crate::naming::{filename_from_url, resolve_name};
use crate::traits::{AssetStore, Fetcher, Optimizer};

/// Mirrors externally hosted images and points documents at the copies.
///
/// Per reference: fetch → name → optimize → resolve collisions → store →
/// rewrite. Fetch failures skip the reference and leave its markup as is;
/// codec failures store the original bytes; filesystem failures abort the
/// run.
///
/// Generic over its I/O seams so that tests run without network or disk.
pub struct LocalizeService<F, O, S>
where
    F: Fetcher,
    O: Optimizer,
    S: AssetStore,
{
    fetcher: F,
    optimizer: O,
    store: S,
    config: LocalizeConfig,
}

impl<F, O, S> LocalizeService<F, O, S>
where
    F: Fetcher,
    O: Optimizer,
    S: AssetStore,
{
    pub fn new(fetcher: F, optimizer: O, store: S, config: LocalizeConfig) -> Self {
        Self {
            fetcher,
            optimizer,
            store,
            config,
        }
    }

    /// Process every matching document under `root`.
    pub async fn localize_tree(&self, root: &Path) -> Result<LocalizeReport, AppError> {
        let documents = collect_documents(root, self.config.document_name.as_deref()).await?;
        tracing::info!("Scanning {} documents under {}", documents.len(), root.display());

        let mut report = LocalizeReport::default();
        for path in &documents {
            let doc_report = self.localize_document(path).await?;
            report.absorb(&doc_report);
        }

        tracing::info!(
            rewritten = report.references_rewritten,
            skipped = report.references_skipped,
            assets_written = report.assets_written,
            "Localization complete"
        );
        Ok(report)
    }

    /// Process one document, overwriting it only if a reference changed.
    pub async fn localize_document(&self, path: &Path) -> Result<LocalizeReport, AppError> {
        let raw = tokio::fs::read(path).await?;

        let (rewritten, mut report) = self.localize_bytes(&raw).await?;
        report.documents_scanned = 1;

        if rewritten != raw {
            tokio::fs::write(path, &rewritten).await?;
            report.documents_rewritten = 1;
            tracing::info!(
                document = %path.display(),
                references = report.references_rewritten,
                "Rewrote document"
            );
        }

        Ok(report)
    }

    /// Localize the images referenced by one document's text.
    ///
    /// Returns the new text along with the counts for this document.
    pub async fn localize_html(&self, html: &str) -> Result<(String, LocalizeReport), AppError> {
        let (out, report) = self.localize_bytes(html.as_bytes()).await?;
        // Valid input spliced with valid replacements stays valid.
        Ok((String::from_utf8_lossy(&out).into_owned(), report))
    }

    /// Byte-level form of [`localize_html`](Self::localize_html).
    ///
    /// Bytes outside the rewritten `src` values are copied through as they
    /// are, so documents that are not valid UTF-8 keep their encoding.
    pub async fn localize_bytes(
        &self,
        html: &[u8],
    ) -> Result<(Vec<u8>, LocalizeReport), AppError> {
        let mut report = LocalizeReport::default();
        let mut replacements = Vec::new();

        for reference in find_image_references(html) {
            if !is_external(&reference.url) {
                continue;
            }
            match self.localize_reference(&reference.url).await? {
                Some(asset) => {
                    if asset.written {
                        report.assets_written += 1;
                    }
                    report.references_rewritten += 1;
                    let local = format!("{}{}", self.config.public_prefix, asset.filename);
                    tracing::debug!(from = %reference.url, to = %local, "Rewriting reference");
                    replacements.push((reference.span, local));
                }
                None => report.references_skipped += 1,
            }
        }

        Ok((splice(html, &replacements), report))
    }

    /// Mirror one external image. `None` means the reference is skipped.
    pub async fn localize_reference(&self, url: &str) -> Result<Option<StoredAsset>, AppError> {
        let Some(asset) = self.download(url).await? else {
            return Ok(None);
        };

        let candidate = match filename_from_url(&asset.source_url) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(%url, error = %e, "Skipping reference");
                return Ok(None);
            }
        };

        let encoded = self.encode(&asset);
        let resolution = resolve_name(&self.store, &candidate, &asset.bytes, &encoded).await?;
        if !resolution.exists {
            self.store.write(&resolution.filename, &encoded).await?;
        }

        Ok(Some(StoredAsset {
            filename: resolution.filename,
            written: !resolution.exists,
        }))
    }

    async fn download(&self, url: &str) -> Result<Option<FetchedAsset>, AppError> {
        match self.fetcher.fetch(url).await {
            Ok(resp) if resp.is_success() && !resp.body.is_empty() => Ok(Some(FetchedAsset {
                source_url: url.to_string(),
                bytes: resp.body,
            })),
            Ok(resp) => {
                tracing::warn!(%url, status = resp.status, "Skipping reference: unusable response");
                Ok(None)
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(%url, error = %e, "Skipping reference: fetch failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Bytes to persist for an asset; the original payload if re-encoding fails.
    fn encode(&self, asset: &FetchedAsset) -> Vec<u8> {
        match self.optimizer.optimize(&asset.bytes) {
            Ok(optimized) => {
                tracing::debug!(
                    url = %asset.source_url,
                    format = ?optimized.format,
                    before = asset.bytes.len(),
                    after = optimized.bytes.len(),
                    "Optimized image"
                );
                optimized.bytes
            }
            Err(e) => {
                tracing::warn!(url = %asset.source_url, error = %e, "Storing original bytes");
                asset.bytes.clone()
            }
        }
    }
}

/// List the documents under `root`, sorted by path.
///
/// With `name` set only files called exactly that are returned; otherwise
/// every `.html`/`.htm` file is.
pub async fn collect_documents(root: &Path, name: Option<&str>) -> Result<Vec<PathBuf>, AppError> {
    let mut documents = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_document(&path, name) {
                documents.push(path);
            }
        }
    }

    documents.sort();
    Ok(documents)
}

fn is_document(path: &Path, name: Option<&str>) -> bool {
    match name {
        Some(wanted) => path.file_name().and_then(|n| n.to_str()) == Some(wanted),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm")),
    }
}
