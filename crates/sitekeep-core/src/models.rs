use std::fmt;

use sha1::{Digest, Sha1};

/// Length of the content-derived suffix used to disambiguate file names.
pub const SHORT_HASH_LEN: usize = 8;

/// A completed HTTP exchange, whatever its status.
///
/// Transport failures never produce a `FetchResponse`; they surface as
/// [`AppError`](crate::AppError) instead.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// URL after redirects were followed.
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status codes of 400 and above count as broken.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// True when the body should be parsed as markup.
    ///
    /// A missing content type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
        }
    }
}

/// Image bytes downloaded for one external reference.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub source_url: String,
    pub bytes: Vec<u8>,
}

/// Container format detected from the decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Jpeg,
    Png,
    Other,
}

/// Output of an [`Optimizer`](crate::traits::Optimizer).
#[derive(Debug, Clone)]
pub struct Optimized {
    pub format: AssetFormat,
    pub bytes: Vec<u8>,
}

/// An asset as it exists in the asset directory after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub filename: String,
    /// False when an identical file was already present.
    pub written: bool,
}

/// Raw link targets found in one page, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// `href` values of anchors.
    pub anchors: Vec<String>,
    /// `src`/`href` values of images, scripts, and stylesheets.
    pub assets: Vec<String>,
}

/// Totals for one localizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LocalizeReport {
    pub documents_scanned: usize,
    pub documents_rewritten: usize,
    pub references_rewritten: usize,
    pub references_skipped: usize,
    pub assets_written: usize,
}

impl LocalizeReport {
    pub fn absorb(&mut self, other: &LocalizeReport) {
        self.documents_scanned += other.documents_scanned;
        self.documents_rewritten += other.documents_rewritten;
        self.references_rewritten += other.references_rewritten;
        self.references_skipped += other.references_skipped;
        self.assets_written += other.assets_written;
    }
}

/// Why a URL was recorded as broken.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum FailureReason {
    Status(u16),
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "{code}"),
            FailureReason::Transport(msg) => write!(f, "EXC: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BrokenLink {
    pub url: String,
    pub reason: FailureReason,
}

/// Result of one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CrawlReport {
    pub pages_checked: usize,
    pub assets_checked: usize,
    pub broken: Vec<BrokenLink>,
}

impl CrawlReport {
    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }
}

/// Hex SHA-1 of a byte slice.
///
/// Existing asset directories carry SHA-1 collision suffixes, so changing
/// the digest would stop them from being recognised.
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// The first [`SHORT_HASH_LEN`] hex chars of [`compute_hash`].
pub fn short_hash(content: &[u8]) -> String {
    let mut hash = compute_hash(content);
    hash.truncate(SHORT_HASH_LEN);
    hash
}
