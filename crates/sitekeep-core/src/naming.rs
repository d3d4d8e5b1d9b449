//! File naming for mirrored assets.
//!
//! Names come from the last path segment of the source URL. When a
//! different payload already occupies that name, the new one gets a short
//! content hash inserted before its extension (`photo.jpg` →
//! `photo-1a2b3c4d.jpg`).

use url::Url;

use crate::error::AppError;
use crate::models::short_hash;
use crate::traits::AssetStore;

/// Base name used when the URL path has no final segment.
pub const DEFAULT_STEM: &str = "image";
/// Extension used when neither the path nor the `format` query names one.
pub const DEFAULT_EXTENSION: &str = ".png";

/// Derive a local file name from an image URL.
///
/// ```
/// use sitekeep_core::naming::filename_from_url;
///
/// assert_eq!(filename_from_url("https://cdn.example.com/a/photo.jpg").unwrap(), "photo.jpg");
/// assert_eq!(filename_from_url("https://cdn.example.com/a/pic?format=webp").unwrap(), "pic.webp");
/// assert_eq!(filename_from_url("https://cdn.example.com/").unwrap(), "image.png");
/// ```
pub fn filename_from_url(url: &str) -> Result<String, AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let mut name = if is_plain_segment(segment) {
        segment.to_string()
    } else {
        DEFAULT_STEM.to_string()
    };

    if split_extension(&name).1.is_empty() {
        let ext = parsed
            .query_pairs()
            .find(|(key, value)| key == "format" && !value.is_empty())
            .filter(|(_, value)| value.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|(_, value)| format!(".{value}"))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        name.push_str(&ext);
    }

    Ok(name)
}

/// A segment usable verbatim as a file name in the asset directory.
fn is_plain_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
        && !segment.contains(['/', '\\'])
        && !segment.chars().any(char::is_control)
}

/// Split `name` into stem and extension (including the dot).
///
/// Leading dots belong to the stem, so `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(idx) => name.split_at(body_start + idx),
        None => (name, ""),
    }
}

/// Insert the payload's short hash before the extension.
pub fn disambiguate(name: &str, payload: &[u8]) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}-{}{ext}", short_hash(payload))
}

/// Outcome of resolving a candidate name against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub filename: String,
    /// True when a file already sits at `filename` and must not be rewritten.
    pub exists: bool,
}

/// Pick the name under which `payload` should live.
///
/// An existing file matches when it equals either the raw payload or the
/// bytes that would be written for it (`encoded`), so a payload that was
/// re-encoded on an earlier pass is still recognised.
pub async fn resolve_name<S: AssetStore>(
    store: &S,
    candidate: &str,
    payload: &[u8],
    encoded: &[u8],
) -> Result<Resolution, AppError> {
    match store.read(candidate).await? {
        None => Ok(Resolution {
            filename: candidate.to_string(),
            exists: false,
        }),
        Some(existing) if existing == payload || existing == encoded => Ok(Resolution {
            filename: candidate.to_string(),
            exists: true,
        }),
        Some(_) => {
            let alternate = disambiguate(candidate, payload);
            let exists = store.read(&alternate).await?.is_some();
            tracing::debug!(%candidate, %alternate, exists, "Name collision");
            Ok(Resolution {
                filename: alternate,
                exists,
            })
        }
    }
}
