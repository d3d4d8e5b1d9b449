//! Pattern-based scanning and splicing of `<img src="…">` values.
//!
//! Documents are handled as raw bytes. Only the attribute value moves;
//! every other byte, valid UTF-8 or not, is carried through untouched.

use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;

// Unicode mode is off so that classes also match bytes outside UTF-8.
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<img[^>]+src="([^"]+)""#).expect("image source pattern is valid")
});

/// One image reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Byte range of the attribute value within the document.
    pub span: Range<usize>,
    pub url: String,
}

/// Find every double-quoted `src` value on an `<img>` tag, in document order.
///
/// Values that are not valid UTF-8 cannot be URLs and are not returned.
pub fn find_image_references(html: &[u8]) -> Vec<ImageReference> {
    IMG_SRC_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| {
            let url = std::str::from_utf8(m.as_bytes()).ok()?;
            Some(ImageReference {
                span: m.range(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// True for absolute `http://` or `https://` references.
///
/// Everything else is already local and is left alone.
pub fn is_external(src: &str) -> bool {
    let lower = src.get(..8).unwrap_or(src).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Replace the given spans with new text.
///
/// Spans must be non-overlapping and sorted by start offset, which is what
/// [`find_image_references`] produces.
pub fn splice(html: &[u8], replacements: &[(Range<usize>, String)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(html.len());
    let mut cursor = 0;
    for (span, text) in replacements {
        out.extend_from_slice(&html[cursor..span.start]);
        out.extend_from_slice(text.as_bytes());
        cursor = span.end;
    }
    out.extend_from_slice(&html[cursor..]);
    out
}
