//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{AssetFormat, FetchResponse, Optimized, PageLinks};
use crate::traits::{AssetStore, Fetcher, LinkExtractor, Optimizer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Route {
    Respond(FetchResponse),
    Fail(String),
}

/// Mock fetcher with per-URL canned responses.
///
/// Unknown URLs answer 404 with an empty body.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        let response = FetchResponse {
            status,
            final_url: url.to_string(),
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        };
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond(response));
        self
    }

    /// 200 with an HTML content type.
    pub fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, 200, Some("text/html"), html.as_bytes())
    }

    /// 200 with raw bytes and no content type.
    pub fn bytes(self, url: &str, body: &[u8]) -> Self {
        self.respond(url, 200, None, body)
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, status, Some("text/html"), b"")
    }

    /// 200 whose final URL differs from the requested one.
    pub fn redirect(self, url: &str, final_url: &str, html: &str) -> Self {
        let response = FetchResponse {
            status: 200,
            final_url: final_url.to_string(),
            content_type: Some("text/html".to_string()),
            body: html.as_bytes().to_vec(),
        };
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond(response));
        self
    }

    pub fn transport_error(self, url: &str, message: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Fail(message.to_string()));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self.routes.lock().unwrap().get(url).cloned();
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail(message)) => Err(AppError::NetworkError(message)),
            None => Ok(FetchResponse {
                status: 404,
                final_url: url.to_string(),
                content_type: Some("text/html".to_string()),
                body: Vec::new(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MockOptimizer
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum OptimizerMode {
    Passthrough,
    Tagging,
    Failing,
}

/// Mock optimizer with a fixed behavior.
#[derive(Clone)]
pub struct MockOptimizer {
    mode: OptimizerMode,
}

impl MockOptimizer {
    /// Returns the input unchanged as [`AssetFormat::Other`].
    pub fn passthrough() -> Self {
        Self::with_mode(OptimizerMode::Passthrough)
    }

    /// Prefixes the input with `optimized:` and reports JPEG.
    pub fn tagging() -> Self {
        Self::with_mode(OptimizerMode::Tagging)
    }

    /// Always fails, as for undecodable bytes.
    pub fn failing() -> Self {
        Self::with_mode(OptimizerMode::Failing)
    }

    fn with_mode(mode: OptimizerMode) -> Self {
        Self { mode }
    }
}

impl Optimizer for MockOptimizer {
    fn optimize(&self, data: &[u8]) -> Result<Optimized, AppError> {
        match self.mode {
            OptimizerMode::Passthrough => Ok(Optimized {
                format: AssetFormat::Other,
                bytes: data.to_vec(),
            }),
            OptimizerMode::Tagging => {
                let mut bytes = b"optimized:".to_vec();
                bytes.extend_from_slice(data);
                Ok(Optimized {
                    format: AssetFormat::Jpeg,
                    bytes,
                })
            }
            OptimizerMode::Failing => Err(AppError::ImageError("cannot decode".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockLinkExtractor
// ---------------------------------------------------------------------------

/// Link extractor over a toy page format.
///
/// The page body is whitespace-separated tokens: `a:<href>` is an anchor,
/// `asset:<src>` is an asset. Anything else is ignored.
#[derive(Clone, Default)]
pub struct MockLinkExtractor;

impl LinkExtractor for MockLinkExtractor {
    fn extract(&self, html: &str) -> PageLinks {
        let mut links = PageLinks::default();
        for token in html.split_whitespace() {
            if let Some(href) = token.strip_prefix("a:") {
                links.anchors.push(href.to_string());
            } else if let Some(src) = token.strip_prefix("asset:") {
                links.assets.push(src.to_string());
            }
        }
        links
    }
}

// ---------------------------------------------------------------------------
// MemoryAssetStore
// ---------------------------------------------------------------------------

/// In-memory asset store that counts writes.
#[derive(Clone, Default)]
pub struct MemoryAssetStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(name: &str, data: &[u8]) -> Self {
        let store = Self::new();
        store.insert(name, data);
        store
    }

    /// Seed a file without counting it as a write.
    pub fn insert(&self, name: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Names written through the trait, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl AssetStore for MemoryAssetStore {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.get(name))
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<(), AppError> {
        self.insert(name, data);
        self.writes.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
