use std::future::Future;

use crate::error::AppError;
use crate::models::{FetchResponse, Optimized, PageLinks};

/// Performs one HTTP GET, following redirects.
///
/// Any status code is returned as `Ok`; only transport-level failures
/// (timeout, refused connection, DNS) are `Err`.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, AppError>> + Send;
}

/// Decodes and re-encodes downloaded image bytes.
///
/// Formats the optimizer does not handle come back unchanged with
/// [`AssetFormat::Other`](crate::models::AssetFormat::Other). An `Err` means
/// the bytes could not be decoded or encoded; callers fall back to the
/// original payload.
pub trait Optimizer: Send + Sync + Clone {
    fn optimize(&self, data: &[u8]) -> Result<Optimized, AppError>;
}

/// Pulls anchor and asset references out of an HTML page.
pub trait LinkExtractor: Send + Sync + Clone {
    fn extract(&self, html: &str) -> PageLinks;
}

/// Flat, name-addressed storage for mirrored assets.
pub trait AssetStore: Send + Sync + Clone {
    /// Returns `None` when no asset of that name exists.
    fn read(&self, name: &str) -> impl Future<Output = Result<Option<Vec<u8>>, AppError>> + Send;

    fn write(&self, name: &str, data: &[u8]) -> impl Future<Output = Result<(), AppError>> + Send;
}
