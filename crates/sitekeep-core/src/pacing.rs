//! Politeness pause for the link checker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::FetchResponse;
use crate::traits::Fetcher;

/// A [`Fetcher`] that waits `delay` after each response before sending the
/// next request.
///
/// Requests go out one at a time; the pause is measured from when the
/// previous response (or failure) came back.
#[derive(Clone)]
pub struct PacedFetcher<F> {
    inner: F,
    delay: Duration,
    finished: Arc<Mutex<Option<Instant>>>,
}

impl<F: Fetcher> PacedFetcher<F> {
    pub fn new(inner: F, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            finished: Arc::new(Mutex::new(None)),
        }
    }
}

impl<F: Fetcher> Fetcher for PacedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, AppError> {
        if self.delay.is_zero() {
            return self.inner.fetch(url).await;
        }

        let mut finished = self.finished.lock().await;
        if let Some(at) = *finished {
            tokio::time::sleep_until(tokio::time::Instant::from_std(at + self.delay)).await;
        }
        let result = self.inner.fetch(url).await;
        *finished = Some(Instant::now());
        result
    }
}
