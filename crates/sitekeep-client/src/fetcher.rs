use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use sitekeep_core::error::AppError;
use sitekeep_core::models::FetchResponse;
use sitekeep_core::traits::Fetcher;

/// HTTP fetcher using reqwest.
///
/// Sends GET requests with a fixed User-Agent and timeout, following
/// redirects. Every status code is handed back to the caller; only
/// transport failures become errors.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn map_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else if e.is_builder() {
            AppError::InvalidUrl(e.to_string())
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        tracing::debug!(%url, status, bytes = body.len(), "Fetched");

        Ok(FetchResponse {
            status,
            final_url,
            content_type,
            body: body.to_vec(),
        })
    }
}
