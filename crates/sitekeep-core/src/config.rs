use std::time::Duration;

use crate::error::AppError;

pub const LOCALIZER_USER_AGENT: &str = "MediumImageFetcher/1.0";
pub const LOCALIZER_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PUBLIC_PREFIX: &str = "/images/medium/";

pub const CHECKER_USER_AGENT: &str = "LocalLinkChecker/1.0";
pub const CHECKER_TIMEOUT: Duration = Duration::from_secs(8);
pub const CHECKER_DELAY: Duration = Duration::from_millis(20);
pub const DEFAULT_ENTRY_URL: &str = "http://localhost:8000";

/// Settings for the image localizer.
#[derive(Debug, Clone)]
pub struct LocalizeConfig {
    /// Path prefix written into rewritten `src` values, e.g. `/images/medium/`.
    pub public_prefix: String,
    /// When set, only documents with exactly this file name are processed.
    /// Otherwise every `.html`/`.htm` file is.
    pub document_name: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for LocalizeConfig {
    fn default() -> Self {
        Self {
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
            document_name: None,
            timeout: LOCALIZER_TIMEOUT,
            user_agent: LOCALIZER_USER_AGENT.to_string(),
        }
    }
}

impl LocalizeConfig {
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The prefix must be an absolute URL path ending in `/`.
    pub fn validate(&self) -> Result<(), AppError> {
        let prefix = &self.public_prefix;
        if prefix.is_empty() || !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(AppError::ConfigError(format!(
                "Invalid public prefix '{prefix}': must start and end with '/'"
            )));
        }
        if self.timeout.is_zero() {
            return Err(AppError::ConfigError("Timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Settings for the link checker.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Pause between consecutive requests to the same host.
    pub delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: CHECKER_TIMEOUT,
            user_agent: CHECKER_USER_AGENT.to_string(),
            delay: CHECKER_DELAY,
        }
    }
}

impl CrawlConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout.is_zero() {
            return Err(AppError::ConfigError("Timeout must be non-zero".into()));
        }
        Ok(())
    }
}
