use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::models::{BrokenLink, CrawlReport, FailureReason};
use crate::pacing::PacedFetcher;
use crate::traits::{Fetcher, LinkExtractor};

/// Whether a raw reference found on a page belongs to the site.
///
/// Relative and scheme-relative references are internal. Absolute ones are
/// internal only when they are http(s) on the entry URL's host and port;
/// `mailto:`, `tel:`, `javascript:`, `data:` and other schemes never are.
pub fn is_internal(reference: &str, root: &Url) -> bool {
    let reference = reference.trim();
    if reference.is_empty() {
        return false;
    }
    match Url::parse(reference) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str() == root.host_str()
                && url.port_or_known_default() == root.port_or_known_default()
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Resolve `reference` against `base`, dropping any fragment.
pub fn resolve(reference: &str, base: &Url) -> Option<Url> {
    let mut url = base.join(reference.trim()).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// True when `url` lies under `root`: same origin and a path prefix match.
pub fn is_within(url: &Url, root: &Url) -> bool {
    url.scheme() == root.scheme()
        && url.host_str() == root.host_str()
        && url.port_or_known_default() == root.port_or_known_default()
        && url.path().starts_with(root.path())
}

/// Crawl state: pages waiting to be visited plus everything already seen.
#[derive(Debug)]
pub struct Frontier {
    root: Url,
    queue: VecDeque<Url>,
    /// Pages visited or queued.
    visited: HashSet<String>,
    /// Assets already checked.
    checked: HashSet<String>,
}

impl Frontier {
    pub fn new(root: Url) -> Self {
        let mut frontier = Self {
            root: root.clone(),
            queue: VecDeque::new(),
            visited: HashSet::new(),
            checked: HashSet::new(),
        };
        frontier.visited.insert(root.to_string());
        frontier.queue.push_back(root);
        frontier
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn next_page(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Queue a page unless it is outside the root or already seen.
    pub fn enqueue_page(&mut self, url: Url) -> bool {
        if !is_within(&url, &self.root) || !self.visited.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Record an asset as checked. Returns false if it already was.
    pub fn mark_asset(&mut self, url: &Url) -> bool {
        self.checked.insert(url.to_string())
    }

    pub fn pages_seen(&self) -> usize {
        self.visited.len()
    }

    pub fn assets_checked(&self) -> usize {
        self.checked.len()
    }
}

/// Breadth-first checker for a site's pages and the assets they load.
///
/// Pages and assets are fetched one at a time with a fixed pause between
/// requests. Anchors feed the frontier; image, script and stylesheet
/// references are checked once each and never crawled.
pub struct LinkChecker<F, X>
where
    F: Fetcher,
    X: LinkExtractor,
{
    fetcher: PacedFetcher<F>,
    extractor: X,
}

impl<F, X> LinkChecker<F, X>
where
    F: Fetcher,
    X: LinkExtractor,
{
    pub fn new(fetcher: F, extractor: X, delay: Duration) -> Self {
        Self {
            fetcher: PacedFetcher::new(fetcher, delay),
            extractor,
        }
    }

    /// Crawl from `entry` and report every broken page or asset.
    ///
    /// Only an unparseable entry URL is an error; failures of individual
    /// URLs end up in the report.
    pub async fn check(&self, entry: &str) -> Result<CrawlReport, AppError> {
        let mut root =
            Url::parse(entry).map_err(|e| AppError::InvalidUrl(format!("{entry}: {e}")))?;
        root.set_fragment(None);

        tracing::info!("Crawling from {} ...", root);

        let mut frontier = Frontier::new(root);
        let mut broken = Vec::new();

        while let Some(page) = frontier.next_page() {
            let response = match self.fetcher.fetch(page.as_str()).await {
                Ok(resp) if resp.is_error() => {
                    record(&mut broken, &page, FailureReason::Status(resp.status));
                    continue;
                }
                Ok(resp) => resp,
                Err(e) => {
                    record(&mut broken, &page, FailureReason::Transport(e.to_string()));
                    continue;
                }
            };

            if !response.is_html() {
                tracing::debug!(url = %page, "Not HTML, skipping link extraction");
                continue;
            }

            let base = Url::parse(&response.final_url).unwrap_or_else(|_| page.clone());
            let html = String::from_utf8_lossy(&response.body);
            let links = self.extractor.extract(&html);
            tracing::debug!(
                url = %page,
                anchors = links.anchors.len(),
                assets = links.assets.len(),
                "Parsed page"
            );

            for reference in &links.assets {
                if !is_internal(reference, frontier.root()) {
                    continue;
                }
                let Some(asset) = resolve(reference, &base) else {
                    continue;
                };
                if !frontier.mark_asset(&asset) {
                    continue;
                }
                if let Some(reason) = self.check_asset(&asset).await {
                    record(&mut broken, &asset, reason);
                }
            }

            for reference in &links.anchors {
                if !is_internal(reference, frontier.root()) {
                    continue;
                }
                if let Some(target) = resolve(reference, &base) {
                    frontier.enqueue_page(target);
                }
            }
        }

        let report = CrawlReport {
            pages_checked: frontier.pages_seen(),
            assets_checked: frontier.assets_checked(),
            broken,
        };
        tracing::info!(
            pages = report.pages_checked,
            assets = report.assets_checked,
            broken = report.broken.len(),
            "Crawl complete"
        );
        Ok(report)
    }

    async fn check_asset(&self, url: &Url) -> Option<FailureReason> {
        match self.fetcher.fetch(url.as_str()).await {
            Ok(resp) if resp.is_error() => Some(FailureReason::Status(resp.status)),
            Ok(_) => None,
            Err(e) => Some(FailureReason::Transport(e.to_string())),
        }
    }
}

fn record(broken: &mut Vec<BrokenLink>, url: &Url, reason: FailureReason) {
    tracing::warn!(%url, %reason, "Broken link");
    broken.push(BrokenLink {
        url: url.to_string(),
        reason,
    });
}
