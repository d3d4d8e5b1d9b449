use std::sync::Arc;

use scraper::{Html, Selector};
use sitekeep_core::models::PageLinks;
use sitekeep_core::traits::LinkExtractor;

/// Structural link extractor using scraper.
///
/// Anchors come from `a[href]`; assets from `img[src]`, `script[src]` and
/// `link[href]`.
#[derive(Clone)]
pub struct ScraperLinkExtractor {
    selectors: Arc<Selectors>,
}

struct Selectors {
    anchors: Selector,
    /// (selector, attribute) pairs.
    assets: Vec<(Selector, &'static str)>,
}

const ASSET_RULES: &[(&str, &str)] = &[
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("link[href]", "href"),
];

impl ScraperLinkExtractor {
    pub fn new() -> Self {
        let anchors = Selector::parse("a[href]").expect("anchor selector is valid");
        let assets = ASSET_RULES
            .iter()
            .map(|(css, attr)| (Selector::parse(css).expect("asset selector is valid"), *attr))
            .collect();

        Self {
            selectors: Arc::new(Selectors { anchors, assets }),
        }
    }
}

impl Default for ScraperLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for ScraperLinkExtractor {
    fn extract(&self, html: &str) -> PageLinks {
        let document = Html::parse_document(html);

        let anchors = document
            .select(&self.selectors.anchors)
            .filter_map(|el| el.value().attr("href"))
            .map(str::to_string)
            .collect();

        let assets = self
            .selectors
            .assets
            .iter()
            .flat_map(|(selector, attr)| {
                document
                    .select(selector)
                    .filter_map(|el| el.value().attr(attr))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        PageLinks { anchors, assets }
    }
}
