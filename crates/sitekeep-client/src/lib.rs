pub mod extractor;
pub mod fetcher;
pub mod optimizer;
pub mod resize;

pub use extractor::ScraperLinkExtractor;
pub use fetcher::ReqwestFetcher;
pub use optimizer::ImageRsOptimizer;
