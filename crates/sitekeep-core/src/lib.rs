pub mod config;
pub mod crawl;
pub mod error;
pub mod localize;
pub mod markup;
pub mod models;
pub mod naming;
pub mod pacing;
pub mod store;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{CrawlConfig, LocalizeConfig};
pub use crawl::LinkChecker;
pub use error::AppError;
pub use localize::LocalizeService;
pub use models::{
    AssetFormat, BrokenLink, CrawlReport, FailureReason, FetchResponse, LocalizeReport, Optimized,
    PageLinks, compute_hash,
};
pub use store::DirAssetStore;
pub use traits::{AssetStore, Fetcher, LinkExtractor, Optimizer};
