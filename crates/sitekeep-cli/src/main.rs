use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sitekeep_client::resize::{self, GeneratedFile, Preset};
use sitekeep_client::{ImageRsOptimizer, ReqwestFetcher, ScraperLinkExtractor};
use sitekeep_core::config::DEFAULT_ENTRY_URL;
use sitekeep_core::{
    CrawlConfig, CrawlReport, DirAssetStore, LinkChecker, LocalizeConfig, LocalizeService,
};

#[derive(Parser)]
#[command(name = "sitekeep", version, about = "Maintenance tools for a static blog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror externally hosted images and rewrite <img> references to the copies
    Localize {
        /// Directory tree of HTML documents
        #[arg(long, env = "SITEKEEP_BLOG_DIR", default_value = "blog")]
        root: PathBuf,

        /// Directory the mirrored images are written to
        #[arg(long, env = "SITEKEEP_ASSET_DIR", default_value = "images/medium")]
        assets: PathBuf,

        /// Path prefix written into rewritten src attributes
        #[arg(long, env = "SITEKEEP_PUBLIC_PREFIX", default_value = "/images/medium/")]
        prefix: String,

        /// Only process documents with this exact file name (e.g. index.html)
        #[arg(long)]
        only: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 15)]
        timeout: u64,

        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Crawl a running site and report broken internal links and assets
    CheckLinks {
        /// Entry URL of the site
        #[arg(env = "SITEKEEP_BASE_URL", default_value = DEFAULT_ENTRY_URL)]
        base_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 8)]
        timeout: u64,

        /// Pause between requests in milliseconds
        #[arg(long, default_value_t = 20)]
        delay_ms: u64,

        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Generate fixed-size avatar, logo, and favicon variants
    Resize {
        /// Directory holding author_.jpg and logo.png
        #[arg(long, env = "SITEKEEP_IMAGES_DIR", default_value = "images")]
        images: PathBuf,

        /// Print the generated files as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sitekeep=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Localize {
            root,
            assets,
            prefix,
            only,
            timeout,
            json,
        } => {
            let mut config = LocalizeConfig::default()
                .with_public_prefix(prefix)
                .with_timeout(Duration::from_secs(timeout));
            if let Some(name) = only {
                config = config.with_document_name(name);
            }
            cmd_localize(&root, &assets, config, json).await
        }
        Commands::CheckLinks {
            base_url,
            timeout,
            delay_ms,
            json,
        } => {
            let config = CrawlConfig::default()
                .with_timeout(Duration::from_secs(timeout))
                .with_delay(Duration::from_millis(delay_ms));
            cmd_check_links(&base_url, config, json).await
        }
        Commands::Resize { images, json } => cmd_resize(images, json).await,
    }
}

async fn cmd_localize(
    root: &Path,
    assets: &Path,
    config: LocalizeConfig,
    json: bool,
) -> Result<ExitCode> {
    config.validate()?;

    let fetcher = ReqwestFetcher::new(&config.user_agent, config.timeout)
        .context("Failed to create HTTP client")?;
    let store = DirAssetStore::open(assets)
        .await
        .with_context(|| format!("Failed to open asset directory: {}", assets.display()))?;
    let service = LocalizeService::new(fetcher, ImageRsOptimizer::new(), store, config);

    let report = service
        .localize_tree(root)
        .await
        .with_context(|| format!("Failed to localize images under {}", root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Replaced images: {}", report.references_rewritten);
    }

    Ok(ExitCode::SUCCESS)
}

async fn cmd_check_links(base_url: &str, config: CrawlConfig, json: bool) -> Result<ExitCode> {
    config.validate()?;

    let fetcher = ReqwestFetcher::new(&config.user_agent, config.timeout)
        .context("Failed to create HTTP client")?;
    let checker = LinkChecker::new(fetcher, ScraperLinkExtractor::new(), config.delay);

    let report = checker.check(base_url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Checked pages: {}", report.pages_checked);
        println!("Checked assets: {}", report.assets_checked);
        if report.is_clean() {
            println!("\nNo errors found (2xx/3xx only).");
        } else {
            println!("\nErrors found:");
            for broken in &report.broken {
                println!("- {} -> {}", broken.reason, broken.url);
            }
        }
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Process exit status for a finished crawl: 0 when clean, 1 otherwise.
fn exit_status(report: &CrawlReport) -> u8 {
    if report.is_clean() { 0 } else { 1 }
}

async fn cmd_resize(images: PathBuf, json: bool) -> Result<ExitCode> {
    let generated = tokio::task::spawn_blocking(move || {
        let mut generated = Vec::new();
        for preset in [resize::AVATAR, resize::LOGO] {
            generated.extend(run_preset(&images, &preset));
        }
        match resize::write_favicon(&images) {
            Ok(file) => generated.push(file),
            Err(e) => tracing::warn!(error = %e, "Skipping favicon"),
        }
        generated
    })
    .await
    .context("Resize task panicked")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
    } else {
        for file in &generated {
            println!(
                "{} ({}x{}px, {:.1} KB)",
                file.path.display(),
                file.width,
                file.height,
                file.size_kb()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// A failed preset is logged and skipped so the others still run.
fn run_preset(images: &Path, preset: &Preset) -> Vec<GeneratedFile> {
    match resize::generate(images, preset) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(
                preset = preset.label,
                source = %images.join(preset.source).display(),
                error = %e,
                "Skipping preset"
            );
            Vec::new()
        }
    }
}
