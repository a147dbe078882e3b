//! Search command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use directories::ProjectDirs;
use tracing::debug;
use url::Url;

use glimpse_core::{
    ApiKey, CacheDir, DEFAULT_RETAIN_PAGES, NextPage, Pager, PhotoSize, ResultStore,
    SearchResultPage, SearchTerm,
};
use glimpse_flickr::{FlickrConfig, FlickrSearch};

use crate::output;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search term
    pub term: String,

    /// Flickr API key
    #[arg(long, env = "GLIMPSE_API_KEY")]
    pub api_key: String,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Pages whose thumbnails stay decoded in memory
    #[arg(long, default_value_t = DEFAULT_RETAIN_PAGES)]
    pub retain: usize,

    /// Directory for locally cached thumbnails (defaults to the platform
    /// cache dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Skip thumbnail prefetching
    #[arg(long)]
    pub no_thumbnails: bool,

    /// Override the REST endpoint
    #[arg(long)]
    pub endpoint: Option<Url>,

    /// Emit pages as JSON instead of the table view
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SearchArgs) -> Result<()> {
    let term = SearchTerm::new(&args.term).context("Invalid search term")?;
    let api_key = ApiKey::new(args.api_key).context("Invalid API key")?;

    let cache_root = args.cache_dir.or_else(|| {
        ProjectDirs::from("rs", "glimpse", "glimpse")
            .map(|dirs| dirs.cache_dir().join("thumbnails"))
    });

    let mut config = FlickrConfig::new(api_key).prefetch_thumbnails(!args.no_thumbnails);
    if let Some(endpoint) = args.endpoint {
        config = config.endpoint(endpoint);
    }
    if let Some(root) = cache_root {
        config = config.cache(CacheDir::new(root));
    }

    debug!(retain = args.retain, pages = args.pages, "starting search");
    let pager = Pager::with_store(FlickrSearch::new(config), ResultStore::new(args.retain));

    let outcome = pager
        .new_search(term.clone())
        .await
        .context("Search failed")?;
    report(&pager, outcome, args.json)?;

    for _ in 1..args.pages {
        let outcome = pager.next_page().await.context("Pagination failed")?;
        if outcome == NextPage::Exhausted {
            eprintln!("{}", "No more pages.".dimmed());
            break;
        }
        report(&pager, outcome, args.json)?;
    }

    eprintln!(
        "{}",
        format!(
            "{} records across {} pages for '{}'",
            pager.record_count(),
            pager.page_count(),
            term
        )
        .dimmed()
    );
    Ok(())
}

fn report(pager: &Pager<FlickrSearch>, outcome: NextPage, json: bool) -> Result<()> {
    let NextPage::Fetched { page, .. } = outcome else {
        return Ok(());
    };
    pager.read_store(|store| {
        let Some(fetched) = store.pages().iter().find(|p| p.page() == page) else {
            return Ok(());
        };
        if json {
            output::json(fetched)
        } else {
            print_page(fetched)
        }
    })
}

fn print_page(page: &SearchResultPage) -> Result<()> {
    output::heading(&format!(
        "page {} of {} ({} records)",
        page.page(),
        page.pages(),
        page.len()
    ));
    for record in page.records() {
        let url = record
            .image_url(PhotoSize::Thumbnail)
            .map(|u| u.to_string())
            .unwrap_or_default();
        let thumb = match record.thumbnail() {
            Some(t) => format!("{}x{}", t.width(), t.height()).green().to_string(),
            None => "-".dimmed().to_string(),
        };
        println!("{}  {}  {}", record.id().bold(), thumb, url.dimmed());
    }
    Ok(())
}
