use crate::common_scraper::ListingScraper;
use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::fetch::{FetchedPage, PageFetcher};
use crate::markup::MarkupNode;
use crate::models::ListingRecord;
use crate::tui::BrandProgress;
use crate::{pagination, parser, selectors, utils};
use anyhow::{Context, Result};
use scraper::Html;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error, info, warn};
use url::Url;

const SEARCH_ORDER: &str = "search%5Border%5D=created_at_first%3Adesc";

/// Which fetch loop produced a [`BrandSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Pages 1..=N with N taken from the first page's pagination.
    Counted,
    /// Page after page until a page is empty or has no next control.
    Iterative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSummary {
    pub brand: String,
    pub strategy: Strategy,
    pub pages_scraped: u32,
    pub pages_failed: u32,
    pub listings: usize,
}

impl BrandSummary {
    fn new(brand: &str, strategy: Strategy) -> Self {
        Self {
            brand: brand.to_string(),
            strategy,
            pages_scraped: 0,
            pages_failed: 0,
            listings: 0,
        }
    }
}

/// Everything needed to fetch one results page of one brand.
#[derive(Debug, Clone, Copy)]
pub struct PageFetchContext<'a> {
    pub brand: &'a str,
    pub page: u32,
    pub base_url: &'a str,
    pub user_agent: &'a str,
}

impl PageFetchContext<'_> {
    /// Page 1 is the bare search URL; later pages add `&page=N`.
    pub fn page_url(&self) -> String {
        if self.page > 1 {
            format!("{}&page={}", self.base_url, self.page)
        } else {
            self.base_url.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageOutcome {
    listings: usize,
    has_next: bool,
}

/// Walks the search results of one brand and appends every listing to the
/// brand's CSV file, page by page.
pub struct BrandScraper<F> {
    fetcher: F,
    config: ScraperConfig,
    output_dir: PathBuf,
}

impl<F: PageFetcher> BrandScraper<F> {
    pub fn new(fetcher: F, config: ScraperConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            config,
            output_dir: output_dir.into(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Newest-first search URL for `brand`.
    pub fn search_url(&self, brand: &str) -> String {
        format!(
            "{}/osobowe/{}?{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(brand),
            SEARCH_ORDER
        )
    }

    /// Scrapes `brand` over the page count detected on its first page.
    ///
    /// Falls back to [`Self::scrape_brand_iteratively`] when the first request
    /// fails or lands on a bot challenge. A failing page is logged and skipped.
    pub fn scrape_brand(&self, brand: &str) -> Result<BrandSummary> {
        let base_url = self.search_url(brand);

        let first_page = match self.fetch_with_retry(&base_url, self.config.random_user_agent()) {
            Ok(page) => page,
            Err(FetchError::Challenge { url }) => {
                warn!(brand, url = %url, "bot challenge detected, cooling down before iterative scraping");
                thread::sleep(self.config.challenge_cooldown());
                return self.scrape_brand_iteratively(brand);
            }
            Err(e) => {
                warn!(brand, error = %e, "page count detection failed, switching to iterative scraping");
                return self.scrape_brand_iteratively(brand);
            }
        };

        let total_pages = {
            let document = Html::parse_document(&first_page.body);
            pagination::detect_page_count(&document.root_element(), self.config.max_pages)
        };

        info!(brand, total_pages, "scraping brand");

        let mut summary = BrandSummary::new(brand, Strategy::Counted);
        let mut progress = BrandProgress::counted(brand, total_pages, self.config.show_progress);

        for page in 1..=total_pages {
            self.config.page_delay.sleep();

            let context = PageFetchContext {
                brand,
                page,
                base_url: &base_url,
                user_agent: self.config.random_user_agent(),
            };

            match self.scrape_page(&context) {
                Ok(outcome) => {
                    summary.pages_scraped += 1;
                    summary.listings += outcome.listings;
                    progress.page_done(outcome.listings);
                }
                Err(e) => {
                    error!(brand, page, error = %format!("{e:#}"), "failed to scrape page");
                    summary.pages_failed += 1;
                    progress.page_done(0);
                }
            }
        }

        progress.finish();
        Ok(summary)
    }

    /// Scrapes `brand` without knowing the page count.
    ///
    /// Stops at the first page without listings, without an enabled next
    /// control, past `max_pages`, or at the first failing page. Pages saved
    /// before the stop are kept.
    pub fn scrape_brand_iteratively(&self, brand: &str) -> Result<BrandSummary> {
        let base_url = self.search_url(brand);
        info!(brand, "scraping brand iteratively");

        let mut summary = BrandSummary::new(brand, Strategy::Iterative);
        let mut progress = BrandProgress::open_ended(brand, self.config.show_progress);
        let mut page = 1;

        while page <= self.config.max_pages {
            self.config.page_delay.sleep();

            let context = PageFetchContext {
                brand,
                page,
                base_url: &base_url,
                user_agent: self.config.random_user_agent(),
            };

            match self.scrape_page(&context) {
                Ok(outcome) if outcome.listings == 0 => {
                    info!(brand, page, "no listings on page, end of results");
                    break;
                }
                Ok(outcome) => {
                    summary.pages_scraped += 1;
                    summary.listings += outcome.listings;
                    progress.page_done(outcome.listings);

                    if !outcome.has_next {
                        debug!(brand, page, "no next page");
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    error!(brand, page, error = %format!("{e:#}"), "failed to scrape page, stopping brand");
                    summary.pages_failed += 1;
                    break;
                }
            }
        }

        progress.finish();
        Ok(summary)
    }

    /// Fetch, parse and persist a single results page.
    fn scrape_page(&self, context: &PageFetchContext<'_>) -> Result<PageOutcome> {
        let url = context.page_url();
        let page = self.fetch_with_retry(&url, context.user_agent)?;
        let base = Url::parse(&url).context(format!("Invalid page URL: {}", url))?;

        let document = Html::parse_document(&page.body);
        let root = document.root_element();

        let records: Vec<ListingRecord> = root
            .find_all(&selectors::listing_card())
            .iter()
            .map(|card| parser::extract_listing(card, &base))
            .collect();
        let has_next = pagination::has_next_page(&root);

        let output_path = utils::brand_output_path(&self.output_dir, context.brand);
        utils::append_listings_to_csv(&records, &output_path)
            .context(format!("Failed to save page {} of {}", context.page, context.brand))?;

        debug!(
            brand = context.brand,
            page = context.page,
            listings = records.len(),
            has_next,
            "page scraped"
        );

        Ok(PageOutcome {
            listings: records.len(),
            has_next,
        })
    }

    /// Fetches `url`, repeating transient failures as the retry policy allows.
    fn fetch_with_retry(&self, url: &str, user_agent: &str) -> Result<FetchedPage, FetchError> {
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            let result = self
                .fetcher
                .fetch(url, user_agent)
                .and_then(FetchedPage::into_checked);

            match result {
                Err(e) if e.is_transient() && attempt + 1 < policy.max_attempts => {
                    let wait = policy.backoff(attempt);
                    warn!(url, attempt = attempt + 1, error = %e, ?wait, "request failed, retrying");
                    thread::sleep(wait);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl<F: PageFetcher> ListingScraper for BrandScraper<F> {
    fn name(&self) -> &str {
        "Otomoto.pl"
    }

    fn scrape_brand(&self, brand: &str) -> Result<BrandSummary> {
        BrandScraper::scrape_brand(self, brand)
    }
}
