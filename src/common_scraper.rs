use crate::config::DelayRange;
use crate::otomoto_scraper::BrandSummary;
use anyhow::Result;
use tracing::{error, info};

/// A site scraper that can process one brand at a time.
pub trait ListingScraper {
    fn name(&self) -> &str;
    fn scrape_brand(&self, brand: &str) -> Result<BrandSummary>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub brands_completed: usize,
    pub brands_failed: usize,
    pub listings: usize,
}

/// Scrapes every brand in order, one at a time.
///
/// A brand that fails is logged and skipped. After every brand, successful or
/// not, the thread sleeps for a sample of `brand_delay`.
pub fn run_all_brands<S: ListingScraper>(
    scraper: &S,
    brands: &[String],
    brand_delay: &DelayRange,
) -> RunSummary {
    info!("{} scraper: {} brands to process", scraper.name(), brands.len());

    let mut summary = RunSummary::default();

    for (index, brand) in brands.iter().enumerate() {
        info!(brand = brand.as_str(), "starting brand {}/{}", index + 1, brands.len());

        match scraper.scrape_brand(brand) {
            Ok(brand_summary) => {
                info!(
                    brand = brand.as_str(),
                    strategy = ?brand_summary.strategy,
                    pages = brand_summary.pages_scraped,
                    failed_pages = brand_summary.pages_failed,
                    listings = brand_summary.listings,
                    "brand finished"
                );
                summary.brands_completed += 1;
                summary.listings += brand_summary.listings;
            }
            Err(e) => {
                error!(brand = brand.as_str(), error = %format!("{e:#}"), "failed to scrape brand");
                summary.brands_failed += 1;
            }
        }

        brand_delay.sleep();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otomoto_scraper::Strategy;
    use anyhow::bail;
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    struct ScriptedScraper {
        failing: &'static str,
        visited: RefCell<Vec<String>>,
    }

    impl ListingScraper for ScriptedScraper {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn scrape_brand(&self, brand: &str) -> Result<BrandSummary> {
            self.visited.borrow_mut().push(brand.to_string());
            if brand == self.failing {
                bail!("connection reset");
            }
            Ok(BrandSummary {
                brand: brand.to_string(),
                strategy: Strategy::Counted,
                pages_scraped: 1,
                pages_failed: 0,
                listings: 10,
            })
        }
    }

    #[test]
    fn failing_brand_does_not_stop_the_run() {
        let scraper = ScriptedScraper {
            failing: "audi",
            visited: RefCell::new(Vec::new()),
        };
        let brands: Vec<String> = ["bmw", "audi", "volvo"].iter().map(|b| b.to_string()).collect();

        let summary = run_all_brands(&scraper, &brands, &DelayRange::NONE);

        assert_eq!(*scraper.visited.borrow(), brands);
        assert_eq!(
            summary,
            RunSummary {
                brands_completed: 2,
                brands_failed: 1,
                listings: 20,
            }
        );
    }

    #[test]
    fn brand_delay_follows_failed_brands_too() {
        let scraper = ScriptedScraper {
            failing: "audi",
            visited: RefCell::new(Vec::new()),
        };
        let brands = vec!["audi".to_string(), "audi".to_string()];
        let delay = DelayRange::new(0.05, 0.05);

        let started = Instant::now();
        let summary = run_all_brands(&scraper, &brands, &delay);

        assert_eq!(summary.brands_failed, 2);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn empty_brand_list_does_nothing() {
        let scraper = ScriptedScraper {
            failing: "",
            visited: RefCell::new(Vec::new()),
        };

        let summary = run_all_brands(&scraper, &[], &DelayRange::NONE);

        assert!(scraper.visited.borrow().is_empty());
        assert_eq!(summary, RunSummary::default());
    }
}
