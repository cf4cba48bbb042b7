use anyhow::Result;
use clap::Parser;
use otomotofinder::common_scraper::run_all_brands;
use otomotofinder::config::ScraperConfig;
use otomotofinder::fetch::HttpFetcher;
use otomotofinder::otomoto_scraper::BrandScraper;
use otomotofinder::{logger, utils};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Otomotofinder - car listings scraper for otomoto.pl")]
struct Args {
    /// File with one brand per line
    #[clap(short, long, default_value = "input/brands.txt")]
    input: PathBuf,

    /// Directory for the per-brand CSV files
    #[clap(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Directory for run log files
    #[clap(long, default_value = "logs")]
    log_dir: PathBuf,

    /// JSON file overriding delays, timeouts, user agents and retries
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of pages to scrape per brand
    #[clap(short, long)]
    max_pages: Option<u32>,

    /// Brand to scrape instead of reading the input file (repeatable)
    #[clap(short, long = "brand")]
    brands: Vec<String>,

    /// Disable progress bars
    #[clap(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = logger::init(&args.log_dir)?;
    info!(log = %log_path.display(), "starting otomoto scrape");

    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    if args.no_progress {
        config.show_progress = false;
    }
    config.validate()?;

    let mut dirs = vec![args.output_dir.as_path()];
    if let Some(input_dir) = args.input.parent() {
        dirs.push(input_dir);
    }
    utils::create_directories(&dirs)?;

    let brands = if args.brands.is_empty() {
        match utils::read_brands_from_file(&args.input) {
            Ok(brands) => brands,
            Err(e) => {
                error!(error = %format!("{e:#}"), "cannot read brand list");
                return Err(e);
            }
        }
    } else {
        args.brands.clone()
    };

    if brands.is_empty() {
        warn!(input = %args.input.display(), "no brands to scrape");
        return Ok(());
    }

    let fetcher = HttpFetcher::new(config.timeout())?;
    let brand_delay = config.brand_delay;
    let scraper = BrandScraper::new(fetcher, config, &args.output_dir);

    let summary = run_all_brands(&scraper, &brands, &brand_delay);

    info!(
        completed = summary.brands_completed,
        failed = summary.brands_failed,
        listings = summary.listings,
        output = %args.output_dir.display(),
        "scrape finished"
    );

    Ok(())
}
