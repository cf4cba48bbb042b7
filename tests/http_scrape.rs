//! Drives the HTTP fetcher and a full brand scrape against a local mock server.

use mockito::{Matcher, Server};
use otomotofinder::config::{DelayRange, RetryPolicy, ScraperConfig};
use otomotofinder::fetch::{HttpFetcher, PageFetcher};
use otomotofinder::otomoto_scraper::{BrandScraper, Strategy};
use otomotofinder::utils;
use std::time::Duration;

const LISTING_PAGE: &str = r#"<html><body>
    <article data-sentry-component="AdCardWrapper">
        <h2 data-sentry-element="Title"><a href="/osobowe/oferta/bmw-x5-ID1.html">BMW X5 xDrive30d</a></h2>
        <p data-sentry-element="SubTitle">2993 cm3 • 258 KM</p>
        <dd data-parameter="mileage">125 000 km</dd>
        <dd data-parameter="fuel_type">Diesel</dd>
        <dd data-parameter="gearbox">Automatyczna</dd>
        <dd data-parameter="year">2019</dd>
        <p class="ooa-oj1jk2">Warszawa (mazowieckie)</p>
        <h3 data-sentry-element="Price">189 900</h3>
    </article>
</body></html>"#;

fn test_config(base_url: String) -> ScraperConfig {
    ScraperConfig {
        base_url,
        user_agents: vec!["TestAgent/1.0".to_string()],
        page_delay: DelayRange::NONE,
        brand_delay: DelayRange::NONE,
        timeout_secs: 5,
        challenge_cooldown_secs: 0,
        retry: RetryPolicy::no_retries(),
        show_progress: false,
        ..ScraperConfig::default()
    }
}

#[test]
fn fetcher_sends_the_user_agent_and_returns_the_body() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/listing")
        .match_header("user-agent", "TestAgent/1.0")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<html>ok</html>")
        .create();

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let page = fetcher
        .fetch(&format!("{}/listing", server.url()), "TestAgent/1.0")
        .unwrap();

    mock.assert();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>ok</html>");
    assert!(!page.is_challenge());
}

#[test]
fn fetcher_reports_the_final_url_after_a_captcha_redirect() {
    let mut server = Server::new();
    let _redirect = server
        .mock("GET", "/osobowe/audi")
        .with_status(302)
        .with_header("location", "/captcha-delivery")
        .create();
    let _captcha = server
        .mock("GET", "/captcha-delivery")
        .with_status(200)
        .with_body("solve me")
        .create();

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let page = fetcher
        .fetch(&format!("{}/osobowe/audi", server.url()), "TestAgent/1.0")
        .unwrap();

    assert!(page.url.ends_with("/captcha-delivery"));
    assert!(page.is_challenge());
}

#[test]
fn fetcher_passes_error_statuses_through() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/gone").with_status(410).create();

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let page = fetcher
        .fetch(&format!("{}/gone", server.url()), "TestAgent/1.0")
        .unwrap();

    assert_eq!(page.status, 410);
    assert!(page.into_checked().is_err());
}

#[test]
fn single_page_brand_is_scraped_into_csv() {
    let mut server = Server::new();
    // Page count detection and page 1 hit the same URL.
    let mock = server
        .mock("GET", Matcher::Regex(r"^/osobowe/bmw".to_string()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(LISTING_PAGE)
        .expect(2)
        .create();

    let output = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let scraper = BrandScraper::new(fetcher, test_config(server.url()), output.path());

    let summary = scraper.scrape_brand("bmw").unwrap();
    mock.assert();

    assert_eq!(summary.strategy, Strategy::Counted);
    assert_eq!(summary.pages_scraped, 1);
    assert_eq!(summary.listings, 1);

    let mut reader = csv::Reader::from_path(utils::brand_output_path(output.path(), "bmw")).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(&row[0], "BMW");
    assert_eq!(&row[1], "X5");
    assert_eq!(&row[2], "xDrive30d");
    assert_eq!(&row[3], "189 900");
    assert_eq!(&row[4], "258");
    assert_eq!(&row[9], "2993 cm3");
    assert_eq!(&row[10], "Warszawa");
    assert_eq!(&row[12], "0");
    assert_eq!(&row[13], format!("{}/osobowe/oferta/bmw-x5-ID1.html", server.url()));
}
