pub mod common_scraper;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod markup;
pub mod models;
pub mod otomoto_scraper;
pub mod pagination;
pub mod parser;
pub mod selectors;
pub mod tui;
pub mod utils;
