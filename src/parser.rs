use crate::markup::MarkupNode;
use crate::models::{ListingRecord, MISSING, MISSING_LINK, MISSING_PRICE};
use crate::selectors;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static POWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*KM").expect("power pattern is valid"));

static DISPLACEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+[\s\d]*\s*cm3)").expect("displacement pattern is valid"));

const PRIVATE_SELLER: &str = "Prywatny sprzedawca";

/// Builds a record from one listing card. Never fails: every element that
/// cannot be found turns into the matching sentinel.
pub fn extract_listing<N: MarkupNode>(listing: &N, base_url: &Url) -> ListingRecord {
    let mut record = ListingRecord::missing();

    if let Some(title) = listing.find_first(&selectors::title()) {
        let (marka, model, opis) = split_title(&title.text_content());
        record.marka = marka;
        record.model = model;
        record.opis = opis;
        record.link = title
            .find_first(&selectors::title_link())
            .and_then(|link| link.attribute("href").and_then(|href| base_url.join(href).ok()))
            .map(String::from)
            .unwrap_or_else(|| MISSING_LINK.to_string());
    }

    record.cena = listing
        .find_first(&selectors::price())
        .map(|price| price.text_content().trim().to_string())
        .unwrap_or_else(|| MISSING_PRICE.to_string());

    if let Some(subtitle) = listing.find_first(&selectors::subtitle()) {
        let text = subtitle.text_content();
        let text = text.trim();
        record.moc_km = parse_power(text);
        record.pojemnosc = parse_displacement(text).unwrap_or_else(|| MISSING.to_string());
    }

    let params: Vec<String> = listing
        .find_all(&selectors::technical_param())
        .iter()
        .map(|param| param.text_content().trim().to_string())
        .collect();
    let params = TechnicalParams::from_positional(&params);
    record.przebieg = params.przebieg;
    record.paliwo = params.paliwo;
    record.skrzynia = params.skrzynia;
    record.rok = params.rok;

    if let Some((miasto, wojewodztwo)) = listing
        .find_first(&selectors::location())
        .and_then(|location| parse_location(&location.text_content()))
    {
        record.miasto = miasto;
        record.wojewodztwo = wojewodztwo;
    }

    record.czy_prywatny = listing
        .find_first(&selectors::seller_type())
        .is_some_and(|seller| is_private_seller(&seller.text_content()));

    record
}

/// Mileage, fuel type, gearbox and production year of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalParams {
    pub przebieg: String,
    pub paliwo: String,
    pub skrzynia: String,
    pub rok: String,
}

impl TechnicalParams {
    /// Assigns values by position: mileage, fuel, gearbox, year. Missing
    /// trailing entries become [`MISSING`], extra entries are ignored.
    ///
    /// The site does not label these reliably, so a reordering upstream
    /// silently shifts the columns.
    pub fn from_positional(values: &[String]) -> Self {
        let at = |index: usize| {
            values
                .get(index)
                .cloned()
                .unwrap_or_else(|| MISSING.to_string())
        };

        Self {
            przebieg: at(0),
            paliwo: at(1),
            skrzynia: at(2),
            rok: at(3),
        }
    }
}

/// Splits a title into brand, model and the free-text remainder.
pub fn split_title(title: &str) -> (String, String, String) {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let token = |index: usize| {
        tokens
            .get(index)
            .map(|token| token.to_string())
            .unwrap_or_else(|| MISSING.to_string())
    };

    let opis = if tokens.len() > 2 {
        tokens[2..].join(" ")
    } else {
        MISSING.to_string()
    };

    (token(0), token(1), opis)
}

/// Engine power in KM, e.g. `258` from "2993 cm3 • 258 KM".
pub fn parse_power(text: &str) -> Option<u32> {
    POWER_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Displacement as written on the card, interior spaces included
/// (e.g. "1 598 cm3").
pub fn parse_displacement(text: &str) -> Option<String> {
    DISPLACEMENT_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
}

/// Splits "City (Region)" into its two parts. Only the first parenthesised
/// group counts as the region.
pub fn parse_location(text: &str) -> Option<(String, String)> {
    let mut parts = text.split('(');
    let city = parts.next()?;
    let region = parts.next()?.replace(')', "");

    Some((city.trim().to_string(), region.trim().to_string()))
}

pub fn is_private_seller(text: &str) -> bool {
    text.contains(PRIVATE_SELLER)
}
