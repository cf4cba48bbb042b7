//! Markup anchors of the otomoto.pl search results page.
//!
//! Update this file when the site changes its HTML structure.

use crate::markup::{AttrPredicate, NodeFilter};

/// One advertisement card on a search results page.
pub fn listing_card() -> NodeFilter {
    NodeFilter::new("article").with(AttrPredicate::Equals("data-sentry-component", "AdCardWrapper"))
}

pub fn title() -> NodeFilter {
    NodeFilter::new("h2").with(AttrPredicate::Equals("data-sentry-element", "Title"))
}

pub fn title_link() -> NodeFilter {
    NodeFilter::new("a").with(AttrPredicate::Present("href"))
}

pub fn price() -> NodeFilter {
    NodeFilter::new("h3").with(AttrPredicate::Equals("data-sentry-element", "Price"))
}

/// Engine line, e.g. "2993 cm3 • 258 KM".
pub fn subtitle() -> NodeFilter {
    NodeFilter::new("p").with(AttrPredicate::Equals("data-sentry-element", "SubTitle"))
}

/// Mileage, fuel, gearbox and year, in that order.
pub fn technical_param() -> NodeFilter {
    NodeFilter::new("dd").with(AttrPredicate::Present("data-parameter"))
}

pub fn location() -> NodeFilter {
    NodeFilter::new("p").with(AttrPredicate::HasClass("ooa-oj1jk2"))
}

pub fn seller_type() -> NodeFilter {
    NodeFilter::new("li").with(AttrPredicate::HasClass("elb81bb5"))
}

/// Numbered pagination buttons. The arrow controls carry an `aria-label`.
pub fn pagination_item() -> NodeFilter {
    NodeFilter::new("li")
        .with(AttrPredicate::Contains("class", "ooa-"))
        .with(AttrPredicate::Absent("aria-label"))
}

pub fn next_page() -> NodeFilter {
    NodeFilter::new("li").with(AttrPredicate::ContainsIgnoreCase("aria-label", "next"))
}
