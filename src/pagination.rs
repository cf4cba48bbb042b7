use crate::markup::MarkupNode;
use crate::selectors;
use tracing::debug;

/// Best-effort estimate of how many result pages a search has.
///
/// Prefers the largest numbered pagination button (clamped to `max_pages`),
/// falls back to 2 when only an enabled "next" control is present, and to 1
/// when the page carries no pagination at all. The result is an upper bound
/// to iterate over, not ground truth.
pub fn detect_page_count<N: MarkupNode>(page: &N, max_pages: u32) -> u32 {
    let max_pages = max_pages.max(1);

    let highest = page
        .find_all(&selectors::pagination_item())
        .iter()
        .filter_map(|item| numeric_label(&item.text_content()))
        .max();

    if let Some(highest) = highest {
        debug!(highest, max_pages, "page count from pagination buttons");
        return highest.clamp(1, max_pages);
    }

    if has_next_page(page) {
        debug!("no numbered pagination, next control enabled");
        return max_pages.min(2);
    }

    debug!("no pagination found, assuming a single page");
    1
}

/// True when the page has a "next page" control that is not disabled.
pub fn has_next_page<N: MarkupNode>(page: &N) -> bool {
    page.find_first(&selectors::next_page())
        .is_some_and(|next| !is_disabled(&next))
}

fn is_disabled<N: MarkupNode>(control: &N) -> bool {
    control.has_class("disabled") || control.attribute("aria-disabled") == Some("true")
}

/// Parses a button label made only of digits. Labels too large for `u32`
/// saturate; the caller clamps them anyway.
fn numeric_label(text: &str) -> Option<u32> {
    let label: String = text.split_whitespace().collect();
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(label.parse().unwrap_or(u32::MAX))
}
