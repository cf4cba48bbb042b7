//! Minimal markup traversal used by the listing parser and the pagination
//! detector.
//!
//! Callers describe what they look for with a [`NodeFilter`] (a tag name plus
//! attribute predicates) and query it through [`MarkupNode`], so the parsing
//! code does not depend on the HTML library's own selector API.

use scraper::ElementRef;

/// A single condition on an element's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrPredicate {
    /// Attribute is present, whatever its value.
    Present(&'static str),
    /// Attribute is not present.
    Absent(&'static str),
    /// Attribute value equals the given string.
    Equals(&'static str, &'static str),
    /// Attribute value contains the given substring.
    Contains(&'static str, &'static str),
    /// Attribute value contains the given substring, ignoring ASCII case.
    ContainsIgnoreCase(&'static str, &'static str),
    /// Whitespace-separated `class` list contains the given token.
    HasClass(&'static str),
}

impl AttrPredicate {
    fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        match *self {
            AttrPredicate::Present(name) => node.attribute(name).is_some(),
            AttrPredicate::Absent(name) => node.attribute(name).is_none(),
            AttrPredicate::Equals(name, expected) => node.attribute(name) == Some(expected),
            AttrPredicate::Contains(name, needle) => {
                node.attribute(name).is_some_and(|value| value.contains(needle))
            }
            AttrPredicate::ContainsIgnoreCase(name, needle) => node
                .attribute(name)
                .is_some_and(|value| value.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())),
            AttrPredicate::HasClass(class) => node.has_class(class),
        }
    }
}

/// Tag name plus a conjunction of attribute predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFilter {
    tag: &'static str,
    predicates: Vec<AttrPredicate>,
}

impl NodeFilter {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            predicates: Vec::new(),
        }
    }

    pub fn with(mut self, predicate: AttrPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        node.tag_name().eq_ignore_ascii_case(self.tag)
            && self.predicates.iter().all(|predicate| predicate.matches(node))
    }
}

/// The traversal capability the parsing code needs from a markup tree.
///
/// `find_first` and `find_all` search descendants only, in document order;
/// the node itself is never a match.
pub trait MarkupNode: Sized {
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// All descendant text, concatenated without separators.
    fn text_content(&self) -> String;

    fn find_first(&self, filter: &NodeFilter) -> Option<Self>;

    fn find_all(&self, filter: &NodeFilter) -> Vec<Self>;

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|token| token == class))
    }
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn find_first(&self, filter: &NodeFilter) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| filter.matches(element))
    }

    fn find_all(&self, filter: &NodeFilter) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|element| filter.matches(element))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const FIXTURE: &str = r#"
        <div id="root">
            <ul>
                <li class="ooa-1 item" aria-label="Previous page">&lt;</li>
                <li class="ooa-2 item">1</li>
                <li class="ooa-3 item active">2</li>
                <li class="plain">x</li>
                <li class="ooa-4" aria-label="Go to NEXT page">&gt;</li>
            </ul>
        </div>
    "#;

    #[test]
    fn find_all_applies_every_predicate() {
        let document = Html::parse_fragment(FIXTURE);
        let root = document.root_element();
        let filter = NodeFilter::new("li")
            .with(AttrPredicate::Contains("class", "ooa-"))
            .with(AttrPredicate::Absent("aria-label"));

        let texts: Vec<String> = root
            .find_all(&filter)
            .iter()
            .map(|node| node.text_content())
            .collect();

        assert_eq!(texts, vec!["1", "2"]);
    }

    #[test]
    fn find_first_matches_case_insensitive_attribute() {
        let document = Html::parse_fragment(FIXTURE);
        let root = document.root_element();
        let filter = NodeFilter::new("li").with(AttrPredicate::ContainsIgnoreCase("aria-label", "next"));

        let next = root.find_first(&filter).unwrap();
        assert_eq!(next.attribute("class"), Some("ooa-4"));
    }

    #[test]
    fn has_class_matches_whole_tokens_only() {
        let document = Html::parse_fragment(FIXTURE);
        let root = document.root_element();

        let active = root
            .find_first(&NodeFilter::new("li").with(AttrPredicate::HasClass("active")))
            .unwrap();
        assert_eq!(active.text_content(), "2");
        assert!(root
            .find_first(&NodeFilter::new("li").with(AttrPredicate::HasClass("ooa")))
            .is_none());
    }

    #[test]
    fn search_does_not_match_the_node_itself() {
        let document = Html::parse_fragment(r#"<section><p data-x="1">a</p></section>"#);
        let paragraph = document
            .root_element()
            .find_first(&NodeFilter::new("p"))
            .unwrap();

        assert!(paragraph.find_first(&NodeFilter::new("p")).is_none());
    }
}
