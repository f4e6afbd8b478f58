//! HAL-style hypermedia.
//!
//! Resources are rendered as their own JSON fields plus a `_links` object
//! mapping relation names to `{ "href": ... }`. Collections embed their
//! items under `_embedded.<rel>` and carry a `page` block:
//!
//! ```json
//! {
//!   "_embedded": { "eventList": [ { "id": 1, "_links": { "self": { "href": "…" } } } ] },
//!   "_links": { "self": { "href": "…" }, "next": { "href": "…" } },
//!   "page": { "size": 20, "totalElements": 1, "totalPages": 1, "number": 0 }
//! }
//! ```

use natural_core::Page;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single hyperlink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute target.
    pub href: String,
}

impl Link {
    /// Creates a link to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Relation name to link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    /// No links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the link for `rel`.
    pub fn insert(&mut self, rel: impl Into<String>, link: Link) {
        self.0.insert(rel.into(), link);
    }

    /// Link for `rel`, if present.
    #[must_use]
    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.get(rel)
    }

    /// Whether a link for `rel` is present.
    #[must_use]
    pub fn contains(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    /// Relation names, sorted.
    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A resource with links.
#[derive(Clone, Debug, Serialize)]
pub struct EntityModel<T> {
    /// The resource itself, flattened into the body.
    #[serde(flatten)]
    pub content: T,
    /// Navigation.
    #[serde(rename = "_links")]
    pub links: Links,
}

impl<T> EntityModel<T> {
    /// Wrap `content` without links.
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Links::new(),
        }
    }

    /// Add or replace a link.
    pub fn add_link(&mut self, rel: impl Into<String>, link: Link) {
        self.links.insert(rel, link);
    }

    /// Builder form of [`add_link`](Self::add_link).
    #[must_use]
    pub fn with_link(mut self, rel: impl Into<String>, link: Link) -> Self {
        self.add_link(rel, link);
        self
    }
}

/// Paging block of a [`PagedModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// Requested page size.
    pub size: usize,
    /// Total elements across all pages.
    pub total_elements: usize,
    /// Total pages.
    pub total_pages: usize,
    /// Zero-based page number.
    pub number: usize,
}

impl<T> From<&Page<T>> for PageMetadata {
    fn from(page: &Page<T>) -> Self {
        Self {
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
            number: page.number,
        }
    }
}

/// A page of resources.
#[derive(Clone, Debug, Serialize)]
pub struct PagedModel<T> {
    /// Items keyed by collection relation. Omitted for empty pages.
    #[serde(rename = "_embedded", skip_serializing_if = "BTreeMap::is_empty")]
    pub embedded: BTreeMap<String, Vec<T>>,
    /// Navigation.
    #[serde(rename = "_links")]
    pub links: Links,
    /// Paging block.
    pub page: PageMetadata,
}

impl<T> PagedModel<T> {
    /// Build from a page, embedding its items under `rel`.
    pub fn new<U>(rel: impl Into<String>, page: Page<U>, item: impl FnMut(U) -> T) -> Self {
        let metadata = PageMetadata::from(&page);
        let content: Vec<T> = page.content.into_iter().map(item).collect();
        let mut embedded = BTreeMap::new();
        if !content.is_empty() {
            embedded.insert(rel.into(), content);
        }
        Self {
            embedded,
            links: Links::new(),
            page: metadata,
        }
    }

    /// Add or replace a link.
    pub fn add_link(&mut self, rel: impl Into<String>, link: Link) {
        self.links.insert(rel, link);
    }
}

/// Builds absolute links from the public base URL.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    base: Arc<str>,
}

impl LinkBuilder {
    /// Creates a builder rooted at `base_url` (a trailing `/` is ignored).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Shared base URL, as handed to [`link_error_index`](crate::link_error_index).
    #[must_use]
    pub fn shared_base(&self) -> Arc<str> {
        Arc::clone(&self.base)
    }

    /// Absolute URL for `path` (which must start with `/`).
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Link to `path`.
    #[must_use]
    pub fn link(&self, path: &str) -> Link {
        Link::new(self.href(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use natural_core::PageRequest;
    use serde_json::json;

    #[derive(Serialize)]
    struct Item {
        id: u32,
    }

    #[test]
    fn entity_model_flattens_content() {
        let links = LinkBuilder::new("http://localhost:8080/");
        let model = EntityModel::new(Item { id: 3 }).with_link("self", links.link("/api/events/3"));

        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({ "id": 3, "_links": { "self": { "href": "http://localhost:8080/api/events/3" } } })
        );
    }

    #[test]
    fn paged_model_embeds_items_and_metadata() {
        let request = PageRequest::new(0, 2, natural_core::Sort::default());
        let page = Page::new(vec![1_u32, 2], &request, 5);
        let mut model = PagedModel::new("itemList", page, |id| Item { id });
        model.add_link("self", Link::new("/items"));

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["_embedded"]["itemList"], json!([{ "id": 1 }, { "id": 2 }]));
        assert_eq!(
            json["page"],
            json!({ "size": 2, "totalElements": 5, "totalPages": 3, "number": 0 })
        );
        assert_eq!(json["_links"]["self"]["href"], "/items");
    }

    #[test]
    fn empty_page_omits_embedded() {
        let page: Page<u32> = Page::new(vec![], &PageRequest::default(), 0);
        let model = PagedModel::new("itemList", page, |id| Item { id });
        let json = serde_json::to_value(&model).unwrap();
        assert!(json.get("_embedded").is_none());
        assert_eq!(json["page"]["totalPages"], 0);
    }
}
