//! `GET /api/`, the entry point of the hypermedia API.

use crate::events::resource::EVENTS_PATH;
use axum::{Json, extract::State};
use natural_web::{LinkBuilder, Links};
use serde::Serialize;

/// Body of the index: nothing but links.
#[derive(Debug, Serialize)]
pub struct IndexResource {
    /// Top-level relations.
    #[serde(rename = "_links")]
    pub links: Links,
}

/// List the top-level relations.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/
/// # {"_links":{"events":{"href":"http://localhost:8080/api/events"}}}
/// ```
pub async fn index(State(links): State<LinkBuilder>) -> Json<IndexResource> {
    let mut index = Links::new();
    index.insert("events", links.link(EVENTS_PATH));
    Json(IndexResource { links: index })
}
