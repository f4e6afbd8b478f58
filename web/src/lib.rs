//! Axum integration for the Natural events API.
//!
//! The boundary pieces that are not specific to events:
//!
//! - [`AppError`]: HTTP error responses with field violations and an index link
//! - [`hal`]: HAL-style hypermedia (`_links`, `_embedded`, page metadata)
//! - [`correlation_id_layer`]: `X-Correlation-ID` tracking
//!
//! # Request Flow
//!
//! 1. **Correlation id** is read from the request (or generated) and attached to a span
//! 2. **Handler** binds input and calls the core
//! 3. **Result** is wrapped in an [`EntityModel`](hal::EntityModel) with links,
//!    or mapped to an [`AppError`]
//! 4. **Error links** are made absolute by [`link_error_index`]
//!
//! # Example
//!
//! ```ignore
//! use natural_web::{AppError, hal::{EntityModel, LinkBuilder}};
//!
//! async fn handler(State(links): State<LinkBuilder>) -> Result<Json<EntityModel<Index>>, AppError> {
//!     let mut model = EntityModel::new(Index {});
//!     model.add_link("events", links.link("/api/events"));
//!     Ok(Json(model))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod hal;
pub mod middleware;

// Re-export key types for convenience
pub use error::{AppError, link_error_index};
pub use extractors::CorrelationId;
pub use hal::{EntityModel, Link, LinkBuilder, Links, PagedModel};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
