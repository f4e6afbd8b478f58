//! Event resources: request binding, HAL assembly and the HTTP handlers.

pub mod handlers;
pub mod payload;
pub mod resource;

pub use handlers::{
    create_event, delete_event, get_event, list_events, patch_event, publish_event, update_event,
};
pub use payload::{EventPatchPayload, EventPayload};
pub use resource::EventResource;
