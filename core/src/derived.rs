//! Derived state computation.
//!
//! `free` and `offline` are never accepted from input. They are recomputed
//! from the post-merge state on every create and every update, before
//! validation and before persistence.

use crate::event::{Event, EventFields};
use crate::types::UserId;

/// Whether an event with these fields is free of charge.
#[must_use]
pub fn is_free(fields: &EventFields) -> bool {
    matches!(fields.max_price, None | Some(0))
}

/// Whether an event with these fields takes place at a physical location.
#[must_use]
pub fn is_offline(fields: &EventFields) -> bool {
    fields
        .location
        .as_deref()
        .is_some_and(|location| !location.trim().is_empty())
}

/// Recompute the derived flags. Pure and idempotent.
#[must_use]
pub fn normalize(mut event: Event) -> Event {
    event.free = is_free(&event.fields);
    event.offline = is_offline(&event.fields);
    event
}

/// Normalize a freshly created event and bind it to its creator, overwriting
/// any manager already present.
#[must_use]
pub fn normalize_for_creation(event: Event, creator: UserId) -> Event {
    let mut event = normalize(event);
    event.manager = Some(creator);
    event
}
