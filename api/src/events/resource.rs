//! HAL representations of events.
//!
//! Which links accompany an event depends on the operation that produced
//! the response and, for reads, on what the actor may do next.

use natural_core::{Capabilities, Event, EventId, Page, PageRequest};
use natural_web::{EntityModel, LinkBuilder, PagedModel};

/// Collection path.
pub const EVENTS_PATH: &str = "/api/events";
/// Relation under which pages embed their events.
pub const EVENT_LIST_REL: &str = "eventList";

/// An event with its links.
pub type EventResource = EntityModel<Event>;

/// Path of a single event.
#[must_use]
pub fn event_path(id: EventId) -> String {
    format!("{EVENTS_PATH}/{id}")
}

fn profile(links: &LinkBuilder, operation: &str) -> natural_web::Link {
    links.link(&format!("/docs/index.html#resources-events-{operation}"))
}

fn self_link(links: &LinkBuilder, event: &Event) -> natural_web::Link {
    event
        .id
        .map_or_else(|| links.link(EVENTS_PATH), |id| links.link(&event_path(id)))
}

/// Resource returned by `GET /api/events/{id}`.
#[must_use]
pub fn read(links: &LinkBuilder, event: Event, capabilities: Capabilities) -> EventResource {
    let this = self_link(links, &event);
    let mut resource = EventResource::new(event)
        .with_link("self", this.clone())
        .with_link("get-events", links.link(EVENTS_PATH))
        .with_link("profile", profile(links, "get"));
    if capabilities.can_create {
        resource.add_link("create-new-event", links.link(EVENTS_PATH));
    }
    if capabilities.can_manage {
        resource.add_link("update-event", this.clone());
        resource.add_link("delete-event", this);
    }
    resource
}

/// Resource returned by `POST /api/events`.
#[must_use]
pub fn created(links: &LinkBuilder, event: Event) -> EventResource {
    let this = self_link(links, &event);
    EventResource::new(event)
        .with_link("self", this.clone())
        .with_link("get-events", links.link(EVENTS_PATH))
        .with_link("update-event", this.clone())
        .with_link("delete-event", this)
        .with_link("profile", profile(links, "create"))
}

/// Resource returned by `PUT` and `PATCH /api/events/{id}`.
#[must_use]
pub fn updated(links: &LinkBuilder, event: Event) -> EventResource {
    let this = self_link(links, &event);
    EventResource::new(event)
        .with_link("self", this.clone())
        .with_link("get-events", links.link(EVENTS_PATH))
        .with_link("create-new-event", links.link(EVENTS_PATH))
        .with_link("delete-event", this)
        .with_link("profile", profile(links, "update"))
}

/// Resource returned by `DELETE /api/events/{id}`. The event is gone, so
/// there is no `self`.
#[must_use]
pub fn deleted(links: &LinkBuilder, event: Event) -> EventResource {
    EventResource::new(event)
        .with_link("get-events", links.link(EVENTS_PATH))
        .with_link("create-new-event", links.link(EVENTS_PATH))
        .with_link("profile", profile(links, "delete"))
}

/// Page returned by `GET /api/events`.
#[must_use]
pub fn page(
    links: &LinkBuilder,
    page: Page<Event>,
    request: &PageRequest,
    can_create: bool,
) -> PagedModel<EventResource> {
    let page_link = |number: usize| {
        links.link(&format!(
            "{EVENTS_PATH}?page={number}&size={}&sort={}",
            request.size, request.sort
        ))
    };

    let number = page.number;
    let last = page.total_pages().saturating_sub(1);
    let has_previous = page.has_previous();
    let has_next = page.has_next();

    let mut model = PagedModel::new(EVENT_LIST_REL, page, |event| {
        let this = self_link(links, &event);
        EventResource::new(event).with_link("self", this)
    });

    model.add_link("self", page_link(number));
    model.add_link("first", page_link(0));
    if has_previous {
        model.add_link("prev", page_link(number - 1));
    }
    if has_next {
        model.add_link("next", page_link(number + 1));
    }
    model.add_link("last", page_link(last));
    model.add_link("profile", profile(links, "list"));
    if can_create {
        model.add_link("create-new-event", links.link(EVENTS_PATH));
    }
    model
}
