//! The event entity.
//!
//! An [`Event`] is a session with an enrollment window, optional pricing and
//! an enrollment limit. The user-supplied part lives in [`EventFields`]; the
//! derived flags (`free`, `offline`) are recomputed by
//! [`normalize`](crate::derived::normalize) and are never taken from input.

use crate::types::{EventId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Assigned on creation. The only reachable status.
    #[default]
    Draft,
    /// Target of the publish transition, which is not implemented.
    Published,
}

impl EventStatus {
    /// Stable string form, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(Self::Draft),
            "PUBLISHED" => Some(Self::Published),
            _ => None,
        }
    }
}

/// User-supplied event data.
///
/// The four schedule timestamps are mandatory; requests missing one are
/// rejected while binding, before any of these values is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    /// Event name (non-empty).
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Enrollment opens.
    pub begin_enrollment_date_time: NaiveDateTime,
    /// Enrollment closes.
    pub close_enrollment_date_time: NaiveDateTime,
    /// Event starts.
    pub begin_event_date_time: NaiveDateTime,
    /// Event ends.
    pub end_event_date_time: NaiveDateTime,
    /// Venue; blank or absent means online.
    pub location: Option<String>,
    /// Base price.
    pub base_price: Option<u32>,
    /// Maximum price; absent or zero means free.
    pub max_price: Option<u32>,
    /// Maximum number of enrollments.
    pub limit_of_enrollment: Option<u32>,
}

/// An event, persisted or about to be.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Assigned by the repository on creation, immutable afterwards.
    pub id: Option<EventId>,
    /// User-supplied data.
    #[serde(flatten)]
    pub fields: EventFields,
    /// Derived: `max_price` is absent or zero.
    pub free: bool,
    /// Derived: `location` is present and not blank.
    pub offline: bool,
    /// Lifecycle status.
    pub event_status: EventStatus,
    /// Managing user, bound on creation.
    #[serde(with = "manager_ref")]
    pub manager: Option<UserId>,
}

impl Event {
    /// Creates an unsaved `DRAFT` event without a manager.
    ///
    /// Derived flags start out `false`; run the event through
    /// [`normalize`](crate::derived::normalize) before validating or saving it.
    #[must_use]
    pub fn draft(fields: EventFields) -> Self {
        Self {
            id: None,
            fields,
            free: false,
            offline: false,
            event_status: EventStatus::default(),
            manager: None,
        }
    }

    /// Whether `user_id` is the managing user of this event.
    #[must_use]
    pub fn is_managed_by(&self, user_id: UserId) -> bool {
        self.manager == Some(user_id)
    }

    /// Replace all user-supplied data, keeping id, manager and status.
    pub fn replace_fields(&mut self, fields: EventFields) {
        self.fields = fields;
    }
}

/// A partial update.
///
/// `None` leaves a field untouched. For nullable fields, `Some(None)` clears
/// the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New enrollment opening.
    pub begin_enrollment_date_time: Option<NaiveDateTime>,
    /// New enrollment closing.
    pub close_enrollment_date_time: Option<NaiveDateTime>,
    /// New start.
    pub begin_event_date_time: Option<NaiveDateTime>,
    /// New end.
    pub end_event_date_time: Option<NaiveDateTime>,
    /// New location.
    pub location: Option<Option<String>>,
    /// New base price.
    pub base_price: Option<Option<u32>>,
    /// New maximum price.
    pub max_price: Option<Option<u32>>,
    /// New enrollment limit.
    pub limit_of_enrollment: Option<Option<u32>>,
}

impl EventPatch {
    /// Merge present values into `event`.
    pub fn apply_to(self, event: &mut Event) {
        let fields = &mut event.fields;
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(at) = self.begin_enrollment_date_time {
            fields.begin_enrollment_date_time = at;
        }
        if let Some(at) = self.close_enrollment_date_time {
            fields.close_enrollment_date_time = at;
        }
        if let Some(at) = self.begin_event_date_time {
            fields.begin_event_date_time = at;
        }
        if let Some(at) = self.end_event_date_time {
            fields.end_event_date_time = at;
        }
        if let Some(location) = self.location {
            fields.location = location;
        }
        if let Some(price) = self.base_price {
            fields.base_price = price;
        }
        if let Some(price) = self.max_price {
            fields.max_price = price;
        }
        if let Some(limit) = self.limit_of_enrollment {
            fields.limit_of_enrollment = limit;
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Serializes the manager as `{"id": n}` so no other account data leaks.
mod manager_ref {
    use crate::types::UserId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct ManagerRef {
        id: UserId,
    }

    pub fn serialize<S: Serializer>(manager: &Option<UserId>, serializer: S) -> Result<S::Ok, S::Error> {
        manager.map(|id| ManagerRef { id }).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<UserId>, D::Error> {
        Ok(Option::<ManagerRef>::deserialize(deserializer)?.map(|m| m.id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 10, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn fields() -> EventFields {
        EventFields {
            name: "Spring".to_string(),
            description: Some("REST API development with Spring".to_string()),
            begin_enrollment_date_time: at(19),
            close_enrollment_date_time: at(20),
            begin_event_date_time: at(21),
            end_event_date_time: at(22),
            location: Some("D2 startup factory".to_string()),
            base_price: Some(100),
            max_price: Some(200),
            limit_of_enrollment: Some(100),
        }
    }

    #[test]
    fn draft_defaults_to_draft_status_without_manager() {
        let event = Event::draft(fields());
        assert_eq!(event.event_status, EventStatus::Draft);
        assert!(event.id.is_none());
        assert!(event.manager.is_none());
    }

    #[test]
    fn ownership_is_by_manager_id() {
        let mut event = Event::draft(fields());
        event.manager = Some(UserId::new(5));
        assert!(event.is_managed_by(UserId::new(5)));
        assert!(!event.is_managed_by(UserId::new(6)));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut event = Event::draft(fields());
        EventPatch {
            name: Some("Renamed".to_string()),
            location: Some(None),
            ..EventPatch::default()
        }
        .apply_to(&mut event);

        assert_eq!(event.fields.name, "Renamed");
        assert_eq!(event.fields.location, None);
        assert_eq!(event.fields.max_price, Some(200));
        assert_eq!(event.fields.begin_event_date_time, at(21));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(EventPatch::default().is_empty());
        let patch = EventPatch {
            max_price: Some(Some(0)),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn serializes_camel_case_with_manager_reference() {
        let mut event = Event::draft(fields());
        event.id = Some(EventId::new(10));
        event.manager = Some(UserId::new(3));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 10);
        assert_eq!(json["beginEnrollmentDateTime"], "2018-10-19T08:00:00");
        assert_eq!(json["eventStatus"], "DRAFT");
        assert_eq!(json["manager"], serde_json::json!({ "id": 3 }));

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
