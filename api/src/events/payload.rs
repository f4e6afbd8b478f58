//! Request bodies for event writes.
//!
//! Every field is optional on the wire so that missing or out-of-range
//! values surface as field violations instead of a deserialization error.
//! Fields that are computed server side (`id`, `free`, `offline`,
//! `eventStatus`, `manager`) are ignored when present.

use chrono::NaiveDateTime;
use natural_core::{EventFields, EventPatch, Violations};
use serde::{Deserialize, Deserializer};

/// Violation code for a missing or empty string.
pub const NOT_EMPTY: &str = "NotEmpty";
/// Violation code for a missing value.
pub const NOT_NULL: &str = "NotNull";
/// Violation code for a number below its lower bound.
pub const MIN: &str = "Min";
/// Violation code for a number above its upper bound.
pub const MAX: &str = "Max";

/// Body of `POST /api/events` and `PUT /api/events/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Event name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Enrollment opens
    pub begin_enrollment_date_time: Option<NaiveDateTime>,
    /// Enrollment closes
    pub close_enrollment_date_time: Option<NaiveDateTime>,
    /// Event starts
    pub begin_event_date_time: Option<NaiveDateTime>,
    /// Event ends
    pub end_event_date_time: Option<NaiveDateTime>,
    /// Venue
    pub location: Option<String>,
    /// Base price
    pub base_price: Option<i64>,
    /// Maximum price
    pub max_price: Option<i64>,
    /// Enrollment limit
    pub limit_of_enrollment: Option<i64>,
}

impl EventPayload {
    /// Check the binding constraints and build the domain fields.
    ///
    /// # Errors
    ///
    /// Every violated constraint, in field order.
    pub fn bind(self) -> Result<EventFields, Violations> {
        let mut violations = Violations::new();

        let name = non_empty("name", self.name, &mut violations);
        let begin_enrollment = required(
            "beginEnrollmentDateTime",
            self.begin_enrollment_date_time,
            &mut violations,
        );
        let close_enrollment = required(
            "closeEnrollmentDateTime",
            self.close_enrollment_date_time,
            &mut violations,
        );
        let begin_event = required("beginEventDateTime", self.begin_event_date_time, &mut violations);
        let end_event = required("endEventDateTime", self.end_event_date_time, &mut violations);
        let base_price = amount("basePrice", self.base_price, &mut violations);
        let max_price = amount("maxPrice", self.max_price, &mut violations);
        let limit = amount("limitOfEnrollment", self.limit_of_enrollment, &mut violations);

        match (name, begin_enrollment, close_enrollment, begin_event, end_event) {
            (
                Some(name),
                Some(begin_enrollment_date_time),
                Some(close_enrollment_date_time),
                Some(begin_event_date_time),
                Some(end_event_date_time),
            ) if violations.is_empty() => Ok(EventFields {
                name,
                description: self.description,
                begin_enrollment_date_time,
                close_enrollment_date_time,
                begin_event_date_time,
                end_event_date_time,
                location: self.location,
                base_price,
                max_price,
                limit_of_enrollment: limit,
            }),
            _ => Err(violations),
        }
    }
}

/// Body of `PATCH /api/events/{id}`.
///
/// An absent key leaves the field untouched. An explicit `null` clears a
/// nullable field and is rejected for mandatory ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatchPayload {
    #[serde(default, deserialize_with = "present")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    begin_enrollment_date_time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "present")]
    close_enrollment_date_time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "present")]
    begin_event_date_time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "present")]
    end_event_date_time: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "present")]
    location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    base_price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    max_price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    limit_of_enrollment: Option<Option<i64>>,
}

impl EventPatchPayload {
    /// Check the binding constraints of the keys that are present.
    ///
    /// # Errors
    ///
    /// Every violated constraint, in field order.
    pub fn bind(self) -> Result<EventPatch, Violations> {
        let mut violations = Violations::new();

        let patch = EventPatch {
            name: self
                .name
                .map(|name| non_empty("name", name, &mut violations).unwrap_or_default()),
            description: self.description,
            begin_enrollment_date_time: self.begin_enrollment_date_time.and_then(|at| {
                required("beginEnrollmentDateTime", at, &mut violations)
            }),
            close_enrollment_date_time: self.close_enrollment_date_time.and_then(|at| {
                required("closeEnrollmentDateTime", at, &mut violations)
            }),
            begin_event_date_time: self
                .begin_event_date_time
                .and_then(|at| required("beginEventDateTime", at, &mut violations)),
            end_event_date_time: self
                .end_event_date_time
                .and_then(|at| required("endEventDateTime", at, &mut violations)),
            location: self.location,
            base_price: self
                .base_price
                .map(|price| amount("basePrice", price, &mut violations)),
            max_price: self
                .max_price
                .map(|price| amount("maxPrice", price, &mut violations)),
            limit_of_enrollment: self
                .limit_of_enrollment
                .map(|limit| amount("limitOfEnrollment", limit, &mut violations)),
        };

        violations.into_result().map(|()| patch)
    }
}

/// Marks a key as present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_empty(field: &str, value: Option<String>, violations: &mut Violations) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            violations.reject(field, NOT_EMPTY);
            None
        }
    }
}

fn required<T>(field: &str, value: Option<T>, violations: &mut Violations) -> Option<T> {
    if value.is_none() {
        violations.reject(field, NOT_NULL);
    }
    value
}

fn amount(field: &str, value: Option<i64>, violations: &mut Violations) -> Option<u32> {
    let value = value?;
    if value < 0 {
        violations.reject(field, MIN);
        return None;
    }
    u32::try_from(value).map_or_else(
        |_| {
            violations.reject(field, MAX);
            None
        },
        Some,
    )
}
