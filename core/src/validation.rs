//! Schedule validation.
//!
//! [`EventValidator`] checks the temporal consistency of an event's four
//! timestamps. Every rule is evaluated against the same event; violations
//! accumulate instead of short-circuiting.

use crate::event::Event;
use serde::Serialize;

/// Violation code for an out-of-order timestamp.
pub const WRONG_DATETIME: &str = "wrong.datetime";

/// Wire name of the enrollment-close field.
pub const CLOSE_ENROLLMENT_DATE_TIME: &str = "closeEnrollmentDateTime";
/// Wire name of the event-start field.
pub const BEGIN_EVENT_DATE_TIME: &str = "beginEventDateTime";
/// Wire name of the event-end field.
pub const END_EVENT_DATE_TIME: &str = "endEventDateTime";

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Wire name of the offending field.
    pub field: String,
    /// Machine-readable code.
    pub code: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
        }
    }
}

/// An ordered collection of violations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a violation.
    pub fn reject(&mut self, field: impl Into<String>, code: impl Into<String>) {
        self.0.push(Violation::new(field, code));
    }

    /// Whether nothing was rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Violations recorded against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |v| v.field == field)
    }

    /// Iterate in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collection itself when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Temporal consistency checks for an event's schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventValidator;

impl EventValidator {
    /// Creates a new `EventValidator`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate the schedule of `event`. Never fails; returns every violation.
    #[must_use]
    pub fn validate(&self, event: &Event) -> Violations {
        let mut violations = Violations::new();
        Self::validate_close_enrollment(event, &mut violations);
        Self::validate_begin_event(event, &mut violations);
        Self::validate_end_event(event, &mut violations);
        violations
    }

    fn validate_close_enrollment(event: &Event, violations: &mut Violations) {
        let f = &event.fields;
        if f.close_enrollment_date_time < f.begin_enrollment_date_time {
            violations.reject(CLOSE_ENROLLMENT_DATE_TIME, WRONG_DATETIME);
        }
    }

    fn validate_begin_event(event: &Event, violations: &mut Violations) {
        let f = &event.fields;
        if f.begin_event_date_time < f.begin_enrollment_date_time
            || f.begin_event_date_time < f.close_enrollment_date_time
        {
            violations.reject(BEGIN_EVENT_DATE_TIME, WRONG_DATETIME);
        }
    }

    fn validate_end_event(event: &Event, violations: &mut Violations) {
        let f = &event.fields;
        if f.end_event_date_time < f.begin_event_date_time
            || f.end_event_date_time < f.begin_enrollment_date_time
            || f.end_event_date_time < f.close_enrollment_date_time
        {
            violations.reject(END_EVENT_DATE_TIME, WRONG_DATETIME);
        }
    }
}
