//! # Natural Testing
//!
//! Test infrastructure for the Natural events API.
//!
//! This crate provides:
//! - In-memory implementations of the repository traits
//! - A fixed clock for deterministic token expiry
//! - Fixtures for events and identities
//! - proptest strategies for schedules
//!
//! The in-memory repositories are also what the server runs on when no
//! database is configured.
//!
//! ## Example
//!
//! ```ignore
//! use natural_testing::{InMemoryEventRepository, fixtures};
//! use natural_core::{EventLifecycle, EventRepository};
//!
//! #[tokio::test]
//! async fn creates_an_event() {
//!     let repository = InMemoryEventRepository::new();
//!     let event = EventLifecycle::new()
//!         .create(Some(&fixtures::user(1)), fixtures::event_fields())
//!         .unwrap();
//!
//!     let saved = repository.save(event).await.unwrap();
//!     assert!(saved.id.is_some());
//! }
//! ```

pub mod repositories;

pub use mocks::{FixedClock, test_clock};
pub use repositories::{InMemoryEventRepository, InMemoryUserRepository};

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Duration, Utc};
    use natural_core::environment::Clock;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Clock that only moves when told to.
    ///
    /// Clones share the same instant, so a test can hold one handle and
    /// advance time under a token store holding another.
    ///
    /// # Example
    ///
    /// ```
    /// use natural_testing::mocks::FixedClock;
    /// use natural_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let before = clock.now();
    /// clock.advance(Duration::seconds(30));
    /// assert_eq!(clock.now() - before, Duration::seconds(30));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2018-10-19 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2018-10-19T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Ready-made domain values.
pub mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};
    use natural_core::{EventFields, Identity, Role, UserId};

    /// 2018-10-`day` at 08:00.
    ///
    /// # Panics
    ///
    /// Panics if `day` is not a valid day of October.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn october(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 10, day)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("valid day of October")
    }

    /// A well-ordered, paid, offline event.
    #[must_use]
    pub fn event_fields() -> EventFields {
        EventFields {
            name: "Spring".to_string(),
            description: Some("REST API Development with Spring".to_string()),
            begin_enrollment_date_time: october(19),
            close_enrollment_date_time: october(20),
            begin_event_date_time: october(21),
            end_event_date_time: october(22),
            location: Some("D2 startup factory".to_string()),
            base_price: Some(100),
            max_price: Some(200),
            limit_of_enrollment: Some(100),
        }
    }

    /// [`event_fields`] with a different name.
    #[must_use]
    pub fn named_event_fields(name: impl Into<String>) -> EventFields {
        EventFields {
            name: name.into(),
            ..event_fields()
        }
    }

    /// A regular user.
    #[must_use]
    pub fn user(id: i64) -> Identity {
        Identity::new(UserId::new(id), format!("user{id}@email.com"), [Role::User])
    }

    /// An administrator.
    #[must_use]
    pub fn admin(id: i64) -> Identity {
        Identity::new(UserId::new(id), format!("admin{id}@email.com"), [Role::Admin, Role::User])
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use crate::fixtures::october;
    use chrono::{Duration, NaiveDateTime};
    use proptest::prelude::*;

    /// Four timestamps in non-decreasing order:
    /// enrollment open, enrollment close, start, end.
    pub fn ordered_schedule()
    -> impl Strategy<Value = (NaiveDateTime, NaiveDateTime, NaiveDateTime, NaiveDateTime)> {
        (0_i64..10_000, 0_i64..10_000, 0_i64..10_000, 0_i64..10_000).prop_map(|(a, b, c, d)| {
            let begin_enrollment = october(1) + Duration::minutes(a);
            let close_enrollment = begin_enrollment + Duration::minutes(b);
            let begin_event = close_enrollment + Duration::minutes(c);
            let end_event = begin_event + Duration::minutes(d);
            (begin_enrollment, close_enrollment, begin_event, end_event)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use natural_core::environment::Clock;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn clones_share_the_same_instant() {
        let clock = test_clock();
        let handle = clock.clone();
        handle.advance(Duration::minutes(10));
        assert_eq!(clock.now(), handle.now());
    }

    proptest::proptest! {
        #[test]
        fn lifecycle_accepts_every_ordered_schedule(
            (begin_enrollment, close_enrollment, begin_event, end_event) in properties::ordered_schedule()
        ) {
            let fields = natural_core::EventFields {
                begin_enrollment_date_time: begin_enrollment,
                close_enrollment_date_time: close_enrollment,
                begin_event_date_time: begin_event,
                end_event_date_time: end_event,
                ..fixtures::event_fields()
            };
            let created = natural_core::EventLifecycle::new().create(Some(&fixtures::user(1)), fields);
            proptest::prop_assert!(created.is_ok());
        }
    }
}
