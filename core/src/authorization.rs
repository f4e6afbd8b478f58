//! Authorization gate.
//!
//! Decides whether an actor may perform an [`Operation`] on an event.
//!
//! | Operation | Anonymous | Other user | Owner | Admin |
//! |-----------|-----------|------------|-------|-------|
//! | Read      | Allow     | Allow      | Allow | Allow |
//! | Create    | Deny      | Allow      | n/a   | Allow |
//! | Update    | Deny      | Deny       | Allow | Allow |
//! | Delete    | Deny      | Deny       | Allow | Allow |
//! | Publish   | Deny      | Deny       | Deny  | Deny  |
//!
//! Anything not matched by a rule is denied. The actor is always passed in
//! explicitly; there is no ambient security context.

use crate::event::Event;
use crate::types::Identity;

/// An operation on an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// View an event or the event list.
    Read,
    /// Create a new event.
    Create,
    /// Modify an existing event.
    Update,
    /// Remove an existing event.
    Delete,
    /// Publish an event. Not implemented, never allowed.
    Publish,
}

/// Outcome of an authorization check.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The operation is permitted.
    Allow,
    /// The operation is not permitted.
    Deny,
}

impl Access {
    /// Whether access was granted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// What the boundary may advertise to an actor looking at an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The actor may create new events.
    pub can_create: bool,
    /// The actor may update and delete this event.
    pub can_manage: bool,
}

/// Stateless policy evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Creates a new `AuthorizationGate`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decide whether `actor` may perform `operation` on `event`.
    ///
    /// `event` is `None` for operations on the collection (create, list).
    /// Update and delete without an event are denied.
    pub fn authorize(
        &self,
        actor: Option<&Identity>,
        operation: Operation,
        event: Option<&Event>,
    ) -> Access {
        let allowed = match (operation, actor) {
            (Operation::Read, _) => true,
            (Operation::Create, Some(_)) => true,
            (Operation::Update | Operation::Delete, Some(actor)) => {
                event.is_some_and(|event| Self::manages(actor, event))
            }
            (Operation::Create | Operation::Update | Operation::Delete, None)
            | (Operation::Publish, _) => false,
        };
        Access::from_bool(allowed)
    }

    /// Whether the update/delete capability should be surfaced on a read.
    #[must_use]
    pub fn can_manage(&self, actor: Option<&Identity>, event: &Event) -> bool {
        self.authorize(actor, Operation::Update, Some(event)).is_allowed()
    }

    /// Capabilities surfaced alongside a read of `event`.
    #[must_use]
    pub fn capabilities(&self, actor: Option<&Identity>, event: Option<&Event>) -> Capabilities {
        Capabilities {
            can_create: self.authorize(actor, Operation::Create, None).is_allowed(),
            can_manage: event.is_some_and(|event| self.can_manage(actor, event)),
        }
    }

    /// Owner or admin.
    fn manages(actor: &Identity, event: &Event) -> bool {
        actor.is_admin() || event.is_managed_by(actor.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::event::EventFields;
    use crate::types::{Role, UserId};
    use chrono::NaiveDate;

    fn owned_by(manager: i64) -> Event {
        let at = |day| {
            NaiveDate::from_ymd_opt(2018, 10, day)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        };
        let mut event = Event::draft(EventFields {
            name: "Spring".to_string(),
            description: None,
            begin_enrollment_date_time: at(19),
            close_enrollment_date_time: at(20),
            begin_event_date_time: at(21),
            end_event_date_time: at(22),
            location: None,
            base_price: None,
            max_price: None,
            limit_of_enrollment: None,
        });
        event.manager = Some(UserId::new(manager));
        event
    }

    fn user(id: i64) -> Identity {
        Identity::new(UserId::new(id), format!("user{id}@email.com"), [Role::User])
    }

    fn admin(id: i64) -> Identity {
        Identity::new(UserId::new(id), "admin@email.com", [Role::Admin, Role::User])
    }

    const GATE: AuthorizationGate = AuthorizationGate::new();

    #[test]
    fn owner_may_update_but_other_user_may_not() {
        let event = owned_by(1);
        assert_eq!(GATE.authorize(Some(&user(1)), Operation::Update, Some(&event)), Access::Allow);
        assert_eq!(GATE.authorize(Some(&user(2)), Operation::Update, Some(&event)), Access::Deny);
    }

    #[test]
    fn admin_may_delete_events_it_does_not_own() {
        let event = owned_by(1);
        assert_eq!(GATE.authorize(Some(&admin(9)), Operation::Delete, Some(&event)), Access::Allow);
    }

    #[test]
    fn anonymous_may_not_create() {
        assert_eq!(GATE.authorize(None, Operation::Create, None), Access::Deny);
        assert_eq!(GATE.authorize(Some(&user(3)), Operation::Create, None), Access::Allow);
    }

    #[test]
    fn anyone_may_read() {
        let event = owned_by(1);
        assert!(GATE.authorize(None, Operation::Read, Some(&event)).is_allowed());
        assert!(GATE.authorize(Some(&user(2)), Operation::Read, Some(&event)).is_allowed());
        assert!(GATE.authorize(None, Operation::Read, None).is_allowed());
    }

    #[test]
    fn anonymous_may_not_mutate() {
        let event = owned_by(1);
        assert!(!GATE.authorize(None, Operation::Update, Some(&event)).is_allowed());
        assert!(!GATE.authorize(None, Operation::Delete, Some(&event)).is_allowed());
    }

    #[test]
    fn publish_is_denied_to_everyone() {
        let event = owned_by(1);
        for actor in [None, Some(user(1)), Some(user(2)), Some(admin(9))] {
            assert_eq!(
                GATE.authorize(actor.as_ref(), Operation::Publish, Some(&event)),
                Access::Deny
            );
        }
    }

    #[test]
    fn mutation_without_target_event_is_denied() {
        assert_eq!(GATE.authorize(Some(&admin(9)), Operation::Update, None), Access::Deny);
        assert_eq!(GATE.authorize(Some(&user(1)), Operation::Delete, None), Access::Deny);
    }

    #[test]
    fn unowned_event_is_manageable_only_by_admin() {
        let mut event = owned_by(1);
        event.manager = None;
        assert!(!GATE.can_manage(Some(&user(1)), &event));
        assert!(GATE.can_manage(Some(&admin(9)), &event));
    }

    #[test]
    fn capabilities_follow_the_policy() {
        let event = owned_by(1);

        let anonymous = GATE.capabilities(None, Some(&event));
        assert_eq!(anonymous, Capabilities { can_create: false, can_manage: false });

        let stranger = GATE.capabilities(Some(&user(2)), Some(&event));
        assert_eq!(stranger, Capabilities { can_create: true, can_manage: false });

        let owner = GATE.capabilities(Some(&user(1)), Some(&event));
        assert_eq!(owner, Capabilities { can_create: true, can_manage: true });

        let admin = GATE.capabilities(Some(&admin(9)), Some(&event));
        assert!(admin.can_manage);
    }
}
