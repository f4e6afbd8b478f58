//! Event lifecycle transitions.
//!
//! Ties the gate, the derived-state computer and the validator together for
//! each write:
//!
//! ```text
//! create:        authorize(Create) → draft → normalize + bind manager → validate
//! update/patch:  authorize(Update, persisted) → merge → normalize → validate
//! delete:        authorize(Delete, persisted)
//! publish:       NotImplemented
//! ```
//!
//! Authorization runs against the persisted event before any candidate data
//! is looked at, so a non-owner learns nothing about why an edit would fail.
//! Nothing here performs I/O; persisting the returned event is the caller's job.

use crate::authorization::{AuthorizationGate, Capabilities, Operation};
use crate::derived::{normalize, normalize_for_creation};
use crate::error::EventError;
use crate::event::{Event, EventFields, EventPatch};
use crate::types::Identity;
use crate::validation::EventValidator;

/// Stateless coordinator for event transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventLifecycle {
    gate: AuthorizationGate,
    validator: EventValidator,
}

impl EventLifecycle {
    /// Creates a new `EventLifecycle`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gate: AuthorizationGate::new(),
            validator: EventValidator::new(),
        }
    }

    /// The gate used for every transition.
    #[must_use]
    pub const fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Build a new `DRAFT` event managed by `actor`.
    ///
    /// # Errors
    ///
    /// - [`EventError::Forbidden`] for anonymous actors
    /// - [`EventError::Validation`] for an inconsistent schedule
    pub fn create(&self, actor: Option<&Identity>, fields: EventFields) -> Result<Event, EventError> {
        let actor = self.require(actor, Operation::Create, None)?;
        let event = normalize_for_creation(Event::draft(fields), actor.id);
        self.check(event)
    }

    /// Replace the user-supplied data of `current`.
    ///
    /// # Errors
    ///
    /// - [`EventError::Forbidden`] unless the actor owns `current` or is an admin
    /// - [`EventError::Validation`] for an inconsistent schedule
    pub fn update(
        &self,
        actor: Option<&Identity>,
        current: &Event,
        fields: EventFields,
    ) -> Result<Event, EventError> {
        self.require(actor, Operation::Update, Some(current))?;
        let mut event = current.clone();
        event.replace_fields(fields);
        self.check(normalize(event))
    }

    /// Merge a partial update into `current`.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn patch(
        &self,
        actor: Option<&Identity>,
        current: &Event,
        patch: EventPatch,
    ) -> Result<Event, EventError> {
        self.require(actor, Operation::Update, Some(current))?;
        let mut event = current.clone();
        patch.apply_to(&mut event);
        self.check(normalize(event))
    }

    /// Check that `actor` may remove `current`.
    ///
    /// # Errors
    ///
    /// [`EventError::Forbidden`] unless the actor owns `current` or is an admin.
    pub fn delete(&self, actor: Option<&Identity>, current: &Event) -> Result<(), EventError> {
        self.require(actor, Operation::Delete, Some(current)).map(|_| ())
    }

    /// Publish `current`.
    ///
    /// The target status of publishing is undecided, so this transition is
    /// exposed but always refuses.
    ///
    /// # Errors
    ///
    /// Always [`EventError::NotImplemented`].
    pub fn publish(&self, _actor: Option<&Identity>, _current: &Event) -> Result<Event, EventError> {
        Err(EventError::NotImplemented("publish"))
    }

    /// Capabilities to surface when `actor` reads `event`.
    #[must_use]
    pub fn capabilities(&self, actor: Option<&Identity>, event: Option<&Event>) -> Capabilities {
        self.gate.capabilities(actor, event)
    }

    fn require<'a>(
        &self,
        actor: Option<&'a Identity>,
        operation: Operation,
        event: Option<&Event>,
    ) -> Result<&'a Identity, EventError> {
        match actor {
            Some(actor) if self.gate.authorize(Some(actor), operation, event).is_allowed() => {
                Ok(actor)
            }
            _ => Err(EventError::Forbidden),
        }
    }

    fn check(&self, event: Event) -> Result<Event, EventError> {
        self.validator.validate(&event).into_result()?;
        Ok(event)
    }
}
