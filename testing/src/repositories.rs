//! In-memory repositories.
//!
//! Fast, deterministic stand-ins for the Postgres repositories:
//! - [`InMemoryEventRepository`]: `BTreeMap`-backed event storage with paging
//! - [`InMemoryUserRepository`]: user accounts with case-insensitive email lookup
//!
//! Ids come from a per-repository sequence starting at 1, mirroring a
//! `BIGSERIAL` column.

use natural_core::paging::{Direction, SortProperty};
use natural_core::repository::RepositoryFuture;
use natural_core::{
    Event, EventId, EventRepository, Page, PageRequest, RepositoryError, User, UserId,
    UserRepository,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Default)]
struct EventTable {
    rows: BTreeMap<EventId, Event>,
    next_id: i64,
}

/// In-memory event storage.
///
/// # Example
///
/// ```
/// use natural_testing::{InMemoryEventRepository, fixtures};
/// use natural_core::{Event, EventRepository, PageRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = InMemoryEventRepository::new();
/// let saved = repository.save(Event::draft(fixtures::event_fields())).await?;
///
/// let page = repository.find_all(PageRequest::default()).await?;
/// assert_eq!(page.content, vec![saved]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventRepository {
    table: Arc<RwLock<EventTable>>,
}

impl InMemoryEventRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether no events are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }
}

fn compare(property: SortProperty, a: &Event, b: &Event) -> Ordering {
    let by_property = match property {
        SortProperty::Id => Ordering::Equal,
        SortProperty::Name => a.fields.name.cmp(&b.fields.name),
        SortProperty::BeginEventDateTime => a
            .fields
            .begin_event_date_time
            .cmp(&b.fields.begin_event_date_time),
    };
    by_property.then_with(|| a.id.cmp(&b.id))
}

impl EventRepository for InMemoryEventRepository {
    fn save(&self, mut event: Event) -> RepositoryFuture<'_, Event> {
        Box::pin(async move {
            let mut table = self.table.write().await;
            let id = match event.id {
                Some(id) if table.rows.contains_key(&id) => id,
                Some(id) => {
                    return Err(RepositoryError::NotFound {
                        resource: "Event",
                        id: id.value(),
                    });
                }
                None => {
                    table.next_id += 1;
                    EventId::new(table.next_id)
                }
            };
            event.id = Some(id);
            table.rows.insert(id, event.clone());
            Ok(event)
        })
    }

    fn find_by_id(&self, id: EventId) -> RepositoryFuture<'_, Option<Event>> {
        Box::pin(async move { Ok(self.table.read().await.rows.get(&id).cloned()) })
    }

    fn find_all(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Event>> {
        Box::pin(async move {
            let table = self.table.read().await;
            let mut events: Vec<&Event> = table.rows.values().collect();
            events.sort_by(|a, b| {
                let ordering = compare(request.sort.property, a, b);
                match request.sort.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
            let content = events
                .into_iter()
                .skip(request.offset())
                .take(request.size)
                .cloned()
                .collect();
            Ok(Page::new(content, &request, table.rows.len()))
        })
    }

    fn delete_by_id(&self, id: EventId) -> RepositoryFuture<'_, bool> {
        Box::pin(async move { Ok(self.table.write().await.rows.remove(&id).is_some()) })
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

impl UserTable {
    fn by_email(&self, email: &str) -> Option<&User> {
        self.rows
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }
}

/// In-memory user account storage.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn save(&self, mut user: User) -> RepositoryFuture<'_, User> {
        Box::pin(async move {
            let mut table = self.table.write().await;
            if table
                .by_email(&user.email)
                .is_some_and(|existing| existing.id != user.id)
            {
                return Err(RepositoryError::Conflict(format!(
                    "email already registered: {}",
                    user.email
                )));
            }
            let id = match user.id {
                Some(id) => id,
                None => {
                    table.next_id += 1;
                    UserId::new(table.next_id)
                }
            };
            user.id = Some(id);
            table.rows.insert(id, user.clone());
            Ok(user)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<'_, Option<User>> {
        Box::pin(async move { Ok(self.table.read().await.rows.get(&id).cloned()) })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> RepositoryFuture<'a, Option<User>> {
        Box::pin(async move { Ok(self.table.read().await.by_email(email).cloned()) })
    }
}
