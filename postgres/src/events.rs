//! Event persistence.

use crate::database_error;
use natural_core::paging::{Direction, SortProperty};
use natural_core::repository::RepositoryFuture;
use natural_core::{
    Event, EventFields, EventId, EventRepository, EventStatus, Page, PageRequest, RepositoryError,
    UserId,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COLUMNS: &str = "id, name, description, \
    begin_enrollment_date_time, close_enrollment_date_time, \
    begin_event_date_time, end_event_date_time, \
    location, base_price, max_price, limit_of_enrollment, \
    free, offline, event_status, manager_id";

/// `PostgreSQL` event repository.
#[derive(Clone, Debug)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, event: &Event) -> Result<EventId, RepositoryError> {
        let f = &event.fields;
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO events (
                name, description,
                begin_enrollment_date_time, close_enrollment_date_time,
                begin_event_date_time, end_event_date_time,
                location, base_price, max_price, limit_of_enrollment,
                free, offline, event_status, manager_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(&f.name)
        .bind(&f.description)
        .bind(f.begin_enrollment_date_time)
        .bind(f.close_enrollment_date_time)
        .bind(f.begin_event_date_time)
        .bind(f.end_event_date_time)
        .bind(&f.location)
        .bind(f.base_price.map(i64::from))
        .bind(f.max_price.map(i64::from))
        .bind(f.limit_of_enrollment.map(i64::from))
        .bind(event.free)
        .bind(event.offline)
        .bind(event.event_status.as_str())
        .bind(event.manager.map(UserId::value))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("Failed to insert event", &e))?;

        metrics::counter!("natural.repository.events.inserted").increment(1);
        Ok(EventId::new(id))
    }

    async fn update(&self, id: EventId, event: &Event) -> Result<(), RepositoryError> {
        let f = &event.fields;
        let result = sqlx::query(
            r"
            UPDATE events SET
                name = $2, description = $3,
                begin_enrollment_date_time = $4, close_enrollment_date_time = $5,
                begin_event_date_time = $6, end_event_date_time = $7,
                location = $8, base_price = $9, max_price = $10, limit_of_enrollment = $11,
                free = $12, offline = $13, event_status = $14, manager_id = $15
            WHERE id = $1
            ",
        )
        .bind(id.value())
        .bind(&f.name)
        .bind(&f.description)
        .bind(f.begin_enrollment_date_time)
        .bind(f.close_enrollment_date_time)
        .bind(f.begin_event_date_time)
        .bind(f.end_event_date_time)
        .bind(&f.location)
        .bind(f.base_price.map(i64::from))
        .bind(f.max_price.map(i64::from))
        .bind(f.limit_of_enrollment.map(i64::from))
        .bind(event.free)
        .bind(event.offline)
        .bind(event.event_status.as_str())
        .bind(event.manager.map(UserId::value))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update event", &e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                resource: "Event",
                id: id.value(),
            });
        }
        metrics::counter!("natural.repository.events.updated").increment(1);
        Ok(())
    }
}

const fn order_column(property: SortProperty) -> &'static str {
    match property {
        SortProperty::Id => "id",
        SortProperty::Name => "name",
        SortProperty::BeginEventDateTime => "begin_event_date_time",
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn amount(row: &PgRow, column: &str) -> Result<Option<u32>, RepositoryError> {
    let value: Option<i64> = row
        .try_get(column)
        .map_err(|e| database_error("Failed to decode event", &e))?;
    value
        .map(|v| u32::try_from(v).map_err(|_| RepositoryError::Corrupt(format!("{column} = {v}"))))
        .transpose()
}

fn event_from_row(row: &PgRow) -> Result<Event, RepositoryError> {
    let decode = |e: sqlx::Error| database_error("Failed to decode event", &e);
    let status: String = row.try_get("event_status").map_err(decode)?;

    Ok(Event {
        id: Some(EventId::new(row.try_get("id").map_err(decode)?)),
        fields: EventFields {
            name: row.try_get("name").map_err(decode)?,
            description: row.try_get("description").map_err(decode)?,
            begin_enrollment_date_time: row.try_get("begin_enrollment_date_time").map_err(decode)?,
            close_enrollment_date_time: row.try_get("close_enrollment_date_time").map_err(decode)?,
            begin_event_date_time: row.try_get("begin_event_date_time").map_err(decode)?,
            end_event_date_time: row.try_get("end_event_date_time").map_err(decode)?,
            location: row.try_get("location").map_err(decode)?,
            base_price: amount(row, "base_price")?,
            max_price: amount(row, "max_price")?,
            limit_of_enrollment: amount(row, "limit_of_enrollment")?,
        },
        free: row.try_get("free").map_err(decode)?,
        offline: row.try_get("offline").map_err(decode)?,
        event_status: EventStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Corrupt(format!("event_status = {status}")))?,
        manager: row
            .try_get::<Option<i64>, _>("manager_id")
            .map_err(decode)?
            .map(UserId::new),
    })
}

impl EventRepository for PostgresEventRepository {
    fn save(&self, mut event: Event) -> RepositoryFuture<'_, Event> {
        Box::pin(async move {
            match event.id {
                Some(id) => self.update(id, &event).await?,
                None => event.id = Some(self.insert(&event).await?),
            }
            tracing::debug!(event_id = ?event.id, "Event saved");
            Ok(event)
        })
    }

    fn find_by_id(&self, id: EventId) -> RepositoryFuture<'_, Option<Event>> {
        Box::pin(async move {
            let row = sqlx::query(&format!("SELECT {COLUMNS} FROM events WHERE id = $1"))
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to load event", &e))?;
            row.as_ref().map(event_from_row).transpose()
        })
    }

    fn find_all(&self, request: PageRequest) -> RepositoryFuture<'_, Page<Event>> {
        Box::pin(async move {
            let direction = match request.sort.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            let column = order_column(request.sort.property);
            let sql = format!(
                "SELECT {COLUMNS} FROM events ORDER BY {column} {direction}, id {direction} \
                 LIMIT $1 OFFSET $2"
            );

            let rows = sqlx::query(&sql)
                .bind(to_i64(request.size))
                .bind(to_i64(request.offset()))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error("Failed to list events", &e))?;

            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("Failed to count events", &e))?;

            let content = rows
                .iter()
                .map(event_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            let total = usize::try_from(total).unwrap_or_default();
            Ok(Page::new(content, &request, total))
        })
    }

    fn delete_by_id(&self, id: EventId) -> RepositoryFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id.value())
                .execute(&self.pool)
                .await
                .map_err(|e| database_error("Failed to delete event", &e))?;
            let deleted = result.rows_affected() > 0;
            if deleted {
                metrics::counter!("natural.repository.events.deleted").increment(1);
            }
            Ok(deleted)
        })
    }
}
