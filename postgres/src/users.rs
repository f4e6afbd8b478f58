//! User account persistence.

use crate::database_error;
use natural_core::repository::RepositoryFuture;
use natural_core::{RepositoryError, Role, User, UserId, UserRepository};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

const SELECT_USER: &str = r"
    SELECT u.id, u.email, u.password_hash,
           COALESCE(array_agg(r.role) FILTER (WHERE r.role IS NOT NULL), '{}') AS roles
    FROM users u
    LEFT JOIN user_roles r ON r.user_id = u.id
";

/// `PostgreSQL` user repository.
#[derive(Clone, Debug)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(&self, user: &User) -> Result<UserId, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("Failed to begin transaction", &e))?;

        let id = match user.id {
            Some(id) => {
                sqlx::query("UPDATE users SET email = $2, password_hash = $3 WHERE id = $1")
                    .bind(id.value())
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| write_error(&user.email, &e))?;
                id
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
                )
                .bind(&user.email)
                .bind(&user.password_hash)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| write_error(&user.email, &e))?;
                UserId::new(id)
            }
        };

        replace_roles(&mut tx, id, user).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("Failed to commit user", &e))?;
        Ok(id)
    }

    async fn fetch_optional(
        &self,
        query: sqlx::query::Query<'_, Postgres, PgArguments>,
    ) -> Result<Option<User>, RepositoryError> {
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to load user", &e))?;
        row.as_ref().map(user_from_row).transpose()
    }
}

async fn replace_roles(
    tx: &mut Transaction<'_, Postgres>,
    id: UserId,
    user: &User,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(id.value())
        .execute(&mut **tx)
        .await
        .map_err(|e| database_error("Failed to clear roles", &e))?;

    for role in &user.roles {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id.value())
            .bind(role.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| database_error("Failed to grant role", &e))?;
    }
    Ok(())
}

fn write_error(email: &str, error: &sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = error {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("email already registered: {email}"));
        }
    }
    database_error("Failed to save user", error)
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    let decode = |e: sqlx::Error| database_error("Failed to decode user", &e);
    let roles: Vec<String> = row.try_get("roles").map_err(decode)?;
    let roles = roles
        .iter()
        .map(|role| {
            Role::parse(role).ok_or_else(|| RepositoryError::Corrupt(format!("role = {role}")))
        })
        .collect::<Result<_, _>>()?;

    Ok(User {
        id: Some(UserId::new(row.try_get("id").map_err(decode)?)),
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        roles,
    })
}

impl UserRepository for PostgresUserRepository {
    fn save(&self, mut user: User) -> RepositoryFuture<'_, User> {
        Box::pin(async move {
            let id = self.write(&user).await?;
            user.id = Some(id);
            tracing::debug!(user_id = %id, "User saved");
            Ok(user)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<'_, Option<User>> {
        Box::pin(async move {
            let sql = format!("{SELECT_USER} WHERE u.id = $1 GROUP BY u.id");
            self.fetch_optional(sqlx::query(&sql).bind(id.value())).await
        })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> RepositoryFuture<'a, Option<User>> {
        Box::pin(async move {
            let sql = format!("{SELECT_USER} WHERE lower(u.email) = lower($1) GROUP BY u.id");
            self.fetch_optional(sqlx::query(&sql).bind(email)).await
        })
    }
}
