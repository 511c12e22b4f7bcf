//! Users repository.

use crate::errors::AuthServiceError;
use crate::models::{User, UserRow};
use sqlx::PgPool;
use tracing::instrument;

/// Conflict message when the email is already registered.
pub const EMAIL_TAKEN: &str = "User with this email already exists";

pub struct UsersRepository;

impl UsersRepository {
    /// Look up a user by exact email.
    #[instrument(skip_all, name = "auth.repo.get_by_email")]
    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthServiceError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Look up a user by id.
    #[instrument(skip_all, name = "auth.repo.get_by_id", fields(user_id = %id))]
    pub async fn get_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, AuthServiceError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Insert a new user.
    ///
    /// Returns `AuthServiceError::Conflict` if the email is already taken.
    #[instrument(skip_all, name = "auth.repo.create_user", fields(user_id = %user.id))]
    pub async fn create_user(pool: &PgPool, user: &User) -> Result<User, AuthServiceError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, name, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(pool)
        .await
        .map_err(map_create_error)?;

        User::try_from(row)
    }
}

/// Postgres-generated name of the `email UNIQUE` constraint.
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

fn map_create_error(err: sqlx::Error) -> AuthServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return AuthServiceError::Conflict(EMAIL_TAKEN.to_string());
        }
    }
    AuthServiceError::from(err)
}
