//! User repository for database operations.
//!
//! Queries are runtime-checked (`sqlx::query_as`); rows are converted into
//! domain types at the boundary, with stored-value parsing failures
//! reported as `RepositoryError::DataCorruption`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use farmlink_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::{Address, User};

/// Row shape shared by all user queries.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Email,
    password_hash: String,
    role: String,
    phone: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, phone, \
     street, city, state, postal_code, created_at, updated_at";

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let role: Role = self.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        // Address columns are all-or-nothing; a partial address is treated
        // as absent rather than an error.
        let address = match (self.street, self.city, self.state, self.postal_code) {
            (Some(street), Some(city), Some(state), Some(postal_code)) => Some(Address {
                street,
                city,
                state,
                postal_code,
            }),
            _ => None,
        };

        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            phone: self.phone,
            address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields needed to create a user. The password arrives already hashed;
/// this repository never sees a plaintext password.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub role: Role,
    pub phone: Option<&'a str>,
    pub address: Option<&'a Address>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, phone, \
                 street, city, state, postal_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(new_user.name)
            .bind(new_user.email)
            .bind(new_user.password_hash)
            .bind(new_user.role.to_string())
            .bind(new_user.phone)
            .bind(new_user.address.map(|a| a.street.as_str()))
            .bind(new_user.address.map(|a| a.city.as_str()))
            .bind(new_user.address.map(|a| a.state.as_str()))
            .bind(new_user.address.map(|a| a.postal_code.as_str()))
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        row.into_user()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user together with their stored password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => {
                let hash = r.password_hash.clone();
                Ok(Some((r.into_user()?, hash)))
            }
            None => Ok(None),
        }
    }
}
