use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use devcamper_core::{AppError, ListingQuery, ListingResponse, hash_password};
use devcamper_db::fetch_listing;
use devcamper_models::{CreateUserDto, Role, USER_LISTING, UpdateUserDto, User, UserCredentials};

pub(crate) const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Loads a user by id, `None` when the row is gone.
    #[instrument(skip(db))]
    pub async fn find_user(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn find_credentials_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password FROM users WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await?;

        Ok(credentials)
    }

    #[instrument(skip(db))]
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        Self::find_user(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No user with the id of {}", id)))
    }

    #[instrument(skip(db, query))]
    pub async fn get_users(db: &PgPool, query: &ListingQuery) -> Result<ListingResponse, AppError> {
        fetch_listing(db, &USER_LISTING, query).await
    }

    /// Inserts a user with a freshly hashed password. A taken email surfaces
    /// as a duplicate key error.
    #[instrument(skip(db, password))]
    pub async fn insert_user(
        db: &PgPool,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name.trim())
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        Self::insert_user(db, &dto.name, &dto.email, &dto.password, dto.role).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(db: &PgPool, id: Uuid, dto: UpdateUserDto) -> Result<User, AppError> {
        let password_hash = dto.password.as_deref().map(hash_password).transpose()?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            builder.push(", name = ").push_bind(name.trim());
        }
        if let Some(email) = &dto.email {
            builder.push(", email = ").push_bind(email.trim().to_lowercase());
        }
        if let Some(hash) = password_hash {
            builder.push(", password = ").push_bind(hash);
        }
        if let Some(role) = dto.role {
            builder.push(", role = ").push_bind(role);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format_args!(" RETURNING {}", USER_COLUMNS));

        builder
            .build_query_as::<User>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No user with the id of {}", id)))
    }

    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("No user with the id of {}", id)));
        }

        Ok(())
    }
}
