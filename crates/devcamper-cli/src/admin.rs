//! Admin account creation. Admins cannot register through the API.

use devcamper_core::hash_password;
use devcamper_models::Role;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".into());
    }

    let email = email.trim().to_lowercase();
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&email)
        .fetch_one(db)
        .await?;
    if exists {
        return Err(format!("A user with email {} already exists", email).into());
    }

    let password_hash = hash_password(password).map_err(|e| e.to_string())?;

    let id = sqlx::query_scalar(
        "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name.trim())
    .bind(&email)
    .bind(password_hash)
    .bind(Role::Admin)
    .fetch_one(db)
    .await?;

    Ok(id)
}
