//! User seeding.

use std::time::Instant;

use devcamper_models::Role;
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{SEED_EMAIL_DOMAIN, UserSeed};

pub fn generate_users(role: Role, count: usize) -> Vec<UserSeed> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role,
                idx,
                SEED_EMAIL_DOMAIN
            );

            UserSeed {
                name: format!("{} {}", first_name, last_name),
                email,
                role,
            }
        })
        .collect()
}

pub async fn seed_users(
    db: &PgPool,
    role: Role,
    count: usize,
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("👥 Seeding {} {} accounts...", count, role);

    let users = generate_users(role, count);
    let ids = insert_users_batch(db, &users, password_hash).await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

pub async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO users (name, email, password, role) ");
    builder.push_values(users, |mut row, user| {
        row.push_bind(&user.name)
            .push_bind(&user.email)
            .push_bind(password_hash)
            .push_bind(user.role);
    });
    builder.push(" RETURNING id");

    let ids = builder.build_query_scalar().fetch_all(db).await?;
    Ok(ids)
}

/// Deletes seeded users. Their bootcamps, courses and reviews go with them.
pub async fn clear_users(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} users in {:?}",
        deleted,
        start_time.elapsed()
    );

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_emails_are_unique_and_marked() {
        let users = generate_users(Role::Publisher, 50);
        let mut emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 50);
        assert!(users.iter().all(|u| u.email.ends_with("@seed.devcamper.io")));
        assert!(users.iter().all(|u| u.role == Role::Publisher));
    }
}
