//! Development data seeding.
//!
//! Every seeded account uses an email under [`SEED_EMAIL_DOMAIN`], so
//! [`clear_seed`] can remove exactly what [`seed_all`] created. Deleting the
//! users cascades to their bootcamps, courses and reviews.

pub mod bootcamps;
pub mod models;
pub mod users;

use std::time::Instant;

use devcamper_core::hash_password;
use devcamper_models::Role;
use sqlx::PgPool;

pub use models::{SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig};

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Starting seed...");
    println!(
        "   {} publishers, {} users, {} courses and {} reviews per bootcamp",
        config.publishers, config.users, config.courses_per_bootcamp, config.reviews_per_bootcamp
    );

    // one bcrypt hash shared by every seeded account
    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.to_string())?;

    let publisher_ids =
        users::seed_users(db, Role::Publisher, config.publishers, &password_hash).await?;
    let reviewer_ids = users::seed_users(db, Role::User, config.users, &password_hash).await?;

    bootcamps::seed_bootcamps(
        db,
        &publisher_ids,
        &reviewer_ids,
        config.courses_per_bootcamp,
        config.reviews_per_bootcamp,
    )
    .await?;

    println!("✅ Seed completed in {:?}", start_time.elapsed());
    println!("   All seeded accounts use the password '{}'", SEED_PASSWORD);
    Ok(())
}

pub async fn clear_seed(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    users::clear_users(db).await
}
