use anyhow::anyhow;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use devcamper_core::listing::Filter;
use devcamper_core::{AppError, ListingQuery, ListingResponse};
use devcamper_db::{fetch_document, fetch_listing};
use devcamper_models::{CreateReviewDto, REVIEW_LISTING, Review, UpdateReviewDto};

use crate::modules::bootcamps::service::lock_bootcamp;

const REVIEW_COLUMNS: &str =
    "id, bootcamp_id, user_id, title, text, rating, created_at, updated_at";

fn review_not_found(id: Uuid) -> AppError {
    AppError::not_found(anyhow!("No review found with the id of {}", id))
}

pub struct ReviewService;

impl ReviewService {
    /// Lists reviews, optionally only those of one bootcamp.
    #[instrument(skip(db, query))]
    pub async fn get_reviews(
        db: &PgPool,
        bootcamp_id: Option<Uuid>,
        query: ListingQuery,
    ) -> Result<ListingResponse, AppError> {
        let query = match bootcamp_id {
            Some(id) => query.scoped(vec![Filter::scope("bootcamp_id", id)]),
            None => query,
        };
        fetch_listing(db, &REVIEW_LISTING, &query).await
    }

    #[instrument(skip(db))]
    pub async fn get_review(db: &PgPool, id: Uuid) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| review_not_found(id))
    }

    /// The review as listed, with its bootcamp summary embedded.
    #[instrument(skip(db))]
    pub async fn get_review_document(
        db: &PgPool,
        id: Uuid,
    ) -> Result<serde_json::Value, AppError> {
        fetch_document(db, &REVIEW_LISTING, id)
            .await?
            .ok_or_else(|| review_not_found(id))
    }

    /// Adds the caller's review of a bootcamp. A second review by the same
    /// user is rejected by the `(bootcamp_id, user_id)` unique constraint.
    #[instrument(skip(db, dto))]
    pub async fn add_review(
        db: &PgPool,
        bootcamp_id: Uuid,
        user_id: Uuid,
        dto: CreateReviewDto,
    ) -> Result<Review, AppError> {
        let mut tx = db.begin().await?;
        lock_bootcamp(&mut tx, bootcamp_id).await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (bootcamp_id, user_id, title, text, rating) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(bootcamp_id)
        .bind(user_id)
        .bind(&dto.title)
        .bind(&dto.text)
        .bind(dto.rating)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.constraint() == Some("reviews_one_per_user_per_bootcamp")
            {
                return AppError::duplicate_key(anyhow!(
                    "User {} has already reviewed bootcamp {}",
                    user_id,
                    bootcamp_id
                ));
            }
            AppError::from(e)
        })?;

        refresh_average_rating(&mut tx, bootcamp_id).await?;
        tx.commit().await?;

        Ok(review)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_review(
        db: &PgPool,
        id: Uuid,
        dto: UpdateReviewDto,
    ) -> Result<Review, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE reviews SET updated_at = NOW()");
        if let Some(title) = &dto.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(text) = &dto.text {
            builder.push(", text = ").push_bind(text);
        }
        if let Some(rating) = dto.rating {
            builder.push(", rating = ").push_bind(rating);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format_args!(" RETURNING {}", REVIEW_COLUMNS));

        let mut tx = db.begin().await?;
        let bootcamp_id: Uuid = sqlx::query_scalar("SELECT bootcamp_id FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| review_not_found(id))?;
        lock_bootcamp(&mut tx, bootcamp_id).await?;

        let review = builder
            .build_query_as::<Review>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| review_not_found(id))?;

        refresh_average_rating(&mut tx, review.bootcamp_id).await?;
        tx.commit().await?;

        Ok(review)
    }

    #[instrument(skip(db, review), fields(review.id = %review.id))]
    pub async fn delete_review(db: &PgPool, review: &Review) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        lock_bootcamp(&mut tx, review.bootcamp_id).await?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id)
            .execute(&mut *tx)
            .await?;

        refresh_average_rating(&mut tx, review.bootcamp_id).await?;
        tx.commit().await?;

        Ok(())
    }
}

/// Sets `average_rating` to the mean rating of the bootcamp's reviews, or
/// NULL when it has none.
pub(crate) async fn refresh_average_rating(
    conn: &mut PgConnection,
    bootcamp_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE bootcamps SET average_rating = \
         (SELECT AVG(rating)::float8 FROM reviews WHERE bootcamp_id = $1) \
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(conn)
    .await?;

    Ok(())
}
