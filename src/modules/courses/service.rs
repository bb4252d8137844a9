use anyhow::anyhow;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use devcamper_core::listing::Filter;
use devcamper_core::{AppError, ListingQuery, ListingResponse};
use devcamper_db::{fetch_document, fetch_listing};
use devcamper_models::{COURSE_LISTING, Course, CreateCourseDto, UpdateCourseDto};

use crate::modules::bootcamps::service::lock_bootcamp;

const COURSE_COLUMNS: &str = "id, bootcamp_id, user_id, title, description, weeks, tuition, \
     minimum_skill, scholarship_available, created_at, updated_at";

fn course_not_found(id: Uuid) -> AppError {
    AppError::not_found(anyhow!("No course with the id of {}", id))
}

pub struct CourseService;

impl CourseService {
    /// Lists courses, optionally only those of one bootcamp.
    #[instrument(skip(db, query))]
    pub async fn get_courses(
        db: &PgPool,
        bootcamp_id: Option<Uuid>,
        query: ListingQuery,
    ) -> Result<ListingResponse, AppError> {
        let query = match bootcamp_id {
            Some(id) => query.scoped(vec![Filter::scope("bootcamp_id", id)]),
            None => query,
        };
        fetch_listing(db, &COURSE_LISTING, &query).await
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: Uuid) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| course_not_found(id))
    }

    /// The course as listed, with its bootcamp summary embedded.
    #[instrument(skip(db))]
    pub async fn get_course_document(
        db: &PgPool,
        id: Uuid,
    ) -> Result<serde_json::Value, AppError> {
        fetch_document(db, &COURSE_LISTING, id)
            .await?
            .ok_or_else(|| course_not_found(id))
    }

    #[instrument(skip(db, dto))]
    pub async fn add_course(
        db: &PgPool,
        bootcamp_id: Uuid,
        user_id: Uuid,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        let mut tx = db.begin().await?;
        lock_bootcamp(&mut tx, bootcamp_id).await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, \
             minimum_skill, scholarship_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(bootcamp_id)
        .bind(user_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.weeks)
        .bind(dto.tuition)
        .bind(dto.minimum_skill)
        .bind(dto.scholarship_available)
        .fetch_one(&mut *tx)
        .await?;

        refresh_average_cost(&mut tx, bootcamp_id).await?;
        tx.commit().await?;

        Ok(course)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE courses SET updated_at = NOW()");
        if let Some(title) = &dto.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = &dto.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(weeks) = dto.weeks {
            builder.push(", weeks = ").push_bind(weeks);
        }
        if let Some(tuition) = dto.tuition {
            builder.push(", tuition = ").push_bind(tuition);
        }
        if let Some(minimum_skill) = dto.minimum_skill {
            builder.push(", minimum_skill = ").push_bind(minimum_skill);
        }
        if let Some(scholarship_available) = dto.scholarship_available {
            builder
                .push(", scholarship_available = ")
                .push_bind(scholarship_available);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format_args!(" RETURNING {}", COURSE_COLUMNS));

        let mut tx = db.begin().await?;
        let bootcamp_id: Uuid = sqlx::query_scalar("SELECT bootcamp_id FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| course_not_found(id))?;
        lock_bootcamp(&mut tx, bootcamp_id).await?;

        let course = builder
            .build_query_as::<Course>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| course_not_found(id))?;

        refresh_average_cost(&mut tx, course.bootcamp_id).await?;
        tx.commit().await?;

        Ok(course)
    }

    #[instrument(skip(db, course), fields(course.id = %course.id))]
    pub async fn delete_course(db: &PgPool, course: &Course) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        lock_bootcamp(&mut tx, course.bootcamp_id).await?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course.id)
            .execute(&mut *tx)
            .await?;

        refresh_average_cost(&mut tx, course.bootcamp_id).await?;
        tx.commit().await?;

        Ok(())
    }
}

/// Sets `average_cost` to the mean tuition of the bootcamp's courses,
/// rounded up to the nearest ten, or NULL when it has none.
pub(crate) async fn refresh_average_cost(
    conn: &mut PgConnection,
    bootcamp_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE bootcamps SET average_cost = \
         (SELECT CEIL(AVG(tuition) / 10) * 10 FROM courses WHERE bootcamp_id = $1) \
         WHERE id = $1",
    )
    .bind(bootcamp_id)
    .execute(conn)
    .await?;

    Ok(())
}
