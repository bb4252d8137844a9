use anyhow::anyhow;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use devcamper_core::file_storage::{FileStorage, check_image_upload, file_extension};
use devcamper_core::{AppError, ListingQuery, ListingResponse};
use devcamper_db::fetch_listing;
use devcamper_models::bootcamps::DEFAULT_PHOTO;
use devcamper_models::{
    BOOTCAMP_LISTING, Bootcamp, CreateBootcampDto, UpdateBootcampDto, generate_slug,
};

use crate::middleware::auth::AuthUser;

const BOOTCAMP_COLUMNS: &str = "id, user_id, name, slug, description, website, phone, email, \
     address, careers, average_rating, average_cost, photo, housing, job_assistance, \
     job_guarantee, accept_gi, created_at, updated_at";

/// A file received by the photo endpoint.
#[derive(Debug)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct BootcampService;

impl BootcampService {
    #[instrument(skip(db, query))]
    pub async fn get_bootcamps(
        db: &PgPool,
        query: &ListingQuery,
    ) -> Result<ListingResponse, AppError> {
        fetch_listing(db, &BOOTCAMP_LISTING, query).await
    }

    #[instrument(skip(db))]
    pub async fn get_bootcamp(db: &PgPool, id: Uuid) -> Result<Bootcamp, AppError> {
        sqlx::query_as::<_, Bootcamp>(&format!(
            "SELECT {} FROM bootcamps WHERE id = $1",
            BOOTCAMP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Bootcamp not found with id of {}", id)))
    }

    /// Creates a bootcamp owned by the caller. Publishers may own a single
    /// bootcamp; admins are not limited.
    ///
    /// The owner's user row stays locked from the check to the insert, so
    /// concurrent creates by one publisher cannot both pass the check.
    #[instrument(skip(db, owner, dto), fields(user_id = %owner.id(), name = %dto.name))]
    pub async fn create_bootcamp(
        db: &PgPool,
        owner: &AuthUser,
        dto: CreateBootcampDto,
    ) -> Result<Bootcamp, AppError> {
        let mut tx = db.begin().await?;

        if !owner.is_admin() {
            sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(owner.id())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::unauthorized("Not authorized to access this route".to_string())
                })?;

            let published: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bootcamps WHERE user_id = $1)")
                    .bind(owner.id())
                    .fetch_one(&mut *tx)
                    .await?;

            if published {
                return Err(AppError::bad_request(anyhow!(
                    "The user with ID {} has already published a bootcamp",
                    owner.id()
                )));
            }
        }

        let bootcamp = sqlx::query_as::<_, Bootcamp>(&format!(
            "INSERT INTO bootcamps (user_id, name, slug, description, website, phone, email, \
             address, careers, housing, job_assistance, job_guarantee, accept_gi) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {}",
            BOOTCAMP_COLUMNS
        ))
        .bind(owner.id())
        .bind(dto.name.trim())
        .bind(generate_slug(&dto.name))
        .bind(&dto.description)
        .bind(&dto.website)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(&dto.address)
        .bind(&dto.careers)
        .bind(dto.housing)
        .bind(dto.job_assistance)
        .bind(dto.job_guarantee)
        .bind(dto.accept_gi)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(bootcamp)
    }

    /// Applies the fields present in `dto`. A new name also renews the slug.
    #[instrument(skip(db, dto))]
    pub async fn update_bootcamp(
        db: &PgPool,
        id: Uuid,
        dto: UpdateBootcampDto,
    ) -> Result<Bootcamp, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE bootcamps SET updated_at = NOW()");
        if let Some(name) = &dto.name {
            builder.push(", name = ").push_bind(name.trim());
            builder.push(", slug = ").push_bind(generate_slug(name));
        }
        if let Some(description) = &dto.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(website) = &dto.website {
            builder.push(", website = ").push_bind(website);
        }
        if let Some(phone) = &dto.phone {
            builder.push(", phone = ").push_bind(phone);
        }
        if let Some(email) = &dto.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(address) = &dto.address {
            builder.push(", address = ").push_bind(address);
        }
        if let Some(careers) = &dto.careers {
            builder.push(", careers = ").push_bind(careers);
        }
        if let Some(housing) = dto.housing {
            builder.push(", housing = ").push_bind(housing);
        }
        if let Some(job_assistance) = dto.job_assistance {
            builder.push(", job_assistance = ").push_bind(job_assistance);
        }
        if let Some(job_guarantee) = dto.job_guarantee {
            builder.push(", job_guarantee = ").push_bind(job_guarantee);
        }
        if let Some(accept_gi) = dto.accept_gi {
            builder.push(", accept_gi = ").push_bind(accept_gi);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format_args!(" RETURNING {}", BOOTCAMP_COLUMNS));

        builder
            .build_query_as::<Bootcamp>()
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Bootcamp not found with id of {}", id)))
    }

    /// Deletes the bootcamp with its courses and reviews, then its photo.
    #[instrument(skip(db, bootcamp, file_storage), fields(bootcamp.id = %bootcamp.id))]
    pub async fn delete_bootcamp(
        db: &PgPool,
        bootcamp: &Bootcamp,
        file_storage: &dyn FileStorage,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(bootcamp.id)
            .execute(db)
            .await?;

        if bootcamp.photo != DEFAULT_PHOTO {
            // the row is gone either way
            if let Err(e) = file_storage.delete(&bootcamp.photo).await {
                error!(bootcamp.id = %bootcamp.id, error = %e, "Failed to delete bootcamp photo");
            }
        }

        Ok(())
    }

    /// Stores an uploaded photo as `photo_<id><ext>` and points the bootcamp
    /// at it. A rejected file leaves the bootcamp untouched, and a stored file
    /// the row could not be pointed at is removed again.
    #[instrument(
        skip(db, bootcamp, upload, file_storage),
        fields(bootcamp.id = %bootcamp.id, file.size = upload.bytes.len())
    )]
    pub async fn upload_photo(
        db: &PgPool,
        bootcamp: &Bootcamp,
        upload: PhotoUpload,
        max_bytes: usize,
        file_storage: &dyn FileStorage,
    ) -> Result<String, AppError> {
        check_image_upload(&upload.content_type, upload.bytes.len(), max_bytes)?;

        let file_name = format!("photo_{}{}", bootcamp.id, file_extension(&upload.file_name));
        debug!(bootcamp.id = %bootcamp.id, %file_name, "Saving bootcamp photo");

        file_storage.save(&file_name, &upload.bytes).await?;

        let updated = sqlx::query("UPDATE bootcamps SET photo = $1, updated_at = NOW() WHERE id = $2")
            .bind(&file_name)
            .bind(bootcamp.id)
            .execute(db)
            .await;

        let failure = match updated {
            Ok(result) if result.rows_affected() > 0 => None,
            // bootcamp deleted meanwhile
            Ok(_) => Some((
                true,
                AppError::not_found(anyhow!("Bootcamp not found with id of {}", bootcamp.id)),
            )),
            Err(e) => Some((false, AppError::from(e))),
        };

        if let Some((vanished, e)) = failure {
            // an unchanged name is still referenced by a surviving row
            if (vanished || bootcamp.photo != file_name)
                && let Err(cleanup) = file_storage.delete(&file_name).await
            {
                error!(
                    bootcamp.id = %bootcamp.id,
                    error = %cleanup,
                    %file_name,
                    "Failed to remove unreferenced bootcamp photo"
                );
            }
            return Err(e);
        }

        if bootcamp.photo != DEFAULT_PHOTO && bootcamp.photo != file_name {
            // stale photo with another extension
            if let Err(e) = file_storage.delete(&bootcamp.photo).await {
                error!(
                    bootcamp.id = %bootcamp.id,
                    error = %e,
                    photo = %bootcamp.photo,
                    "Failed to delete previous bootcamp photo"
                );
            }
        }

        Ok(file_name)
    }
}

/// Takes a row lock on the bootcamp for the rest of the transaction.
///
/// Writes that refresh the bootcamp's denormalized averages take this lock
/// first, so each refresh runs after every earlier writer has committed.
pub(crate) async fn lock_bootcamp(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM bootcamps WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Bootcamp not found with id of {}", id)))?;

    Ok(())
}
