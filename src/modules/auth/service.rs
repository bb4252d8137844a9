use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use devcamper_auth::create_token;
use devcamper_config::{EmailConfig, JwtConfig};
use devcamper_core::{AppError, hash_password, verify_password};
use devcamper_models::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, UpdateDetailsRequest,
    UpdatePasswordRequest, User,
};

use crate::modules::users::service::{USER_COLUMNS, UserService};
use crate::utils::email::EmailService;
use crate::utils::reset_token::{ResetToken, hash_reset_token};

pub struct AuthService;

impl AuthService {
    /// Creates a `user` or `publisher` account and signs a token for it.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email, role = %dto.role))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        if !dto.role.is_self_assignable() {
            return Err(AppError::bad_request(anyhow!(
                "Role {} cannot be assigned at registration",
                dto.role
            )));
        }

        let user =
            UserService::insert_user(db, &dto.name, &dto.email, &dto.password, dto.role).await?;
        tracing::info!(user_id = %user.id, "User registered");

        create_token(user.id, jwt_config)
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        let credentials = UserService::find_credentials_by_email(db, &dto.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&dto.password, &credentials.password)? {
            tracing::warn!(user_id = %credentials.id, "Login with wrong password");
            return Err(invalid_credentials());
        }

        create_token(credentials.id, jwt_config)
    }

    /// Changes the caller's name and email. Role and password are not
    /// touched here.
    #[instrument(skip(db, dto))]
    pub async fn update_details(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateDetailsRequest,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.email.map(|email| email.trim().to_lowercase()))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("No user with the id of {}", user_id)))?;

        Ok(user)
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn update_password(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdatePasswordRequest,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        let current_hash: String = sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No user with the id of {}", user_id)))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::unauthorized("Password is incorrect".to_string()));
        }

        set_password(db, user_id, &dto.new_password).await?;
        create_token(user_id, jwt_config)
    }

    /// Stores a fresh reset token for the account and mails the reset link.
    ///
    /// When SMTP is disabled the link is logged instead. When delivery
    /// fails the token is cleared again so it can never be used.
    #[instrument(skip(db, email_config))]
    pub async fn forgot_password(
        db: &PgPool,
        email: &str,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let user = UserService::find_by_email(db, email)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("There is no user with that email")))?;

        let reset = ResetToken::generate();
        sqlx::query(
            "UPDATE users SET reset_password_token = $2, reset_password_expire = $3 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&reset.hash)
        .bind(reset.expires_at)
        .execute(db)
        .await?;

        let email_service = EmailService::new(email_config.clone());
        let reset_url = email_service.reset_url(&reset.token);

        if !email_service.is_enabled() {
            tracing::info!(user_id = %user.id, %reset_url, "SMTP disabled, reset link not mailed");
            return Ok(());
        }

        if let Err(err) = email_service
            .send_password_reset_email(&user.email, &user.name, &reset_url)
            .await
        {
            tracing::error!(user_id = %user.id, error = %err, "Reset email failed");
            clear_reset_token(db, user.id).await?;
            return Err(AppError::internal_error(
                "Email could not be sent".to_string(),
            ));
        }

        Ok(())
    }

    /// Sets a new password for the account holding `reset_token`, if the
    /// token has not expired, and signs a token for it.
    #[instrument(skip_all)]
    pub async fn reset_password(
        db: &PgPool,
        reset_token: &str,
        dto: ResetPasswordRequest,
        jwt_config: &JwtConfig,
    ) -> Result<String, AppError> {
        let user_id: Uuid = sqlx::query_scalar(
            "SELECT id FROM users \
             WHERE reset_password_token = $1 AND reset_password_expire > NOW()",
        )
        .bind(hash_reset_token(reset_token))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid token")))?;

        set_password(db, user_id, &dto.password).await?;
        tracing::info!(%user_id, "Password reset");

        create_token(user_id, jwt_config)
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials".to_string())
}

/// Replaces the password hash and drops any pending reset token.
async fn set_password(db: &PgPool, user_id: Uuid, password: &str) -> Result<(), AppError> {
    let password_hash = hash_password(password)?;

    sqlx::query(
        "UPDATE users SET password = $2, reset_password_token = NULL, \
         reset_password_expire = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(db)
    .await?;

    Ok(())
}

async fn clear_reset_token(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE users SET reset_password_token = NULL, reset_password_expire = NULL WHERE id = $1",
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(())
}
