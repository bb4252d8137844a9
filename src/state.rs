use std::path::PathBuf;

use devcamper_config::{AppConfig, CorsConfig, EmailConfig, JwtConfig, UploadConfig};
use devcamper_core::file_storage::LocalFileStorage;
use devcamper_db::{DbInitError, PgPool, init_db_pool};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub app_config: AppConfig,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub upload_config: UploadConfig,
    pub photo_storage: LocalFileStorage,
}

impl AppState {
    /// Builds the state around an existing pool, reading every other setting
    /// from the environment.
    pub fn from_env(db: PgPool) -> Self {
        let upload_config = UploadConfig::from_env();
        let photo_storage = photo_storage(&upload_config);

        Self {
            db,
            app_config: AppConfig::from_env(),
            jwt_config: JwtConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            upload_config,
            photo_storage,
        }
    }
}

pub fn photo_storage(upload_config: &UploadConfig) -> LocalFileStorage {
    LocalFileStorage::new(
        PathBuf::from(&upload_config.upload_dir),
        upload_config.public_path.clone(),
    )
}

pub async fn init_app_state() -> Result<AppState, DbInitError> {
    let db = init_db_pool().await?;
    Ok(AppState::from_env(db))
}
