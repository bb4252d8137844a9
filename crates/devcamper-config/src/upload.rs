use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Largest accepted photo, in bytes
    pub max_file_upload: usize,
    pub upload_dir: PathBuf,
    /// Path prefix under which `upload_dir` is served
    pub public_path: String,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            max_file_upload: env::var("MAX_FILE_UPLOAD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000_000),
            upload_dir: env::var("FILE_UPLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public/uploads")),
            public_path: "/uploads".to_string(),
        }
    }

    /// Request body limit for the API, leaving room for multipart framing.
    pub fn body_limit(&self) -> usize {
        self.max_file_upload + 64 * 1024
    }
}
