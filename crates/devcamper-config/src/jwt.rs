use std::env;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of the signed token, in days
    pub token_expiry_days: i64,
    /// Lifetime of the `token` cookie, in days
    pub cookie_expiry_days: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            token_expiry_days: env::var("JWT_EXPIRE_DAYS")
                .ok()
                .and_then(|s| s.trim_end_matches('d').parse().ok())
                .unwrap_or(30),
            cookie_expiry_days: env::var("JWT_COOKIE_EXPIRE_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_days * 24 * 60 * 60
    }
}
