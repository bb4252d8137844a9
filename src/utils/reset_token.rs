//! Password reset tokens.
//!
//! The plain token only ever leaves the process in the reset email. The
//! users table stores its SHA-256 digest, so a leaked row cannot be replayed.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Lifetime of a reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

const TOKEN_BYTES: usize = 20;

#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Hex token sent to the user
    pub token: String,
    /// Digest stored in `users.reset_password_token`
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        Self {
            hash: hash_reset_token(&token),
            token,
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let reset = ResetToken::generate();
        assert_eq!(reset.token.len(), TOKEN_BYTES * 2);
        assert!(reset.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(reset.hash, hash_reset_token(&reset.token));
        assert_ne!(reset.hash, reset.token);
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(ResetToken::generate().token, ResetToken::generate().token);
    }

    #[test]
    fn test_expiry_is_ten_minutes_out() {
        let reset = ResetToken::generate();
        let remaining = reset.expires_at - Utc::now();
        assert!(remaining <= Duration::minutes(10));
        assert!(remaining > Duration::minutes(9));
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
