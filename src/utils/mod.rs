//! Shared utilities.
//!
//! - [`email`]: SMTP delivery of password reset mails
//! - [`reset_token`]: generation and hashing of password reset tokens

pub mod email;
pub mod reset_token;
