//! Feature modules. Each one holds its controller (HTTP handlers), service
//! (store access and business rules) and router.

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;
