pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_bootcamp_courses_router, init_courses_router};
