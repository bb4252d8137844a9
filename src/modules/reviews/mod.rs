pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_bootcamp_reviews_router, init_reviews_router};
