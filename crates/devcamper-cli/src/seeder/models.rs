//! Seed records and seeding configuration.

use devcamper_models::{Role, SkillLevel};
use uuid::Uuid;

/// Domain of every seeded email address; `clear-seed` deletes by it.
pub const SEED_EMAIL_DOMAIN: &str = "seed.devcamper.io";

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "123456";

pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub struct BootcampSeed {
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub careers: Vec<String>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

pub struct CourseSeed {
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub tuition: f64,
    pub minimum_skill: SkillLevel,
    pub scholarship_available: bool,
}

pub struct ReviewSeed {
    pub bootcamp_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    /// Publishers, each owning one bootcamp
    pub publishers: usize,
    /// Reviewing users
    pub users: usize,
    pub courses_per_bootcamp: usize,
    /// Reviews per bootcamp, capped by the number of users
    pub reviews_per_bootcamp: usize,
}

impl SeedConfig {
    pub fn new(publishers: usize) -> Self {
        Self {
            publishers,
            ..Self::default()
        }
    }

    pub fn with_users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    pub fn with_courses(mut self, courses_per_bootcamp: usize) -> Self {
        self.courses_per_bootcamp = courses_per_bootcamp;
        self
    }

    pub fn with_reviews(mut self, reviews_per_bootcamp: usize) -> Self {
        self.reviews_per_bootcamp = reviews_per_bootcamp;
        self
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            publishers: 5,
            users: 20,
            courses_per_bootcamp: 4,
            reviews_per_bootcamp: 5,
        }
    }
}
