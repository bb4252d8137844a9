//! Bootcamp, course and review seeding.

use std::time::Instant;

use devcamper_models::{CAREERS, SkillLevel, generate_slug};
use fake::Fake;
use fake::faker::address::en::{CityName, StreetName, ZipCode};
use fake::faker::company::en::{Buzzword, CompanyName};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::phone_number::en::PhoneNumber;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{BootcampSeed, CourseSeed, ReviewSeed, SEED_EMAIL_DOMAIN};

const SKILLS: [SkillLevel; 3] = [
    SkillLevel::Beginner,
    SkillLevel::Intermediate,
    SkillLevel::Advanced,
];

/// One bootcamp per publisher.
pub fn generate_bootcamps(publisher_ids: &[Uuid]) -> Vec<BootcampSeed> {
    publisher_ids
        .iter()
        .enumerate()
        .map(|(idx, &user_id)| {
            let company: String = CompanyName().fake();
            // index suffix keeps names unique; the column caps them at 50 chars
            let mut name: String = format!("{} Bootcamp", company).chars().take(44).collect();
            name = format!("{} {}", name.trim_end(), idx + 1);
            let slug = generate_slug(&name);

            let career_count = (1..=3).fake::<usize>();
            let start = (0..CAREERS.len()).fake::<usize>();
            let careers = (0..career_count)
                .map(|offset| CAREERS[(start + offset) % CAREERS.len()].to_string())
                .collect();

            let phone: String = PhoneNumber().fake();
            let street: String = StreetName().fake();
            let city: String = CityName().fake();
            let zip: String = ZipCode().fake();
            let description: String = Paragraph(2..4).fake();

            BootcampSeed {
                user_id,
                website: format!("https://{}.com", slug),
                email: format!("enroll@{}.{}", slug, SEED_EMAIL_DOMAIN),
                phone: phone.chars().take(20).collect(),
                address: format!("{} {}, {} {}", (1..999).fake::<u16>(), street, city, zip),
                description: description.chars().take(500).collect(),
                careers,
                housing: fake::Faker.fake(),
                job_assistance: fake::Faker.fake(),
                job_guarantee: fake::Faker.fake(),
                accept_gi: fake::Faker.fake(),
                name,
                slug,
            }
        })
        .collect()
}

pub fn generate_courses(bootcamps: &[(Uuid, Uuid)], per_bootcamp: usize) -> Vec<CourseSeed> {
    bootcamps
        .iter()
        .flat_map(|&(bootcamp_id, user_id)| {
            (0..per_bootcamp).map(move |idx| {
                let topic: String = Buzzword().fake();
                CourseSeed {
                    bootcamp_id,
                    user_id,
                    title: format!("{} {}", capitalize(&topic), idx + 1),
                    description: Sentence(8..16).fake(),
                    weeks: (4..=16).fake::<i32>(),
                    tuition: ((10..=200).fake::<i32>() * 100) as f64,
                    minimum_skill: SKILLS[idx % SKILLS.len()],
                    scholarship_available: fake::Faker.fake(),
                }
            })
        })
        .collect()
}

/// Each reviewer writes at most one review per bootcamp.
pub fn generate_reviews(
    bootcamp_ids: &[Uuid],
    reviewer_ids: &[Uuid],
    per_bootcamp: usize,
) -> Vec<ReviewSeed> {
    if reviewer_ids.is_empty() {
        return Vec::new();
    }
    let per_bootcamp = per_bootcamp.min(reviewer_ids.len());

    bootcamp_ids
        .iter()
        .enumerate()
        .flat_map(|(b_idx, &bootcamp_id)| {
            (0..per_bootcamp).map(move |r_idx| {
                let title: String = Sentence(2..5).fake();
                ReviewSeed {
                    bootcamp_id,
                    user_id: reviewer_ids[(b_idx + r_idx) % reviewer_ids.len()],
                    title: title.chars().take(100).collect(),
                    text: Paragraph(1..3).fake(),
                    rating: (1..=10).fake::<i32>(),
                }
            })
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn insert_bootcamps_batch(
    db: &PgPool,
    bootcamps: &[BootcampSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if bootcamps.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO bootcamps (user_id, name, slug, description, website, phone, email, \
         address, careers, housing, job_assistance, job_guarantee, accept_gi) ",
    );
    builder.push_values(bootcamps, |mut row, b| {
        row.push_bind(b.user_id)
            .push_bind(&b.name)
            .push_bind(&b.slug)
            .push_bind(&b.description)
            .push_bind(&b.website)
            .push_bind(&b.phone)
            .push_bind(&b.email)
            .push_bind(&b.address)
            .push_bind(&b.careers)
            .push_bind(b.housing)
            .push_bind(b.job_assistance)
            .push_bind(b.job_guarantee)
            .push_bind(b.accept_gi);
    });
    builder.push(" RETURNING id");

    Ok(builder.build_query_scalar().fetch_all(db).await?)
}

pub async fn insert_courses_batch(
    db: &PgPool,
    courses: &[CourseSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    if courses.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, \
         minimum_skill, scholarship_available) ",
    );
    builder.push_values(courses, |mut row, c| {
        row.push_bind(c.bootcamp_id)
            .push_bind(c.user_id)
            .push_bind(&c.title)
            .push_bind(&c.description)
            .push_bind(c.weeks)
            .push_bind(c.tuition)
            .push_bind(c.minimum_skill)
            .push_bind(c.scholarship_available);
    });

    Ok(builder.build().execute(db).await?.rows_affected())
}

pub async fn insert_reviews_batch(
    db: &PgPool,
    reviews: &[ReviewSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    if reviews.is_empty() {
        return Ok(0);
    }

    let mut builder =
        QueryBuilder::<Postgres>::new("INSERT INTO reviews (bootcamp_id, user_id, title, text, rating) ");
    builder.push_values(reviews, |mut row, r| {
        row.push_bind(r.bootcamp_id)
            .push_bind(r.user_id)
            .push_bind(&r.title)
            .push_bind(&r.text)
            .push_bind(r.rating);
    });

    Ok(builder.build().execute(db).await?.rows_affected())
}

/// Recomputes `average_cost` and `average_rating` for the given bootcamps
/// the same way the API does after each course or review write.
pub async fn refresh_averages(
    db: &PgPool,
    bootcamp_ids: &[Uuid],
) -> Result<(), Box<dyn std::error::Error>> {
    sqlx::query(
        "UPDATE bootcamps b SET \
         average_cost = (SELECT CEIL(AVG(c.tuition) / 10) * 10 FROM courses c WHERE c.bootcamp_id = b.id), \
         average_rating = (SELECT AVG(r.rating)::float8 FROM reviews r WHERE r.bootcamp_id = b.id) \
         WHERE b.id = ANY($1)",
    )
    .bind(bootcamp_ids)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn seed_bootcamps(
    db: &PgPool,
    publisher_ids: &[Uuid],
    reviewer_ids: &[Uuid],
    courses_per_bootcamp: usize,
    reviews_per_bootcamp: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏕️  Seeding {} bootcamps...", publisher_ids.len());

    let bootcamps = generate_bootcamps(publisher_ids);
    let bootcamp_ids = insert_bootcamps_batch(db, &bootcamps).await?;
    println!("   ✓ Inserted {} bootcamps", bootcamp_ids.len());

    let owners: Vec<(Uuid, Uuid)> = bootcamp_ids
        .iter()
        .copied()
        .zip(bootcamps.iter().map(|b| b.user_id))
        .collect();
    let courses = generate_courses(&owners, courses_per_bootcamp);
    let course_count = insert_courses_batch(db, &courses).await?;
    println!("   ✓ Inserted {} courses", course_count);

    let reviews = generate_reviews(&bootcamp_ids, reviewer_ids, reviews_per_bootcamp);
    let review_count = insert_reviews_batch(db, &reviews).await?;
    println!("   ✓ Inserted {} reviews", review_count);

    refresh_averages(db, &bootcamp_ids).await?;
    println!(
        "   ✓ Bootcamps seeded in {:?}",
        start_time.elapsed()
    );

    Ok(bootcamp_ids.len())
}
