use clap::{Parser, Subcommand};
use devcamper_cli::admin::create_admin;
use devcamper_cli::seeder::{self, SEED_EMAIL_DOMAIN, SeedConfig};
use devcamper_db::{PgPool, init_db_pool, run_migrations};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "devcamper-cli")]
#[command(about = "DevCamper CLI - Administrative tools for DevCamper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// Display name of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Seed the database with fake publishers, bootcamps, courses, users and reviews
    Seed {
        /// Number of publishers, each with one bootcamp
        #[arg(short = 'b', long, default_value = "5")]
        publishers: usize,

        /// Number of reviewing users
        #[arg(short = 'u', long, default_value = "20")]
        users: usize,

        /// Number of courses per bootcamp
        #[arg(short = 'c', long, default_value = "4")]
        courses: usize,

        /// Number of reviews per bootcamp
        #[arg(short = 'r', long, default_value = "5")]
        reviews: usize,
    },
    /// Delete all seeded data (accounts not created by the seeder are kept)
    ClearSeed {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Seed {
            publishers,
            users,
            courses,
            reviews,
        } => handle_seed(&pool, publishers, users, courses, reviews).await,
        Commands::ClearSeed { yes } => handle_clear_seed(&pool, yes).await,
    }
}

fn prompt_text(prompt: &str) -> String {
    match Input::new().with_prompt(prompt).interact_text() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", prompt.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = name.unwrap_or_else(|| prompt_text("Name"));
    let email = email.unwrap_or_else(|| prompt_text("Email address"));

    let password = password.unwrap_or_else(|| {
        match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(password) => password,
            Err(e) => {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            }
        }
    });

    match create_admin(pool, &name, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {}", name.trim());
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_migrate(pool: &PgPool) {
    match run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(
    pool: &PgPool,
    publishers: usize,
    users: usize,
    courses: usize,
    reviews: usize,
) {
    let config = SeedConfig::new(publishers)
        .with_users(users)
        .with_courses(courses)
        .with_reviews(reviews);

    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear_seed(pool: &PgPool, yes: bool) {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete every account under @{} and everything they own?",
                SEED_EMAIL_DOMAIN
            ))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Aborted");
            return;
        }
    }

    match seeder::clear_seed(pool).await {
        Ok(count) => println!("✅ Cleared {} seeded users and their data", count),
        Err(e) => {
            eprintln!("\n❌ Error clearing seed data: {}", e);
            std::process::exit(1);
        }
    }
}
