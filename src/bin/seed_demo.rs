//! Seeds a demo account with a fixed set of expenses so the API can be
//! exercised without going through registration.

use sqlx::postgres::PgPoolOptions;
use time::macros::datetime;
use time::OffsetDateTime;
use tracing::info;

use spendlog::auth::password::hash_password;
use spendlog::auth::repo::User;
use spendlog::expenses::repo::{Category, Expense};

const DEMO_EMAIL: &str = "demo@expense.app";
const DEMO_PASSWORD: &str = "Demo@123";
const DEMO_NAME: &str = "Demo User";

fn demo_expenses() -> Vec<(f64, Category, &'static str, OffsetDateTime)> {
    vec![
        (450.0, Category::Food, "Grocery shopping", datetime!(2025-12-15 00:00 UTC)),
        (120.0, Category::Transport, "Uber ride", datetime!(2025-12-16 00:00 UTC)),
        (800.0, Category::Utilities, "Electricity bill", datetime!(2025-12-10 00:00 UTC)),
        (350.0, Category::Entertainment, "Movie tickets", datetime!(2025-12-17 00:00 UTC)),
        (2500.0, Category::Healthcare, "Medical checkup", datetime!(2025-12-12 00:00 UTC)),
        (1200.0, Category::Shopping, "Clothing", datetime!(2025-12-14 00:00 UTC)),
        (3000.0, Category::Education, "Online course", datetime!(2025-12-08 00:00 UTC)),
        (200.0, Category::Food, "Restaurant dinner", datetime!(2025-12-18 00:00 UTC)),
        (80.0, Category::Transport, "Fuel", datetime!(2025-12-19 00:00 UTC)),
        (150.0, Category::Other, "Miscellaneous", datetime!(2025-12-11 00:00 UTC)),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed_demo=info".to_string()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let user = match User::find_by_email(&db, DEMO_EMAIL).await? {
        Some(user) => {
            info!(user_id = %user.id, "demo user already exists, clearing expenses");
            sqlx::query("DELETE FROM expenses WHERE user_id = $1")
                .bind(user.id)
                .execute(&db)
                .await?;
            user
        }
        None => {
            let hash = hash_password(DEMO_PASSWORD)?;
            let user = User::create(&db, DEMO_EMAIL, DEMO_NAME, &hash).await?;
            info!(user_id = %user.id, "created demo user");
            user
        }
    };

    for (amount, category, description, date) in demo_expenses() {
        Expense::create(&db, user.id, amount, category, description, Some(date)).await?;
    }
    info!("created demo expenses");

    println!("Demo account credentials:");
    println!("Email: {DEMO_EMAIL}");
    println!("Password: {DEMO_PASSWORD}");

    Ok(())
}
