use checkout_engine::config::{catalog, database};
use checkout_engine::core::report;
use checkout_engine::errors::Result;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the catalog on first run
    if let Some(config) = catalog::load_default_config()? {
        catalog::seed_catalog(&db, &config)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    }

    // 5. Report today's sales
    let today = report::todays_report(&db).await?;
    info!(
        revenue = today.total_revenue,
        orders = today.order_count,
        best_seller = ?today.best_seller,
        "Today's sales"
    );

    Ok(())
}
