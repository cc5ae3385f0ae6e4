use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kartpicker::middleware::spawn_cleanup;
use kartpicker::{create_router, import_file, init_pool, run_migrations, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: DATABASE_URL (default: sqlite://kartpicker.db)");
            eprintln!("Optional: KARTPICKER_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: KARTPICKER_SEED_PATH, KARTPICKER_READ_LIMIT, KARTPICKER_BASE_KART_WEIGHT");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting kartpicker server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database: {}", config.database_url);

    // Connect to database
    let pool = match init_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Database connection error: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed");

    // Import catalog seed
    if let Some(path) = &config.seed_path {
        match import_file(&pool, path).await {
            Ok(report) => tracing::info!(
                "Imported catalog from {}: {} engines, {} motors, {} parts, {} rules, {} fitments ({} skipped)",
                path.display(),
                report.engines,
                report.motors,
                report.parts,
                report.rules,
                report.fitments,
                report.skipped
            ),
            Err(e) => {
                eprintln!("Seed import error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Create app state
    let state = AppState::new(pool, &config);
    spawn_cleanup(state.read_limiter.clone(), Duration::from_secs(60));

    // Build router
    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
