use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slugline::{create_router, init_pool, run_migrations, AppState, Config, TargetCatalog};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: SLUGLINE_DATABASE_URL (default: sqlite://slugline.db)");
            eprintln!("Optional: SLUGLINE_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: SLUGLINE_TARGETS_PATH (default: targets.json)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting slugline server");
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

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Migration error: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database migrations completed");

    let catalog = TargetCatalog::load(&config.targets_path);
    tracing::info!("Loaded {} targets", catalog.len());

    let app = create_router(AppState::new(pool, catalog));

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
