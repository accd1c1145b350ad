use price_engine::{ Config, Result };
use axum::{ Router, routing::{ delete, get, post } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "price_engine=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| price_engine::AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting price-engine (freshness: {}h, baseline: {}d)",
        config.engine.freshness_hours,
        config.engine.baseline_days
    );

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(price_engine::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(price_engine::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Initialize repositories
    let observations = Arc::new(price_engine::db::PriceObservationRepository::new(db.clone()));
    let catalog = Arc::new(price_engine::db::CatalogRepository::new(db.clone()));
    let alerts = Arc::new(price_engine::db::AlertRepository::new(db));

    let clock: Arc<dyn price_engine::clock::Clock> = Arc::new(price_engine::clock::SystemClock);
    let settings = config.engine;

    // Initialize services
    let observation_service = Arc::new(
        price_engine::services::ObservationService::new(
            observations.clone(),
            catalog.clone(),
            clock.clone()
        )
    );

    let price_service = Arc::new(
        price_engine::services::PriceService::new(
            observations.clone(),
            catalog.clone(),
            clock.clone(),
            settings
        )
    );

    let deal_service = Arc::new(
        price_engine::services::DealService::new(
            observations.clone(),
            catalog.clone(),
            clock.clone(),
            settings
        )
    );

    let comparison_service = Arc::new(
        price_engine::services::ComparisonService::new(
            observations.clone(),
            catalog.clone(),
            clock.clone(),
            settings
        )
    );

    let alert_service = Arc::new(
        price_engine::services::AlertService::new(
            alerts,
            observations.clone(),
            catalog.clone(),
            clock.clone(),
            settings
        )
    );

    let analytics_service = Arc::new(
        price_engine::services::AnalyticsService::new(
            observations,
            catalog,
            clock,
            settings
        )
    );

    // Create app state
    let app_state = price_engine::api::AppState::new(
        observation_service,
        price_service,
        deal_service,
        comparison_service,
        alert_service,
        analytics_service
    );

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/prices", post(price_engine::api::prices::record_price))
        .route("/products/{id}/prices", get(price_engine::api::prices::get_product_prices))
        .route(
            "/products/{id}/price-history",
            get(price_engine::api::prices::get_price_history)
        )
        .route(
            "/products/{id}/price-predictions",
            get(price_engine::api::prices::get_price_predictions)
        )
        .route("/deals/best", get(price_engine::api::deals::get_best_deals))
        .route("/products/compare", post(price_engine::api::compare::compare_products))
        .route("/alerts/price", get(price_engine::api::alerts::get_price_alerts))
        .route("/alerts/price", post(price_engine::api::alerts::create_price_alert))
        .route("/alerts/price/{id}", delete(price_engine::api::alerts::delete_price_alert))
        .route("/analytics/savings", get(price_engine::api::analytics::get_savings))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| price_engine::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| price_engine::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
