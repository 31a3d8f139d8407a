use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchmaking_service::config::Config;
use matchmaking_service::db::SqlxMatchmakingStore;
use matchmaking_service::handlers;
use matchmaking_service::middleware::JwtAuthMiddleware;
use matchmaking_service::security::jwt;
use matchmaking_service::services::{
    BoundedRelevanceScorer, EpdBaselineClient, PipelineSettings, RankingOrchestrator,
    RelevanceApiScorer, TierThresholds,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!(
        "Starting matchmaking-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    jwt::initialize_validation_key(&config.auth.jwt_public_key_pem)
        .expect("Failed to initialize JWT validation key");

    // Initialize database
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to create database pool");

    // Wire the pipeline
    let store = Arc::new(SqlxMatchmakingStore::new(db_pool));
    let relevance_scorer = Arc::new(
        RelevanceApiScorer::new(&config.match_scoring)
            .expect("Failed to build relevance scorer client"),
    );
    let baseline_client = Arc::new(
        EpdBaselineClient::new(&config.baseline)
            .expect("Failed to build EPD baseline client"),
    );

    let orchestrator = Arc::new(RankingOrchestrator::new(
        store,
        baseline_client,
        BoundedRelevanceScorer::new(relevance_scorer, config.match_scoring.top_k),
        PipelineSettings {
            thresholds: TierThresholds {
                near_miles: config.tiering.near_miles,
                regional_miles: config.tiering.regional_miles,
            },
            transport_kg_per_ton_mile: config.carbon.transport_kg_per_ton_mile,
            model_used: config.match_scoring.model.clone(),
            token_unit_price_usd: config.match_scoring.token_unit_price_usd,
        },
    ));

    let orchestrator_data = web::Data::new(orchestrator);
    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(orchestrator_data.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware)
                    .route(
                        "/requests/{request_id}/matches",
                        web::post().to(handlers::run_matchmaking),
                    )
                    .route(
                        "/requests/{request_id}/carbon-records",
                        web::get().to(handlers::list_carbon_records),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
