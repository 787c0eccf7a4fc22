mod api;
mod classifier;
mod config;
mod db;
mod error;
mod models;
mod sanitize;
mod service;
mod store;

use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::classifier::HttpSentimentClassifier;
use crate::config::Config;
use crate::service::ReviewService;
use crate::store::PgReviewStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::predict,
        api::save_review,
        api::movie_sentiment,
        api::search_movies,
        api::health
    ),
    components(
        schemas(
            api::PredictRequest,
            api::PredictResponse,
            api::SaveReviewRequest,
            api::SaveReviewResponse,
            api::MovieSentimentResponse,
            api::MovieSummary,
            api::StatsBody,
            api::RecentReviewBody,
            api::TrendPointBody,
            api::MovieListResponse,
            crate::models::Movie,
            crate::models::Sentiment
        )
    ),
    tags(
        (name = "reviews", description = "Review ingestion and sentiment statistics API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    db::init_db(&pool).await?;

    let classifier = HttpSentimentClassifier::new(
        &config.classifier_url,
        &config.model_id,
        Duration::from_secs(config.classifier_timeout_secs),
    );
    let service = ReviewService::new(Arc::new(PgReviewStore::new(pool)), Arc::new(classifier));
    let state = Arc::new(api::AppState { service });

    let app = api::router(state)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
