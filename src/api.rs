//! HTTP surface: five JSON routes plus a JSON 404 fallback, CORS-open.
//! Handlers translate between wire DTOs and the service layer; domain
//! errors map to status codes via `ApiError`'s `IntoResponse`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};
use crate::models::{Movie, Sentiment};
use crate::service::ReviewService;

pub const SERVICE_NAME: &str = "movie-review-api";

pub struct AppState {
    pub service: ReviewService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/predict", post(predict))
        .route("/api/reviews", post(save_review))
        .route("/api/movies/:movie_id/sentiment", get(movie_sentiment))
        .route("/api/movies", get(search_movies))
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ============================================================================
// Wire DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub model: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveReviewRequest {
    pub movie_id: Option<String>,
    pub text: Option<String>,
    pub sentiment: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveReviewResponse {
    pub success: bool,
    pub review_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub total_reviews: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    pub positive_percentage: String,
    pub average_confidence: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentReviewBody {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendPointBody {
    pub date: String,
    pub positive: i64,
    pub negative: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieSentimentResponse {
    pub movie: MovieSummary,
    pub stats: StatsBody,
    pub recent_reviews: Vec<RecentReviewBody>,
    pub trend: Vec<TrendPointBody>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Title substring to search for; omit for a full catalog listing.
    pub q: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Classify free-text review sentiment without persisting anything.
#[utoipa::path(
    post,
    path = "/api/predict",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Classification result", body = PredictResponse),
        (status = 400, description = "Missing or empty text"),
        (status = 502, description = "Classifier unavailable")
    ),
    tag = "reviews"
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    let text = req.text.unwrap_or_default();
    let analyzed = state.service.analyze(&text).await?;

    Ok(Json(PredictResponse {
        text: analyzed.text,
        sentiment: analyzed.sentiment,
        confidence: analyzed.confidence,
        model: analyzed.model,
    }))
}

/// Persist a classified review against a catalog movie.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = SaveReviewRequest,
    responses(
        (status = 201, description = "Review saved", body = SaveReviewResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 404, description = "Movie not found")
    ),
    tag = "reviews"
)]
pub async fn save_review(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveReviewRequest>,
) -> ApiResult<(StatusCode, Json<SaveReviewResponse>)> {
    let movie_id = req
        .movie_id
        .ok_or_else(|| ApiError::InvalidInput("movieId is required".into()))?;
    let text = req
        .text
        .ok_or_else(|| ApiError::InvalidInput("text is required".into()))?;
    let sentiment_raw = req
        .sentiment
        .ok_or_else(|| ApiError::InvalidInput("sentiment is required".into()))?;
    let sentiment = Sentiment::parse(&sentiment_raw).ok_or_else(|| {
        ApiError::InvalidInput("sentiment must be positive or negative".into())
    })?;
    let confidence = req
        .confidence
        .ok_or_else(|| ApiError::InvalidInput("confidence is required".into()))?;

    let review_id = state
        .service
        .save_review(&movie_id, &text, sentiment, confidence)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveReviewResponse {
            success: true,
            review_id,
            message: "Review saved".into(),
        }),
    ))
}

/// Aggregated sentiment statistics for one movie.
#[utoipa::path(
    get,
    path = "/api/movies/{movie_id}/sentiment",
    params(("movie_id" = String, Path, description = "Catalog movie id")),
    responses(
        (status = 200, description = "Statistics view", body = MovieSentimentResponse),
        (status = 404, description = "Movie not found")
    ),
    tag = "reviews"
)]
pub async fn movie_sentiment(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> ApiResult<Json<MovieSentimentResponse>> {
    let stats = state.service.get_stats(&movie_id).await?;

    Ok(Json(MovieSentimentResponse {
        movie: MovieSummary {
            id: stats.movie.id,
            title: stats.movie.title,
            year: stats.movie.year,
        },
        stats: StatsBody {
            total_reviews: stats.total_reviews,
            positive_count: stats.positive_count,
            negative_count: stats.negative_count,
            positive_percentage: stats.positive_percentage,
            average_confidence: stats.average_confidence,
        },
        recent_reviews: stats
            .recent_reviews
            .into_iter()
            .map(|r| RecentReviewBody {
                text: r.text,
                sentiment: r.sentiment,
                confidence: r.confidence,
                date: r.created_at.to_rfc3339(),
            })
            .collect(),
        trend: stats
            .trend
            .into_iter()
            .map(|b| TrendPointBody {
                date: b.date.to_string(),
                positive: b.positive,
                negative: b.negative,
            })
            .collect(),
    }))
}

/// Search the movie catalog by title.
#[utoipa::path(
    get,
    path = "/api/movies",
    params(SearchParams),
    responses((status = 200, description = "Matching movies", body = MovieListResponse)),
    tag = "reviews"
)]
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<MovieListResponse>> {
    let movies = state.service.search_movies(params.q.as_deref()).await?;
    let count = movies.len();
    Ok(Json(MovieListResponse { movies, count }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up")),
    tag = "reviews"
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}
