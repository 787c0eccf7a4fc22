use anyhow::Context;
use std::env;

/// Runtime configuration, loaded once at startup from environment variables
/// (a `.env` file is honored via dotenv). Everything except `DATABASE_URL`
/// has a local-development default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Prediction endpoint of the sentiment sidecar.
    pub classifier_url: String,
    /// Request timeout for classifier calls, distinct from any client-side
    /// retry policy (there is none inside the gateway).
    pub classifier_timeout_secs: u64,
    /// Model identifier reported when the sidecar omits one.
    pub model_id: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("PORT must be a valid u16")?;

        let classifier_url = env::var("SENTIMENT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/predict".into());
        let classifier_timeout_secs = env::var("CLASSIFIER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .context("CLASSIFIER_TIMEOUT_SECS must be a valid u64")?;
        let model_id =
            env::var("SENTIMENT_MODEL_ID").unwrap_or_else(|_| "imdb-tfidf-logreg".into());

        Ok(Self {
            database_url,
            host,
            port,
            classifier_url,
            classifier_timeout_secs,
            model_id,
        })
    }
}
