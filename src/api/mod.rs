use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::scoreboard::{ScoreboardEntry, ScoreboardService};

pub struct AppState {
    pub scoreboard: Arc<ScoreboardService>,
    pub min_date: DateTime<Utc>,
}

/// Build the Axum router for the scoreboard API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scoreboard", get(scoreboard_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /scoreboard
///
/// Always 200: upstream trouble shows up as missing or zero rows.
async fn scoreboard_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ScoreboardEntry>> {
    info!("/scoreboard request received");
    let entries = state.scoreboard.get_scoreboard(state.min_date).await;
    info!("/scoreboard response sent ({} entries)", entries.len());
    Json(entries)
}
