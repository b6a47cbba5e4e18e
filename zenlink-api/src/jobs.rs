use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/jobs/reclaim-expired", post(run_reclaim))
}

/// On-demand invocation of the reservation reclaimer, for cron wrappers
/// and operators. The outcome body is the same structured summary the
/// worker logs; a failed run answers 500 with that body, never an
/// unhandled fault.
async fn run_reclaim(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.reclaimer.run().await;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(outcome))
}
