//! JSON API
//!
//! Generation, local summaries and saved form values. Every failure leaves
//! through [`ApiError`], so bodies share one envelope.

mod error;
mod letters;
mod session;


pub use error::ApiError;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::middleware::page_rate_limit;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    // Generation endpoints are admitted by the service under the generate class.
    let generation = Router::new()
        .route("/generate/:kind", post(letters::generate))
        .route("/summary/:kind", post(letters::summarize));

    let reads = Router::new()
        .route("/session/:kind", get(session::saved_fields))
        .route_layer(middleware::from_fn_with_state(state, page_rate_limit));

    generation.merge(reads)
}
