use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/widgets/:feed", get(handlers::widget))
        .route("/reservasi", post(handlers::submit_reservation))
        .route("/preferences", put(handlers::update_preferences))
        .with_state(state)
}
