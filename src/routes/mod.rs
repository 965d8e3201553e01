use axum::{
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

mod flags;
mod health;

pub use health::health;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let flag_router = Router::new()
        .route("/", get(flags::routes::list).post(flags::routes::create))
        .route(
            "/{flag_key}",
            get(flags::routes::get)
                .patch(flags::routes::update_enabled)
                .delete(flags::routes::delete),
        )
        .route("/{flag_key}/evaluate", get(flags::routes::evaluate));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/flags", flag_router)
        .layer(CorsLayer::permissive())
}

async fn root() -> &'static str {
    "Feature flag service"
}
