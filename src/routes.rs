use super::{controllers, models};
use axum::routing::{get, post, Router};

#[rustfmt::skip]
pub fn get_routes() -> Router<models::AppState> {
    Router::new()
        .route("/", get(controllers::root))
        .route("/", post(controllers::submit_property))
        .route("/map", get(controllers::map_page))
        .route("/static/map.js", get(controllers::get_map_js))
        .route("/api/property", get(controllers::get_property_api))
        .route("/api/notes", post(controllers::create_note_api))
}
