use crate::{
    routes::{
        index::{get_health_check, method_not_allowed, not_found},
        students::{delete_student, get_students, post_student, put_student},
    },
    state::GatewayState,
};
use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod index;
pub mod students;

/// Any origin may call any route.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(get_health_check))
        .route("/students", get(get_students).post(post_student))
        .route("/students/{id}", put(put_student).delete(delete_student))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
