pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::state::AppState;
use crate::submissions::handlers as submissions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Submission pipeline
        .route("/api/contact", post(submissions::handle_submit_contact))
        .route(
            "/api/testimonials",
            post(submissions::handle_submit_testimonial)
                .get(admin::handle_list_public_testimonials),
        )
        // Administrative state transitions
        .route("/api/contact/messages", get(admin::handle_list_messages))
        .route(
            "/api/contact/messages/:id/status",
            put(admin::handle_update_message_status),
        )
        .route(
            "/api/admin/testimonials",
            get(admin::handle_list_all_testimonials),
        )
        .route(
            "/api/admin/testimonials/:id/status",
            put(admin::handle_update_testimonial_approval),
        )
        .with_state(state)
}
