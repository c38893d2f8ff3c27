use axum::{Router, routing::{delete, get}};

pub mod auth;
pub mod contact_requests;
pub mod employers;
pub mod fileuploads;
pub mod job_categories;
pub mod jobseekers;
pub mod payments;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/logout", delete(auth::logout))
        .route("/check_session", get(auth::check_session))
        .nest("/users", users::router())
        .nest("/jobseekers", jobseekers::router())
        .nest("/employers", employers::router())
        .nest("/payments", payments::router())
        .nest("/contact_requests", contact_requests::router())
        .nest("/fileuploads", fileuploads::router())
        .nest("/job_categories", job_categories::router())
}
