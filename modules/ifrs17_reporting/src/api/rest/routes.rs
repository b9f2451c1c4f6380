//! Route registration

use super::{auth, handlers, openapi};
use crate::domain::{Authenticator, Service};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full router: public login routes plus session-guarded operations
pub fn register_routes(service: Arc<Service>, auth: Arc<Authenticator>) -> Router {
    let max_upload_bytes = service.config().max_upload_bytes;

    let protected = Router::new()
        .route("/dashboard", get(handlers::dashboard))
        // Institutions
        .route(
            "/institutions",
            get(handlers::list_institutions).post(handlers::create_institution),
        )
        .route("/institutions/{id}", get(handlers::get_institution))
        .route("/institutions/{id}/edit", post(handlers::update_institution))
        .route("/institutions/{id}/delete", post(handlers::delete_institution))
        .route("/institutions/{id}/data", get(handlers::institution_data))
        .route(
            "/institutions/{id}/validate",
            post(handlers::validate_institution_data),
        )
        .route("/institutions/{id}/metrics", post(handlers::upsert_metric))
        .route(
            "/institutions/{id}/alerts",
            get(handlers::list_alerts).post(handlers::raise_alert),
        )
        .route("/alerts/{id}/resolve", post(handlers::resolve_alert))
        // Submissions
        .route(
            "/ifrs17-submissions",
            get(handlers::list_submissions).post(handlers::create_submission),
        )
        .route("/ifrs17-submissions/{id}", get(handlers::get_submission))
        .route(
            "/ifrs17-submissions/{id}/edit",
            post(handlers::update_submission),
        )
        .route(
            "/upload-ifrs17-data",
            post(handlers::upload_submission).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/parse-file-data/{submission_id}",
            get(handlers::parse_file_data),
        )
        // Data quality
        .route("/data-quality-review", get(handlers::data_quality_review))
        .route(
            "/reporting-period/{year}/{month}",
            get(handlers::reporting_period),
        )
        .route(
            "/run-data-quality-checks",
            post(handlers::run_data_quality_checks),
        )
        .route_layer(middleware::from_fn_with_state(
            auth.clone(),
            auth::require_session,
        ));

    let public = Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    public
        .merge(protected)
        .layer(Extension(service))
        .layer(Extension(auth))
        .layer(TraceLayer::new_for_http())
}
