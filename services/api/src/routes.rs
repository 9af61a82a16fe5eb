use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use course_registry::catalog::CourseCatalogImporter;
use course_registry::enrollment::{
    enrollment_router, CourseId, CourseOffering, CourseRepository, EnrollmentRepository,
    EnrollmentService, PaymentRepository,
};
use course_registry::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogImportRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogImportResponse {
    pub(crate) opened: Vec<CourseOffering>,
    pub(crate) skipped: Vec<SkippedCourse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SkippedCourse {
    pub(crate) course_id: CourseId,
    pub(crate) reason: String,
}

pub(crate) fn with_enrollment_routes<C, E, P>(service: Arc<EnrollmentService<C, E, P>>) -> Router
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    let catalog = Router::new()
        .route(
            "/api/v1/catalog/import",
            post(catalog_import_endpoint::<C, E, P>),
        )
        .with_state(service.clone());

    enrollment_router(service)
        .merge(catalog)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Opens every course in a CSV catalog. Courses that already exist are reported, not fatal.
pub(crate) async fn catalog_import_endpoint<C, E, P>(
    State(service): State<Arc<EnrollmentService<C, E, P>>>,
    Json(payload): Json<CatalogImportRequest>,
) -> Result<(StatusCode, Json<CatalogImportResponse>), AppError>
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    let courses = CourseCatalogImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;
    let response = open_catalog(&service, courses);

    info!(
        opened = response.opened.len(),
        skipped = response.skipped.len(),
        "catalog imported"
    );
    Ok((StatusCode::OK, Json(response)))
}

pub(crate) fn open_catalog<C, E, P>(
    service: &EnrollmentService<C, E, P>,
    courses: Vec<CourseOffering>,
) -> CatalogImportResponse
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    let mut response = CatalogImportResponse {
        opened: Vec::new(),
        skipped: Vec::new(),
    };
    for course in courses {
        let course_id = course.course_id.clone();
        match service.open_course(course) {
            Ok(opened) => response.opened.push(opened),
            Err(err) => response.skipped.push(SkippedCourse {
                course_id,
                reason: err.to_string(),
            }),
        }
    }
    response
}
