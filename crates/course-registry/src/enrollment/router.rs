use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    CourseId, CourseOffering, Enrollment, EnrollmentId, EnrollmentType, PaymentSubmission,
    RegistrationRequest, StudentId,
};
use super::repository::{
    CourseRepository, EnrollmentRepository, PaymentRepository, RepositoryError,
};
use super::service::{EnrollmentService, EnrollmentServiceError};

type SharedService<C, E, P> = Arc<EnrollmentService<C, E, P>>;

/// Router builder exposing course, enrollment and payment endpoints.
pub fn enrollment_router<C, E, P>(service: SharedService<C, E, P>) -> Router
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    Router::new()
        .route("/api/v1/courses", post(open_course_handler::<C, E, P>))
        .route(
            "/api/v1/courses/:course_id",
            get(course_capacity_handler::<C, E, P>),
        )
        .route(
            "/api/v1/courses/:course_id/capacity",
            put(resize_capacity_handler::<C, E, P>),
        )
        .route(
            "/api/v1/courses/:course_id/waitlist",
            get(waitlist_handler::<C, E, P>),
        )
        .route("/api/v1/enrollments", post(register_handler::<C, E, P>))
        .route(
            "/api/v1/enrollments/batch",
            post(register_batch_handler::<C, E, P>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id",
            get(enrollment_status_handler::<C, E, P>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/withdraw",
            post(withdraw_handler::<C, E, P>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/drop",
            post(drop_handler::<C, E, P>),
        )
        .route("/api/v1/payments", post(record_payment_handler::<C, E, P>))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ResizeCapacityRequest {
    pub(crate) max_capacity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRegistrationRequest {
    pub(crate) registrations: Vec<RegistrationRequest>,
}

/// Per-entry result of a batch registration.
#[derive(Debug, Serialize)]
pub(crate) struct BatchRegistrationEntry {
    pub(crate) student_id: StudentId,
    pub(crate) course_id: CourseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) enrollment: Option<Enrollment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

/// HTTP status for a service error. Invariant violations surface as internal errors.
pub fn error_status(error: &EnrollmentServiceError) -> StatusCode {
    match error {
        EnrollmentServiceError::DuplicateEnrollment { .. }
        | EnrollmentServiceError::AlreadyTerminal { .. }
        | EnrollmentServiceError::CourseExists(_) => StatusCode::CONFLICT,
        EnrollmentServiceError::CourseNotFound(_)
        | EnrollmentServiceError::EnrollmentNotFound(_)
        | EnrollmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EnrollmentServiceError::Capacity(_) | EnrollmentServiceError::InvalidPayment(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EnrollmentServiceError::InvariantViolation { .. }
        | EnrollmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body for a service error. Internal failures are logged, never echoed to clients.
pub fn error_response(error: EnrollmentServiceError) -> Response {
    let status = error_status(&error);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "internal enrollment error".to_string()
    } else {
        error.to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn open_course_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Json(course): Json<CourseOffering>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.open_course(course) {
        Ok(course) => (StatusCode::CREATED, Json(course)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn course_capacity_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(course_id): Path<String>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.course_capacity(&CourseId(course_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resize_capacity_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(course_id): Path<String>,
    Json(request): Json<ResizeCapacityRequest>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.resize_capacity(&CourseId(course_id), request.max_capacity) {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn waitlist_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(course_id): Path<String>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    let course_id = CourseId(course_id);
    match service.get_waitlist(&course_id) {
        Ok(entries) => {
            let payload = json!({
                "course_id": course_id,
                "waitlist": entries,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Json(request): Json<RegistrationRequest>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.register_student(request.student_id, request.course_id) {
        Ok(enrollment) => {
            let status = match enrollment.enrollment_type {
                EnrollmentType::Waitlisted => StatusCode::ACCEPTED,
                _ => StatusCode::CREATED,
            };
            (status, Json(enrollment)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_batch_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Json(request): Json<BatchRegistrationRequest>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    let results: Vec<BatchRegistrationEntry> = service
        .register_batch(request.registrations)
        .into_iter()
        .map(|(request, outcome)| {
            let (enrollment, error) = match outcome {
                Ok(enrollment) => (Some(enrollment), None),
                Err(error) => (None, Some(error.to_string())),
            };
            BatchRegistrationEntry {
                student_id: request.student_id,
                course_id: request.course_id,
                enrollment,
                error,
            }
        })
        .collect();

    (StatusCode::OK, Json(json!({ "results": results }))).into_response()
}

pub(crate) async fn enrollment_status_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(enrollment_id): Path<String>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.enrollment_status(&EnrollmentId(enrollment_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(enrollment_id): Path<String>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.withdraw(&EnrollmentId(enrollment_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn drop_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Path(enrollment_id): Path<String>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.drop_enrollment(&EnrollmentId(enrollment_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_payment_handler<C, E, P>(
    State(service): State<SharedService<C, E, P>>,
    Json(submission): Json<PaymentSubmission>,
) -> Response
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    match service.record_payment(submission) {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}
