use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::AdmissionConfig;
use crate::enrollment::domain::{
    CourseId, CourseOffering, Enrollment, EnrollmentId, EnrollmentType, Money, Payment,
    SemesterId, StudentId,
};
use crate::enrollment::repository::{
    CourseRepository, EnrollmentRepository, PaymentRepository, RepositoryError,
};
use crate::enrollment::{enrollment_router, EnrollmentService};

pub(super) type TestService = EnrollmentService<MemoryCourses, MemoryEnrollments, MemoryPayments>;

pub(super) fn course(id: &str, max_capacity: u32) -> CourseOffering {
    CourseOffering {
        course_id: CourseId::new(id),
        title: format!("{id} section"),
        semester_id: SemesterId::new("2025-FALL"),
        max_capacity,
        fee: Money(15_000),
    }
}

pub(super) fn student(id: &str) -> StudentId {
    StudentId::new(id)
}

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) courses: Arc<MemoryCourses>,
    pub(super) enrollments: Arc<MemoryEnrollments>,
    pub(super) payments: Arc<MemoryPayments>,
}

pub(super) fn harness() -> Harness {
    harness_with_config(AdmissionConfig::default())
}

pub(super) fn harness_with_config(config: AdmissionConfig) -> Harness {
    let courses = Arc::new(MemoryCourses::default());
    let enrollments = Arc::new(MemoryEnrollments::default());
    let payments = Arc::new(MemoryPayments::default());
    let service = Arc::new(EnrollmentService::with_config(
        courses.clone(),
        enrollments.clone(),
        payments.clone(),
        config,
    ));
    Harness {
        service,
        courses,
        enrollments,
        payments,
    }
}

/// Harness with one open course of the given capacity.
pub(super) fn harness_with_course(id: &str, max_capacity: u32) -> (Harness, CourseId) {
    let harness = harness();
    let opened = harness
        .service
        .open_course(course(id, max_capacity))
        .expect("course opens");
    (harness, opened.course_id)
}

/// Asserts stored waitlist positions are exactly 1..=n and returns ids in position order.
pub(super) fn assert_contiguous_waitlist(
    enrollments: &MemoryEnrollments,
    course_id: &CourseId,
) -> Vec<EnrollmentId> {
    let mut waitlisted: Vec<(u32, EnrollmentId)> = enrollments
        .for_course(course_id)
        .expect("list course")
        .into_iter()
        .filter(|record| record.enrollment_type == EnrollmentType::Waitlisted)
        .map(|record| {
            (
                record.waitlist_position.expect("waitlisted has position"),
                record.enrollment_id,
            )
        })
        .collect();
    waitlisted.sort();
    let positions: Vec<u32> = waitlisted.iter().map(|(position, _)| *position).collect();
    let expected: Vec<u32> = (1..=waitlisted.len() as u32).collect();
    assert_eq!(positions, expected, "waitlist positions must be contiguous");
    waitlisted.into_iter().map(|(_, id)| id).collect()
}

pub(super) fn stored(enrollments: &MemoryEnrollments, id: &EnrollmentId) -> Enrollment {
    enrollments
        .fetch(id)
        .expect("fetch succeeds")
        .expect("record present")
}

#[derive(Default)]
pub(super) struct MemoryCourses {
    records: Mutex<HashMap<CourseId, CourseOffering>>,
}

impl CourseRepository for MemoryCourses {
    fn insert(&self, course: CourseOffering) -> Result<CourseOffering, RepositoryError> {
        let mut guard = self.records.lock().expect("course mutex poisoned");
        if guard.contains_key(&course.course_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(course.course_id.clone(), course.clone());
        Ok(course)
    }

    fn update(&self, course: CourseOffering) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("course mutex poisoned");
        guard.insert(course.course_id.clone(), course);
        Ok(())
    }

    fn fetch(&self, id: &CourseId) -> Result<Option<CourseOffering>, RepositoryError> {
        let guard = self.records.lock().expect("course mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Enrollment store whose inserts and updates can be switched to fail.
#[derive(Default)]
pub(super) struct MemoryEnrollments {
    records: Mutex<HashMap<EnrollmentId, Enrollment>>,
    fail_inserts: AtomicBool,
    update_budget: Mutex<Option<usize>>,
}

impl MemoryEnrollments {
    /// Writes a record directly, bypassing the admission service.
    pub(super) fn seed(&self, enrollment: Enrollment) {
        self.records
            .lock()
            .expect("enrollment mutex poisoned")
            .insert(enrollment.enrollment_id.clone(), enrollment);
    }

    pub(super) fn fail_next_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Lets `allowed` more updates succeed and fails the rest. `None` lifts the limit.
    pub(super) fn limit_updates(&self, allowed: Option<usize>) {
        *self.update_budget.lock().expect("budget mutex poisoned") = allowed;
    }
}

impl EnrollmentRepository for MemoryEnrollments {
    fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        let mut guard = self.records.lock().expect("enrollment mutex poisoned");
        if guard.contains_key(&enrollment.enrollment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(enrollment.enrollment_id.clone(), enrollment.clone());
        Ok(enrollment)
    }

    fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError> {
        if let Some(remaining) = self
            .update_budget
            .lock()
            .expect("budget mutex poisoned")
            .as_mut()
        {
            if *remaining == 0 {
                return Err(RepositoryError::Unavailable("database offline".to_string()));
            }
            *remaining -= 1;
        }
        let mut guard = self.records.lock().expect("enrollment mutex poisoned");
        guard.insert(enrollment.enrollment_id.clone(), enrollment);
        Ok(())
    }

    fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
        let guard = self.records.lock().expect("enrollment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_active(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, RepositoryError> {
        let guard = self.records.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .values()
            .find(|record| {
                record.is_active()
                    && &record.student_id == student_id
                    && &record.course_id == course_id
            })
            .cloned())
    }

    fn for_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
        let guard = self.records.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.course_id == course_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryPayments {
    records: Mutex<Vec<Payment>>,
}

impl PaymentRepository for MemoryPayments {
    fn record(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        self.records
            .lock()
            .expect("payment mutex poisoned")
            .push(payment.clone());
        Ok(payment)
    }

    fn for_enrollment(&self, id: &EnrollmentId) -> Result<Vec<Payment>, RepositoryError> {
        let guard = self.records.lock().expect("payment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|payment| payment.enrollment_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }
}

pub(super) fn router(harness: &Harness) -> axum::Router {
    enrollment_router(harness.service.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
