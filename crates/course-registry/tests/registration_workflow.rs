//! Integration specifications for course registration, waitlisting and promotion.
//!
//! Scenarios drive the public service facade and HTTP router only, starting from a CSV catalog
//! the way a term is opened in practice.

mod common {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use course_registry::catalog::CourseCatalogImporter;
    use course_registry::enrollment::{
        CourseId, CourseOffering, CourseRepository, Enrollment, EnrollmentId,
        EnrollmentRepository, EnrollmentService, Payment, PaymentRepository, RepositoryError,
        StudentId,
    };

    pub(super) const CATALOG: &str = "Course ID,Title,Semester,Capacity,Fee\n\
        SWIM-101,Beginner Swim,2025-FALL,2,\"$1,250.00\"\n\
        ART-200,Watercolor Basics,2025-FALL,1,80\n";

    pub(super) type Service = EnrollmentService<Courses, Enrollments, Payments>;

    pub(super) struct Fixture {
        pub(super) service: Arc<Service>,
        pub(super) enrollments: Arc<Enrollments>,
    }

    pub(super) fn fixture() -> Fixture {
        let enrollments = Arc::new(Enrollments::default());
        let service = Arc::new(EnrollmentService::new(
            Arc::new(Courses::default()),
            enrollments.clone(),
            Arc::new(Payments::default()),
        ));

        let catalog =
            CourseCatalogImporter::from_reader(Cursor::new(CATALOG)).expect("catalog parses");
        for course in catalog {
            service.open_course(course).expect("course opens");
        }

        Fixture {
            service,
            enrollments,
        }
    }

    pub(super) fn student(id: &str) -> StudentId {
        StudentId::new(id)
    }

    #[derive(Default)]
    pub(super) struct Courses {
        records: Mutex<HashMap<CourseId, CourseOffering>>,
    }

    impl CourseRepository for Courses {
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
            Ok(self
                .records
                .lock()
                .expect("course mutex poisoned")
                .get(id)
                .cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct Enrollments {
        records: Mutex<HashMap<EnrollmentId, Enrollment>>,
    }

    impl EnrollmentRepository for Enrollments {
        fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
            let mut guard = self.records.lock().expect("enrollment mutex poisoned");
            guard.insert(enrollment.enrollment_id.clone(), enrollment.clone());
            Ok(enrollment)
        }

        fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("enrollment mutex poisoned");
            guard.insert(enrollment.enrollment_id.clone(), enrollment);
            Ok(())
        }

        fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("enrollment mutex poisoned")
                .get(id)
                .cloned())
        }

        fn find_active(
            &self,
            student_id: &StudentId,
            course_id: &CourseId,
        ) -> Result<Option<Enrollment>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("enrollment mutex poisoned")
                .values()
                .find(|record| {
                    record.is_active()
                        && &record.student_id == student_id
                        && &record.course_id == course_id
                })
                .cloned())
        }

        fn for_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("enrollment mutex poisoned")
                .values()
                .filter(|record| &record.course_id == course_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct Payments {
        records: Mutex<Vec<Payment>>,
    }

    impl PaymentRepository for Payments {
        fn record(&self, payment: Payment) -> Result<Payment, RepositoryError> {
            self.records
                .lock()
                .expect("payment mutex poisoned")
                .push(payment.clone());
            Ok(payment)
        }

        fn for_enrollment(&self, id: &EnrollmentId) -> Result<Vec<Payment>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("payment mutex poisoned")
                .iter()
                .filter(|payment| payment.enrollment_id.as_ref() == Some(id))
                .cloned()
                .collect())
        }
    }
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use course_registry::enrollment::{
    enrollment_router, CourseId, EnrollmentRepository, EnrollmentType, Money, PaymentMethod,
    PaymentStatus, PaymentSubmission, PaymentType,
};
use tower::ServiceExt;

use common::*;

#[test]
fn term_opens_from_catalog_and_waitlist_drains_in_order() {
    let fixture = fixture();
    let swim = CourseId::new("SWIM-101");

    let capacity = fixture.service.course_capacity(&swim).expect("capacity");
    assert_eq!(capacity.title, "Beginner Swim");
    assert_eq!(capacity.max_capacity, 2);

    let roster: Vec<_> = ["ana", "ben", "cy", "dee"]
        .iter()
        .map(|who| {
            fixture
                .service
                .register_student(student(who), swim.clone())
                .expect("registration succeeds")
        })
        .collect();
    assert_eq!(roster[0].fee_amount, Money(125_000));
    assert_eq!(roster[1].enrollment_type, EnrollmentType::Enrolled);
    assert_eq!(roster[2].waitlist_position, Some(1));
    assert_eq!(roster[3].waitlist_position, Some(2));

    // Cy gives up their waitlist slot; Dee moves to the head.
    fixture
        .service
        .withdraw(&roster[2].enrollment_id)
        .expect("leave waitlist");
    let dee = fixture
        .enrollments
        .fetch(&roster[3].enrollment_id)
        .expect("fetch")
        .expect("present");
    assert_eq!(dee.waitlist_position, Some(1));

    let outcome = fixture
        .service
        .drop_enrollment(&roster[0].enrollment_id)
        .expect("drop");
    assert_eq!(outcome.promoted.len(), 1);
    assert_eq!(outcome.promoted[0].student_id, student("dee"));

    let capacity = fixture.service.course_capacity(&swim).expect("capacity");
    assert_eq!(capacity.current_enrollment, 2);
    assert_eq!(capacity.waitlist_length, 0);
    fixture.service.audit_course(&swim).expect("consistent");
}

#[test]
fn promoted_student_pays_off_their_fee() {
    let fixture = fixture();
    let art = CourseId::new("ART-200");

    let first = fixture
        .service
        .register_student(student("ana"), art.clone())
        .expect("register");
    let second = fixture
        .service
        .register_student(student("ben"), art.clone())
        .expect("register");
    fixture.service.withdraw(&first.enrollment_id).expect("withdraw");

    fixture
        .service
        .record_payment(PaymentSubmission {
            student_id: student("ben"),
            amount: Money(8_000),
            method: PaymentMethod::Check,
            payment_type: PaymentType::CourseFee,
            enrollment_id: Some(second.enrollment_id.clone()),
            paid_on: None,
        })
        .expect("payment recorded");

    let status = fixture
        .service
        .enrollment_status(&second.enrollment_id)
        .expect("status");
    assert_eq!(status.enrollment.enrollment_type, EnrollmentType::Enrolled);
    assert_eq!(status.fees.payment_status, PaymentStatus::Paid);
    assert_eq!(status.fees.balance_due, Money::ZERO);
}

#[tokio::test]
async fn capacity_route_reports_full_course() {
    let fixture = fixture();
    fixture
        .service
        .register_student(student("ana"), CourseId::new("ART-200"))
        .expect("register");

    let response = enrollment_router(fixture.service.clone())
        .oneshot(
            Request::get("/api/v1/courses/ART-200")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload["is_full"], serde_json::json!(true));
    assert_eq!(payload["available_spots"], serde_json::json!(0));
}
