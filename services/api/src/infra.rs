use course_registry::config::AdmissionConfig;
use course_registry::enrollment::{
    CourseId, CourseOffering, CourseRepository, Enrollment, EnrollmentId, EnrollmentRepository,
    EnrollmentService, Payment, PaymentRepository, RepositoryError, StudentId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryEnrollmentService = EnrollmentService<
    InMemoryCourseRepository,
    InMemoryEnrollmentRepository,
    InMemoryPaymentRepository,
>;

/// Service wired to fresh in-memory stores.
pub(crate) fn in_memory_service(config: AdmissionConfig) -> InMemoryEnrollmentService {
    EnrollmentService::with_config(
        Arc::new(InMemoryCourseRepository::default()),
        Arc::new(InMemoryEnrollmentRepository::default()),
        Arc::new(InMemoryPaymentRepository::default()),
        config,
    )
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCourseRepository {
    records: Arc<RwLock<HashMap<CourseId, CourseOffering>>>,
}

impl CourseRepository for InMemoryCourseRepository {
    fn insert(&self, course: CourseOffering) -> Result<CourseOffering, RepositoryError> {
        let mut guard = self.records.write();
        if guard.contains_key(&course.course_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(course.course_id.clone(), course.clone());
        Ok(course)
    }

    fn update(&self, course: CourseOffering) -> Result<(), RepositoryError> {
        let mut guard = self.records.write();
        match guard.get_mut(&course.course_id) {
            Some(existing) => {
                *existing = course;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &CourseId) -> Result<Option<CourseOffering>, RepositoryError> {
        Ok(self.records.read().get(id).cloned())
    }
}

/// Enrollment records with a secondary index by course.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEnrollmentRepository {
    inner: Arc<RwLock<EnrollmentTables>>,
}

#[derive(Default)]
struct EnrollmentTables {
    records: HashMap<EnrollmentId, Enrollment>,
    by_course: HashMap<CourseId, Vec<EnrollmentId>>,
}

impl EnrollmentRepository for InMemoryEnrollmentRepository {
    fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
        let mut tables = self.inner.write();
        if tables.records.contains_key(&enrollment.enrollment_id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .by_course
            .entry(enrollment.course_id.clone())
            .or_default()
            .push(enrollment.enrollment_id.clone());
        tables
            .records
            .insert(enrollment.enrollment_id.clone(), enrollment.clone());
        Ok(enrollment)
    }

    fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError> {
        let mut tables = self.inner.write();
        match tables.records.get_mut(&enrollment.enrollment_id) {
            Some(existing) if existing.course_id == enrollment.course_id => {
                *existing = enrollment;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Unavailable(
                "enrollment course cannot change".to_string(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
        Ok(self.inner.read().records.get(id).cloned())
    }

    fn find_active(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, RepositoryError> {
        let tables = self.inner.read();
        Ok(tables
            .by_course
            .get(course_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.records.get(id))
            .find(|record| record.is_active() && &record.student_id == student_id)
            .cloned())
    }

    fn for_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
        let tables = self.inner.read();
        Ok(tables
            .by_course
            .get(course_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.records.get(id).cloned())
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentRepository {
    records: Arc<RwLock<Vec<Payment>>>,
}

impl PaymentRepository for InMemoryPaymentRepository {
    fn record(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        let mut guard = self.records.write();
        if guard
            .iter()
            .any(|existing| existing.payment_id == payment.payment_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(payment.clone());
        Ok(payment)
    }

    fn for_enrollment(&self, id: &EnrollmentId) -> Result<Vec<Payment>, RepositoryError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|payment| payment.enrollment_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }
}
