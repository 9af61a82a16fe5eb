use super::domain::{
    CourseId, CourseOffering, Enrollment, EnrollmentId, Payment, StudentId,
};

/// Storage abstraction for course offerings.
pub trait CourseRepository: Send + Sync {
    fn insert(&self, course: CourseOffering) -> Result<CourseOffering, RepositoryError>;
    fn update(&self, course: CourseOffering) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CourseId) -> Result<Option<CourseOffering>, RepositoryError>;
}

/// Storage abstraction for enrollment records.
///
/// The admission service is the only writer; implementations do not need to enforce the
/// one-active-enrollment rule themselves.
pub trait EnrollmentRepository: Send + Sync {
    fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError>;
    fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError>;
    /// The enrolled or waitlisted record for the pair, if any.
    fn find_active(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, RepositoryError>;
    fn for_course(&self, course_id: &CourseId) -> Result<Vec<Enrollment>, RepositoryError>;
}

/// Read/append access to payments. The core never modifies recorded payments.
pub trait PaymentRepository: Send + Sync {
    fn record(&self, payment: Payment) -> Result<Payment, RepositoryError>;
    fn for_enrollment(&self, id: &EnrollmentId) -> Result<Vec<Payment>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
