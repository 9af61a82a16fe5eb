//! Enrollment admission, waitlist management, and fee reconciliation.
//!
//! Seat-affecting operations for a course are serialized behind that course's exclusion
//! scope; different courses never contend with each other.

pub mod domain;
pub mod ledger;
pub mod reconciliation;
pub mod repository;
pub mod router;
pub mod service;
pub mod waitlist;

#[cfg(test)]
mod tests;

pub use domain::{
    CourseId, CourseOffering, Enrollment, EnrollmentId, EnrollmentType, Money, Payment,
    PaymentId, PaymentMethod, PaymentSubmission, PaymentType, RegistrationRequest, SemesterId,
    StudentId,
};
pub use ledger::{CapacityError, SeatLedger};
pub use reconciliation::{FeeReconciliation, PaymentStatus};
pub use repository::{CourseRepository, EnrollmentRepository, PaymentRepository, RepositoryError};
pub use router::{enrollment_router, error_response, error_status};
pub use service::{
    CapacityChange, CourseCapacityView, EnrollmentService, EnrollmentServiceError,
    EnrollmentStatusView, WaitlistEntry, WithdrawalOutcome,
};
pub use waitlist::{PositionChange, Waitlist};
