use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::domain::{
    CourseId, CourseOffering, Enrollment, EnrollmentId, EnrollmentType, Payment, PaymentId,
    PaymentSubmission, RegistrationRequest, SemesterId, StudentId,
};
use super::ledger::{CapacityError, SeatLedger};
use super::reconciliation::FeeReconciliation;
use super::repository::{
    CourseRepository, EnrollmentRepository, PaymentRepository, RepositoryError,
};
use super::waitlist::{PositionChange, Waitlist};
use crate::config::AdmissionConfig;

static ENROLLMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PAYMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_enrollment_id() -> EnrollmentId {
    let id = ENROLLMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EnrollmentId(format!("enr-{id:06}"))
}

fn next_payment_id() -> PaymentId {
    let id = PAYMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PaymentId(format!("pay-{id:06}"))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Seat ledger, waitlist and course snapshot for one course. Always accessed through the
/// course's mutex, which is the exclusion scope for every seat-affecting operation.
struct CourseSeating {
    course: CourseOffering,
    ledger: SeatLedger,
    waitlist: Waitlist,
}

impl CourseSeating {
    fn capacity_view(&self) -> CourseCapacityView {
        CourseCapacityView {
            course_id: self.course.course_id.clone(),
            title: self.course.title.clone(),
            semester_id: self.course.semester_id.clone(),
            max_capacity: self.ledger.max_capacity(),
            current_enrollment: self.ledger.current_enrollment(),
            available_spots: self.ledger.available_spots(),
            is_full: self.ledger.is_full(),
            waitlist_length: self.waitlist.len(),
        }
    }
}

type SeatingHandle = Arc<Mutex<CourseSeating>>;

/// Admission controller composing the capacity ledger, waitlist queue, promotion trigger and
/// the storage collaborators.
pub struct EnrollmentService<C, E, P> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    payments: Arc<P>,
    seating: RwLock<HashMap<CourseId, SeatingHandle>>,
    config: AdmissionConfig,
}

impl<C, E, P> EnrollmentService<C, E, P>
where
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PaymentRepository + 'static,
{
    pub fn new(courses: Arc<C>, enrollments: Arc<E>, payments: Arc<P>) -> Self {
        Self::with_config(courses, enrollments, payments, AdmissionConfig::default())
    }

    pub fn with_config(
        courses: Arc<C>,
        enrollments: Arc<E>,
        payments: Arc<P>,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            courses,
            enrollments,
            payments,
            seating: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new course offering with an empty roster.
    pub fn open_course(
        &self,
        course: CourseOffering,
    ) -> Result<CourseOffering, EnrollmentServiceError> {
        let ledger =
            SeatLedger::new(course.max_capacity).map_err(EnrollmentServiceError::Capacity)?;
        let course_id = course.course_id.clone();

        let stored = self.courses.insert(course).map_err(|err| match err {
            RepositoryError::Conflict => EnrollmentServiceError::CourseExists(course_id.clone()),
            other => other.into(),
        })?;

        self.seating
            .write()
            .entry(course_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(CourseSeating {
                    course: stored.clone(),
                    ledger,
                    waitlist: Waitlist::default(),
                }))
            });

        info!(course_id = %course_id, max_capacity = stored.max_capacity, "course opened");
        Ok(stored)
    }

    /// Admit the student when a seat is free and nobody is waiting for it, otherwise append them
    /// to the waitlist. Waitlisted students are promoted into free seats before the newcomer.
    pub fn register_student(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        let handle = self.seating(&course_id)?;
        let mut seating = handle.lock();

        if let Some(existing) = self.enrollments.find_active(&student_id, &course_id)? {
            return Err(EnrollmentServiceError::DuplicateEnrollment {
                student_id,
                course_id,
                enrollment_id: existing.enrollment_id,
            });
        }

        let mut enrollment = Enrollment {
            enrollment_id: next_enrollment_id(),
            student_id,
            course_id: course_id.clone(),
            semester_id: seating.course.semester_id.clone(),
            enrollment_type: EnrollmentType::Enrolled,
            waitlist_position: None,
            enrollment_date: today(),
            fee_amount: seating.course.fee,
        };

        // Seats left free by a capped or failed promotion belong to the waitlist first.
        if !seating.waitlist.is_empty() {
            self.promote(&mut seating)?;
        }
        if !seating.waitlist.is_empty() || !seating.ledger.try_reserve_seat() {
            let position = seating.waitlist.enqueue(enrollment.enrollment_id.clone());
            enrollment.enrollment_type = EnrollmentType::Waitlisted;
            enrollment.waitlist_position = Some(position);
        }

        let stored = match self.enrollments.insert(enrollment.clone()) {
            Ok(stored) => stored,
            Err(err) => {
                self.rollback_registration(&mut seating, &enrollment)?;
                return Err(err.into());
            }
        };

        match stored.waitlist_position {
            Some(position) => info!(
                course_id = %course_id,
                enrollment_id = %stored.enrollment_id,
                student_id = %stored.student_id,
                position,
                "course full, registration waitlisted"
            ),
            None => info!(
                course_id = %course_id,
                enrollment_id = %stored.enrollment_id,
                student_id = %stored.student_id,
                current_enrollment = seating.ledger.current_enrollment(),
                "registration admitted"
            ),
        }

        Ok(stored)
    }

    /// Process several registrations independently. A failure never undoes its siblings.
    pub fn register_batch(
        &self,
        requests: Vec<RegistrationRequest>,
    ) -> Vec<(
        RegistrationRequest,
        Result<Enrollment, EnrollmentServiceError>,
    )> {
        requests
            .into_iter()
            .map(|request| {
                let outcome =
                    self.register_student(request.student_id.clone(), request.course_id.clone());
                if let Err(err) = &outcome {
                    debug!(
                        student_id = %request.student_id,
                        course_id = %request.course_id,
                        error = %err,
                        "batch registration entry failed"
                    );
                }
                (request, outcome)
            })
            .collect()
    }

    /// Voluntary withdrawal by the student.
    ///
    /// The terminal record is committed before the freed seat is handed to the waitlist. When the
    /// follow-up promotion or renumbering fails, the withdrawal still stands and the outcome is
    /// returned with `follow_up_deferred` set; the next trigger or `audit_course` picks it up.
    pub fn withdraw(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<WithdrawalOutcome, EnrollmentServiceError> {
        self.leave(enrollment_id, EnrollmentType::Withdrawn)
    }

    /// Administrative removal from the course. Commits in the same order as [`Self::withdraw`].
    pub fn drop_enrollment(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<WithdrawalOutcome, EnrollmentServiceError> {
        self.leave(enrollment_id, EnrollmentType::Dropped)
    }

    /// Change a course's seat limit, promoting waitlisted students into any new seats.
    pub fn resize_capacity(
        &self,
        course_id: &CourseId,
        max_capacity: u32,
    ) -> Result<CapacityChange, EnrollmentServiceError> {
        let handle = self.seating(course_id)?;
        let mut seating = handle.lock();

        let previous_capacity = seating
            .ledger
            .resize(max_capacity)
            .map_err(EnrollmentServiceError::Capacity)?;

        let mut course = seating.course.clone();
        course.max_capacity = max_capacity;
        if let Err(err) = self.courses.update(course.clone()) {
            seating
                .ledger
                .resize(previous_capacity)
                .map_err(|source| invariant(course_id, source.to_string()))?;
            return Err(err.into());
        }
        seating.course = course;

        info!(
            course_id = %course_id,
            previous_capacity,
            max_capacity,
            "course capacity resized"
        );

        let promoted = if max_capacity > previous_capacity {
            self.promote(&mut seating)?
        } else {
            Vec::new()
        };

        Ok(CapacityChange {
            previous_capacity,
            capacity: seating.capacity_view(),
            promoted,
        })
    }

    /// Waitlisted enrollments for the course, head first.
    pub fn get_waitlist(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<WaitlistEntry>, EnrollmentServiceError> {
        let handle = self.seating(course_id)?;
        let seating = handle.lock();

        seating
            .waitlist
            .positions()
            .map(|(position, enrollment_id)| -> Result<_, EnrollmentServiceError> {
                let enrollment = self.enrollments.fetch(enrollment_id)?.ok_or_else(|| {
                    invariant(
                        course_id,
                        format!("waitlisted enrollment {enrollment_id} has no stored record"),
                    )
                })?;
                Ok(WaitlistEntry {
                    position,
                    enrollment_id: enrollment.enrollment_id,
                    student_id: enrollment.student_id,
                    enrollment_date: enrollment.enrollment_date,
                })
            })
            .collect()
    }

    pub fn course_capacity(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseCapacityView, EnrollmentServiceError> {
        let handle = self.seating(course_id)?;
        let seating = handle.lock();
        Ok(seating.capacity_view())
    }

    /// Enrollment state joined with its fee reconciliation.
    pub fn enrollment_status(
        &self,
        enrollment_id: &EnrollmentId,
    ) -> Result<EnrollmentStatusView, EnrollmentServiceError> {
        let enrollment = self
            .enrollments
            .fetch(enrollment_id)?
            .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound(enrollment_id.clone()))?;
        let payments = self.payments.for_enrollment(enrollment_id)?;
        let fees = FeeReconciliation::from_payments(enrollment.fee_amount, &payments);

        Ok(EnrollmentStatusView { enrollment, fees })
    }

    pub fn record_payment(
        &self,
        submission: PaymentSubmission,
    ) -> Result<Payment, EnrollmentServiceError> {
        if submission.amount.is_zero() {
            return Err(EnrollmentServiceError::InvalidPayment(
                "amount must be greater than zero".to_string(),
            ));
        }

        if let Some(enrollment_id) = &submission.enrollment_id {
            let enrollment = self
                .enrollments
                .fetch(enrollment_id)?
                .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound(enrollment_id.clone()))?;
            if enrollment.student_id != submission.student_id {
                return Err(EnrollmentServiceError::InvalidPayment(format!(
                    "enrollment {enrollment_id} belongs to a different student"
                )));
            }
        }

        let payment = Payment {
            payment_id: next_payment_id(),
            student_id: submission.student_id,
            amount: submission.amount,
            method: submission.method,
            payment_type: submission.payment_type,
            enrollment_id: submission.enrollment_id,
            paid_on: submission.paid_on.unwrap_or_else(today),
        };
        let stored = self.payments.record(payment)?;

        debug!(
            payment_id = %stored.payment_id,
            amount = %stored.amount,
            "payment recorded"
        );
        Ok(stored)
    }

    /// Cross-checks the in-memory ledger and waitlist against stored records.
    pub fn audit_course(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseCapacityView, EnrollmentServiceError> {
        let handle = self.seating(course_id)?;
        let seating = handle.lock();
        let records = self.enrollments.for_course(course_id)?;

        let enrolled = records
            .iter()
            .filter(|record| record.enrollment_type == EnrollmentType::Enrolled)
            .count();
        if enrolled != seating.ledger.current_enrollment() as usize {
            return Err(invariant(
                course_id,
                format!(
                    "ledger admits {} students but {enrolled} records are enrolled",
                    seating.ledger.current_enrollment()
                ),
            ));
        }
        if enrolled > seating.ledger.max_capacity() as usize {
            return Err(invariant(course_id, "course is oversold"));
        }

        let stored_order = ordered_waitlist(course_id, &records)?;
        let queued: Vec<&EnrollmentId> = seating.waitlist.positions().map(|(_, id)| id).collect();
        if stored_order.iter().collect::<Vec<_>>() != queued {
            return Err(invariant(
                course_id,
                "stored waitlist positions disagree with the queue order",
            ));
        }

        Ok(seating.capacity_view())
    }

    fn leave(
        &self,
        enrollment_id: &EnrollmentId,
        final_state: EnrollmentType,
    ) -> Result<WithdrawalOutcome, EnrollmentServiceError> {
        let located = self
            .enrollments
            .fetch(enrollment_id)?
            .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound(enrollment_id.clone()))?;
        let course_id = located.course_id;
        let handle = self.seating(&course_id)?;
        let mut seating = handle.lock();

        // Re-read under the course lock: a promotion may have moved the record meanwhile.
        let mut enrollment = self
            .enrollments
            .fetch(enrollment_id)?
            .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound(enrollment_id.clone()))?;
        let previous_state = enrollment.enrollment_type;

        match previous_state {
            EnrollmentType::Dropped | EnrollmentType::Withdrawn => {
                Err(EnrollmentServiceError::AlreadyTerminal {
                    enrollment_id: enrollment_id.clone(),
                    state: previous_state,
                })
            }
            EnrollmentType::Enrolled => {
                enrollment.enrollment_type = final_state;
                enrollment.waitlist_position = None;
                self.enrollments.update(enrollment.clone())?;
                seating
                    .ledger
                    .release_seat()
                    .map_err(|source| invariant(&course_id, source.to_string()))?;

                info!(
                    course_id = %course_id,
                    enrollment_id = %enrollment_id,
                    state = %final_state,
                    current_enrollment = seating.ledger.current_enrollment(),
                    "seat released"
                );

                let (promoted, follow_up_deferred) = match self.promote(&mut seating) {
                    Ok(promoted) => (promoted, false),
                    Err(err) => {
                        warn!(
                            course_id = %course_id,
                            enrollment_id = %enrollment_id,
                            error = %err,
                            "withdrawal committed, promotion deferred"
                        );
                        (Vec::new(), true)
                    }
                };
                Ok(WithdrawalOutcome {
                    enrollment,
                    previous_state,
                    promoted,
                    follow_up_deferred,
                })
            }
            EnrollmentType::Waitlisted => {
                if seating.waitlist.position_of(enrollment_id).is_none() {
                    return Err(invariant(
                        &course_id,
                        format!("waitlisted enrollment {enrollment_id} is missing from the queue"),
                    ));
                }

                enrollment.enrollment_type = final_state;
                enrollment.waitlist_position = None;
                self.enrollments.update(enrollment.clone())?;

                let changes = seating.waitlist.remove(enrollment_id).unwrap_or_default();
                let follow_up_deferred = match self.apply_positions(&course_id, &changes) {
                    Ok(()) => false,
                    Err(err) => {
                        warn!(
                            course_id = %course_id,
                            enrollment_id = %enrollment_id,
                            error = %err,
                            "withdrawal committed, waitlist renumbering deferred"
                        );
                        true
                    }
                };

                info!(
                    course_id = %course_id,
                    enrollment_id = %enrollment_id,
                    state = %final_state,
                    waitlist_length = seating.waitlist.len(),
                    "left waitlist"
                );

                Ok(WithdrawalOutcome {
                    enrollment,
                    previous_state,
                    promoted: Vec::new(),
                    follow_up_deferred,
                })
            }
        }
    }

    /// Moves waitlisted students into free seats, head first, until the course is full, the
    /// waitlist is empty, or the per-trigger cap is reached.
    fn promote(
        &self,
        seating: &mut CourseSeating,
    ) -> Result<Vec<Enrollment>, EnrollmentServiceError> {
        let course_id = seating.course.course_id.clone();
        let mut promoted = Vec::new();

        while !seating.ledger.is_full() {
            let Some(head) = seating.waitlist.peek_head().cloned() else {
                break;
            };
            if promoted.len() >= self.config.max_promotions_per_trigger {
                warn!(
                    course_id = %course_id,
                    promoted = promoted.len(),
                    remaining = seating.waitlist.len(),
                    available_spots = seating.ledger.available_spots(),
                    "promotion cap reached, deferring remaining waitlist"
                );
                break;
            }

            let mut enrollment = self.enrollments.fetch(&head)?.ok_or_else(|| {
                invariant(
                    &course_id,
                    format!("waitlist head {head} has no stored record"),
                )
            })?;
            if enrollment.enrollment_type != EnrollmentType::Waitlisted {
                return Err(invariant(
                    &course_id,
                    format!(
                        "waitlist head {head} is {} rather than waitlisted",
                        enrollment.enrollment_type
                    ),
                ));
            }
            if !seating.ledger.try_reserve_seat() {
                return Err(invariant(
                    &course_id,
                    format!("no seat available to promote {head} despite a freed seat"),
                ));
            }

            enrollment.enrollment_type = EnrollmentType::Enrolled;
            enrollment.waitlist_position = None;
            if let Err(err) = self.enrollments.update(enrollment.clone()) {
                seating
                    .ledger
                    .release_seat()
                    .map_err(|source| invariant(&course_id, source.to_string()))?;
                return Err(err.into());
            }

            let changes = match seating.waitlist.dequeue_head() {
                Some((_, changes)) => changes,
                None => return Err(invariant(&course_id, "waitlist emptied during promotion")),
            };
            self.apply_positions(&course_id, &changes)?;

            info!(
                course_id = %course_id,
                enrollment_id = %enrollment.enrollment_id,
                student_id = %enrollment.student_id,
                "promoted from waitlist"
            );
            promoted.push(enrollment);
        }

        Ok(promoted)
    }

    fn apply_positions(
        &self,
        course_id: &CourseId,
        changes: &[PositionChange],
    ) -> Result<(), EnrollmentServiceError> {
        for change in changes {
            let mut enrollment = self.enrollments.fetch(&change.enrollment_id)?.ok_or_else(|| {
                invariant(
                    course_id,
                    format!("queued enrollment {} has no stored record", change.enrollment_id),
                )
            })?;
            if enrollment.waitlist_position != Some(change.position) {
                enrollment.waitlist_position = Some(change.position);
                self.enrollments.update(enrollment)?;
            }
        }
        Ok(())
    }

    fn rollback_registration(
        &self,
        seating: &mut CourseSeating,
        enrollment: &Enrollment,
    ) -> Result<(), EnrollmentServiceError> {
        let course_id = &enrollment.course_id;
        match enrollment.enrollment_type {
            EnrollmentType::Waitlisted => {
                seating.waitlist.remove(&enrollment.enrollment_id);
                Ok(())
            }
            _ => seating
                .ledger
                .release_seat()
                .map_err(|source| invariant(course_id, source.to_string())),
        }
    }

    fn seating(&self, course_id: &CourseId) -> Result<SeatingHandle, EnrollmentServiceError> {
        if let Some(handle) = self.seating.read().get(course_id) {
            return Ok(Arc::clone(handle));
        }

        let hydrated = self.hydrate(course_id)?;
        let mut map = self.seating.write();
        let handle = map
            .entry(course_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(hydrated)));
        Ok(Arc::clone(handle))
    }

    /// Rebuilds a course's seat state from the stores the first time it is touched.
    fn hydrate(&self, course_id: &CourseId) -> Result<CourseSeating, EnrollmentServiceError> {
        let course = self
            .courses
            .fetch(course_id)?
            .ok_or_else(|| EnrollmentServiceError::CourseNotFound(course_id.clone()))?;
        let records = self.enrollments.for_course(course_id)?;

        let admitted = records
            .iter()
            .filter(|record| record.enrollment_type == EnrollmentType::Enrolled)
            .count();
        let admitted = u32::try_from(admitted)
            .map_err(|_| invariant(course_id, "admitted count exceeds u32"))?;
        let ledger = SeatLedger::hydrate(course.max_capacity, admitted)
            .map_err(|source| invariant(course_id, source.to_string()))?;
        let waitlist = Waitlist::from_ordered(ordered_waitlist(course_id, &records)?);

        debug!(
            course_id = %course_id,
            admitted,
            waitlisted = waitlist.len(),
            "course seating hydrated"
        );

        Ok(CourseSeating {
            course,
            ledger,
            waitlist,
        })
    }
}

/// Waitlisted records ordered by stored position, verifying the positions are exactly 1..=n.
fn ordered_waitlist(
    course_id: &CourseId,
    records: &[Enrollment],
) -> Result<Vec<EnrollmentId>, EnrollmentServiceError> {
    let mut waitlisted: Vec<(u32, EnrollmentId)> = Vec::new();
    for record in records
        .iter()
        .filter(|record| record.enrollment_type == EnrollmentType::Waitlisted)
    {
        let position = record.waitlist_position.ok_or_else(|| {
            invariant(
                course_id,
                format!("waitlisted enrollment {} has no position", record.enrollment_id),
            )
        })?;
        waitlisted.push((position, record.enrollment_id.clone()));
    }
    waitlisted.sort();

    for (index, (position, enrollment_id)) in waitlisted.iter().enumerate() {
        if *position as usize != index + 1 {
            return Err(invariant(
                course_id,
                format!(
                    "waitlist positions are not contiguous: {enrollment_id} holds {position}, expected {}",
                    index + 1
                ),
            ));
        }
    }

    Ok(waitlisted.into_iter().map(|(_, id)| id).collect())
}

fn invariant(course_id: &CourseId, detail: impl Into<String>) -> EnrollmentServiceError {
    let detail = detail.into();
    error!(course_id = %course_id, %detail, "enrollment invariant violated");
    EnrollmentServiceError::InvariantViolation {
        course_id: course_id.clone(),
        detail,
    }
}

/// Result of a withdrawal or drop, including any students promoted into the freed seat.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalOutcome {
    pub enrollment: Enrollment,
    pub previous_state: EnrollmentType,
    pub promoted: Vec<Enrollment>,
    /// Set when the withdrawal committed but promotion or renumbering did not.
    pub follow_up_deferred: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityChange {
    pub previous_capacity: u32,
    pub capacity: CourseCapacityView,
    pub promoted: Vec<Enrollment>,
}

/// Reporting snapshot of a course's seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseCapacityView {
    pub course_id: CourseId,
    pub title: String,
    pub semester_id: SemesterId,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub available_spots: u32,
    pub is_full: bool,
    pub waitlist_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistEntry {
    pub position: u32,
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentStatusView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub fees: FeeReconciliation,
}

/// Error raised by the enrollment service.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentServiceError {
    #[error(
        "student {student_id} already holds active enrollment {enrollment_id} in course {course_id}"
    )]
    DuplicateEnrollment {
        student_id: StudentId,
        course_id: CourseId,
        enrollment_id: EnrollmentId,
    },
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("enrollment {0} not found")]
    EnrollmentNotFound(EnrollmentId),
    #[error("enrollment {enrollment_id} is already {state}")]
    AlreadyTerminal {
        enrollment_id: EnrollmentId,
        state: EnrollmentType,
    },
    #[error("course {0} already exists")]
    CourseExists(CourseId),
    #[error(transparent)]
    Capacity(CapacityError),
    #[error("invalid payment: {0}")]
    InvalidPayment(String),
    #[error("invariant violated for course {course_id}: {detail}")]
    InvariantViolation { course_id: CourseId, detail: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
