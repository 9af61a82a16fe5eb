use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for a course offering.
    CourseId
);
identifier!(
    /// Identifier wrapper for a registered student.
    StudentId
);
identifier!(
    /// Identifier wrapper for the semester a course runs in.
    SemesterId
);
identifier!(
    /// Identifier wrapper for an enrollment record.
    EnrollmentId
);
identifier!(
    /// Identifier wrapper for a recorded payment.
    PaymentId
);

/// Monetary amount in minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    pub const fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Parses a decimal currency string such as `125`, `125.5` or `$1,125.50`.
    pub fn parse_decimal(raw: &str) -> Option<Money> {
        let cleaned: String = raw
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|ch| *ch != ',')
            .collect();
        if cleaned.is_empty() {
            return None;
        }

        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };
        if fraction.len() > 2 || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }

        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().ok()?
        };
        let fraction = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().ok()? * 10,
            _ => fraction.parse::<u64>().ok()?,
        };

        whole.checked_mul(100)?.checked_add(fraction).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A course offered in a given semester with a fixed number of seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub course_id: CourseId,
    pub title: String,
    pub semester_id: SemesterId,
    pub max_capacity: u32,
    #[serde(default)]
    pub fee: Money,
}

/// Lifecycle state of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentType {
    Enrolled,
    Waitlisted,
    Dropped,
    Withdrawn,
}

impl EnrollmentType {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentType::Enrolled => "enrolled",
            EnrollmentType::Waitlisted => "waitlisted",
            EnrollmentType::Dropped => "dropped",
            EnrollmentType::Withdrawn => "withdrawn",
        }
    }

    /// Enrolled and waitlisted enrollments count against the one-per-course rule.
    pub const fn is_active(self) -> bool {
        matches!(self, EnrollmentType::Enrolled | EnrollmentType::Waitlisted)
    }

    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for EnrollmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student's claim on a seat (or a waitlist slot) in a course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrollment_id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub semester_id: SemesterId,
    pub enrollment_type: EnrollmentType,
    /// Present only while the enrollment is waitlisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_position: Option<u32>,
    pub enrollment_date: NaiveDate,
    pub fee_amount: Money,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.enrollment_type.is_active()
    }
}

/// A single registration attempt for one student in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Check,
    BankTransfer,
}

/// Distinguishes course fees from membership dues; only course fees settle an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    CourseFee,
    MembershipDues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub student_id: StudentId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<EnrollmentId>,
    pub paid_on: NaiveDate,
}

/// Payment details supplied by a caller before an identifier is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSubmission {
    pub student_id: StudentId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub enrollment_id: Option<EnrollmentId>,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}
