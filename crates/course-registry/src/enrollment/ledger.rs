use serde::Serialize;

/// Seat accounting for a single course offering.
///
/// The ledger itself is not synchronized; the admission service owns one per course behind
/// the course's exclusion scope, which makes every check-and-update below atomic with
/// respect to other callers on the same course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatLedger {
    max_capacity: u32,
    admitted: u32,
}

impl SeatLedger {
    pub fn new(max_capacity: u32) -> Result<Self, CapacityError> {
        Self::hydrate(max_capacity, 0)
    }

    /// Rebuilds a ledger from stored state, rejecting counts that are already oversold.
    pub fn hydrate(max_capacity: u32, admitted: u32) -> Result<Self, CapacityError> {
        if max_capacity == 0 {
            return Err(CapacityError::ZeroCapacity);
        }
        if admitted > max_capacity {
            return Err(CapacityError::Oversold {
                admitted,
                max_capacity,
            });
        }
        Ok(Self {
            max_capacity,
            admitted,
        })
    }

    pub const fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub const fn current_enrollment(&self) -> u32 {
        self.admitted
    }

    pub const fn available_spots(&self) -> u32 {
        self.max_capacity.saturating_sub(self.admitted)
    }

    pub const fn is_full(&self) -> bool {
        self.available_spots() == 0
    }

    /// Claims a seat when one is free. Returns `false` without mutating when the course is full.
    pub fn try_reserve_seat(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.admitted += 1;
        true
    }

    pub fn release_seat(&mut self) -> Result<(), CapacityError> {
        self.admitted = self
            .admitted
            .checked_sub(1)
            .ok_or(CapacityError::Underflow)?;
        Ok(())
    }

    /// Applies a new seat limit and returns the previous one.
    pub fn resize(&mut self, max_capacity: u32) -> Result<u32, CapacityError> {
        if max_capacity == 0 {
            return Err(CapacityError::ZeroCapacity);
        }
        if max_capacity < self.admitted {
            return Err(CapacityError::BelowEnrollment {
                requested: max_capacity,
                admitted: self.admitted,
            });
        }
        let previous = self.max_capacity;
        self.max_capacity = max_capacity;
        Ok(previous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("course capacity must be at least one seat")]
    ZeroCapacity,
    #[error("capacity {requested} is below the {admitted} students already enrolled")]
    BelowEnrollment { requested: u32, admitted: u32 },
    #[error("releasing a seat would take the admitted count below zero")]
    Underflow,
    #[error("{admitted} admitted students exceed the capacity of {max_capacity}")]
    Oversold { admitted: u32, max_capacity: u32 },
}
