use std::collections::VecDeque;

use serde::Serialize;

use super::domain::EnrollmentId;

/// FIFO queue of waitlisted enrollments for one course.
///
/// Positions are 1-based and derived from queue order, so they are always contiguous. Every
/// operation that shifts entries reports the new positions so stored records can follow.
#[derive(Debug, Clone, Default)]
pub struct Waitlist {
    entries: VecDeque<EnrollmentId>,
}

/// New position of an entry after the queue was renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionChange {
    pub enrollment_id: EnrollmentId,
    pub position: u32,
}

impl Waitlist {
    pub fn from_ordered<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = EnrollmentId>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends to the tail and returns the assigned position.
    pub fn enqueue(&mut self, enrollment_id: EnrollmentId) -> u32 {
        self.entries.push_back(enrollment_id);
        position_for(self.entries.len() - 1)
    }

    pub fn peek_head(&self) -> Option<&EnrollmentId> {
        self.entries.front()
    }

    pub fn dequeue_head(&mut self) -> Option<(EnrollmentId, Vec<PositionChange>)> {
        let head = self.entries.pop_front()?;
        Some((head, self.positions_from(0)))
    }

    /// Removes an arbitrary entry. Returns `None` when the enrollment is not queued.
    pub fn remove(&mut self, enrollment_id: &EnrollmentId) -> Option<Vec<PositionChange>> {
        let index = self.index_of(enrollment_id)?;
        self.entries.remove(index)?;
        Some(self.positions_from(index))
    }

    pub fn position_of(&self, enrollment_id: &EnrollmentId) -> Option<u32> {
        self.index_of(enrollment_id).map(position_for)
    }

    /// Entries in queue order paired with their positions.
    pub fn positions(&self) -> impl Iterator<Item = (u32, &EnrollmentId)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, id)| (position_for(index), id))
    }

    fn index_of(&self, enrollment_id: &EnrollmentId) -> Option<usize> {
        self.entries.iter().position(|entry| entry == enrollment_id)
    }

    fn positions_from(&self, index: usize) -> Vec<PositionChange> {
        self.entries
            .iter()
            .enumerate()
            .skip(index)
            .map(|(index, id)| PositionChange {
                enrollment_id: id.clone(),
                position: position_for(index),
            })
            .collect()
    }
}

fn position_for(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |index| index.saturating_add(1))
}
