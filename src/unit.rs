use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::acuity::UnitName;
use crate::patient::PatientId;

/// An entry in a unit's waiting queue, ordered by acuity priority first and
/// arrival time second (earliest first), independent of patient identity --
/// mirrors the scheduler's own tiebreaking so two queues never disagree
/// about who goes first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WaitingEntry {
    priority: u8,
    arrival_time: f64,
    patient_id: PatientId,
}

impl Eq for WaitingEntry {}

impl Ord for WaitingEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.arrival_time.partial_cmp(&self.arrival_time).unwrap_or(Ordering::Equal))
            .then_with(|| other.patient_id.cmp(&self.patient_id))
    }
}

impl PartialOrd for WaitingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bounded-capacity location. Occupants are tracked by id only; the
/// `Patient` records themselves live in the engine's patient table.
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: UnitName,
    pub capacity: u32,
    occupants: HashSet<PatientId>,
    waiting: BinaryHeap<WaitingEntry>,
}

impl Unit {
    pub fn new(name: UnitName, capacity: u32) -> Self {
        Unit {
            name,
            capacity,
            occupants: HashSet::new(),
            waiting: BinaryHeap::new(),
        }
    }

    pub fn occupied(&self) -> u32 {
        self.occupants.len() as u32
    }

    pub fn has_free_bed(&self) -> bool {
        self.occupants.len() < self.capacity as usize
    }

    pub fn admit_patient(&mut self, patient_id: PatientId) -> bool {
        if !self.has_free_bed() {
            return false;
        }
        self.occupants.insert(patient_id)
    }

    pub fn discharge_patient(&mut self, patient_id: PatientId) -> bool {
        self.occupants.remove(&patient_id)
    }

    pub fn enqueue(&mut self, patient_id: PatientId, priority: u8, arrival_time: f64) {
        self.waiting.push(WaitingEntry {
            priority,
            arrival_time,
            patient_id,
        });
    }

    pub fn next_waiting(&self) -> Option<PatientId> {
        self.waiting.peek().map(|e| e.patient_id)
    }

    pub fn pop_waiting(&mut self) -> Option<PatientId> {
        self.waiting.pop().map(|e| e.patient_id)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_capacity() {
        let mut u = Unit::new(UnitName::Ed, 2);
        assert!(u.admit_patient(1));
        assert!(u.admit_patient(2));
        assert!(!u.admit_patient(3));
        assert_eq!(u.occupied(), 2);
    }

    #[test]
    fn waiting_queue_orders_by_priority_then_arrival() {
        let mut u = Unit::new(UnitName::Ed, 0);
        u.enqueue(1, 4, 10.0);
        u.enqueue(2, 1, 20.0);
        u.enqueue(3, 1, 5.0);
        assert_eq!(u.pop_waiting(), Some(3));
        assert_eq!(u.pop_waiting(), Some(2));
        assert_eq!(u.pop_waiting(), Some(1));
    }

    #[test]
    fn discharge_frees_bed() {
        let mut u = Unit::new(UnitName::Ed, 1);
        u.admit_patient(1);
        assert!(!u.has_free_bed());
        u.discharge_patient(1);
        assert!(u.has_free_bed());
    }
}
