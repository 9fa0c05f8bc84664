use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::acuity::{TransportKind, UnitName};
use crate::patient::PatientId;

/// A stage a patient can be waiting on staff/resource availability for.
/// Retried on a fixed tick rather than modeled as a separate wait-list per
/// resource, since handlers may never block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Assessment,
    Transport { destination: UnitName, track_boarding: bool },
    DiagnosticStart { unit: UnitName },
    DiagnosticProcessing { unit: UnitName },
    Discharge,
}

/// Every kind of occurrence the scheduler can fire. Handlers for each of
/// these live in `engine::Engine::process_event`. `TransportComplete` folds
/// what would otherwise be near-duplicate variants (pulley vs. staff
/// transport, and every inter-unit move including admission) into one,
/// since the destination/kind carried in the payload is all the handler
/// branches on.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Self-refreshing meta-scheduler: ticks every `TICK_INTERVAL_MINUTES`,
    /// draws one candidate inter-arrival gap per tick, and enqueues a
    /// separate `PatientArrival` only if it lands strictly before the
    /// horizon. Distinct from `PatientArrival` itself, which fires once and
    /// does not reschedule anything.
    ScheduleArrival,
    PatientArrival,
    TriageComplete { patient: PatientId },
    AssessmentComplete { patient: PatientId },
    ReEvaluateAfterDiagnostics { patient: PatientId },
    TransportComplete { patient: PatientId, destination: UnitName, kind: TransportKind, track_boarding: bool },
    DiagnosticProcessingComplete { patient: PatientId, unit: UnitName },
    DiagnosticReportReady { patient: PatientId, unit: UnitName },
    CduObservationComplete { patient: PatientId },
    InpatientPatientCheck { patient: PatientId },
    DischargeProcessComplete { patient: PatientId },
    MetricsCheckpoint,
    AiStaffingAdjustment,
    Retry { patient: PatientId, stage: Stage },
}

impl Event {
    pub fn label(&self) -> &'static str {
        match self {
            Event::ScheduleArrival => "SCHEDULE_PATIENT_ARRIVAL",
            Event::PatientArrival => "PATIENT_ARRIVAL",
            Event::TriageComplete { .. } => "TRIAGE_COMPLETE",
            Event::AssessmentComplete { .. } => "ASSESSMENT_COMPLETE",
            Event::ReEvaluateAfterDiagnostics { .. } => "RE_EVALUATE_AFTER_DIAGNOSTICS",
            Event::TransportComplete { .. } => "TRANSPORT_COMPLETE",
            Event::DiagnosticProcessingComplete { .. } => "DIAGNOSTIC_PROCESSING_COMPLETE",
            Event::DiagnosticReportReady { .. } => "DIAGNOSTIC_REPORT_READY",
            Event::CduObservationComplete { .. } => "CDU_OBSERVATION_COMPLETE",
            Event::InpatientPatientCheck { .. } => "INPATIENT_PATIENT_CHECK",
            Event::DischargeProcessComplete { .. } => "DISCHARGE_PROCESS_COMPLETE",
            Event::MetricsCheckpoint => "METRICS_CHECKPOINT",
            Event::AiStaffingAdjustment => "AI_STAFFING_ADJUSTMENT",
            Event::Retry { .. } => "RETRY",
        }
    }
}

/// A scheduled event wrapped with its fire time and insertion sequence.
/// `BinaryHeap` is a max-heap, so `Ord` is reversed here: earliest `time`
/// wins, and among equal times the one inserted first wins, giving FIFO
/// tiebreaking without ever comparing event payloads.
#[derive(Debug, Clone)]
pub struct Queued {
    pub time: f64,
    pub insert_seq: u64,
    pub event: Event,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.insert_seq == other.insert_seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.insert_seq.cmp(&self.insert_seq))
    }
}

/// Min-heap-by-time event queue with a monotonic insertion counter for
/// deterministic tiebreaking among equal timestamps.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, event: Event) {
        let insert_seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { time, insert_seq, event });
    }

    pub fn pop(&mut self) -> Option<Queued> {
        self.heap.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_earliest_time_first() {
        let mut q = EventQueue::new();
        q.schedule(10.0, Event::PatientArrival);
        q.schedule(5.0, Event::MetricsCheckpoint);
        q.schedule(7.0, Event::AiStaffingAdjustment);
        assert_eq!(q.pop().unwrap().time, 5.0);
        assert_eq!(q.pop().unwrap().time, 7.0);
        assert_eq!(q.pop().unwrap().time, 10.0);
    }

    #[test]
    fn ties_broken_fifo_by_insertion() {
        let mut q = EventQueue::new();
        q.schedule(5.0, Event::PatientArrival);
        q.schedule(5.0, Event::MetricsCheckpoint);
        let first = q.pop().unwrap();
        let second = q.pop().unwrap();
        assert_eq!(first.event.label(), "PATIENT_ARRIVAL");
        assert_eq!(second.event.label(), "METRICS_CHECKPOINT");
    }
}
