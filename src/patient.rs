use serde::{Deserialize, Serialize};

use crate::acuity::{Acuity, ImagingModality, UnitName};

pub type PatientId = u64;

/// Where a patient currently sits in the care pathway. Transitions are
/// driven entirely by the event handlers in `engine`; nothing here mutates
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    Arriving,
    Waiting,
    InTriage,
    AwaitingAssessment,
    InAssessment,
    AwaitingDiagnostics,
    InTransitToDiagnostics,
    InDiagnostics,
    AwaitingDiagnosticReport,
    AwaitingDisposition,
    AwaitingTransport,
    InTransit,
    Admitted,
    AwaitingDischarge,
    Discharged,
}

/// A single timestamped waypoint in a patient's journey, kept for metrics
/// and length-of-stay reconstruction. Mirrors the append-only event log the
/// original model attaches to each patient; no per-patient debug dump is
/// built on top of it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientEvent {
    pub time: f64,
    pub kind: String,
    pub unit: Option<UnitName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub arrival_time: f64,
    pub acuity: Acuity,
    pub status: PatientStatus,
    pub current_unit: Option<UnitName>,
    pub boarding_start: Option<f64>,
    pub admitted_at: Option<f64>,

    pub needs_imaging: bool,
    pub imaging_modality: Option<ImagingModality>,
    pub needs_lab: bool,

    pub diagnostics_ordered_at: Option<f64>,
    pub diagnostics_complete_at: Option<f64>,
    /// Unit the patient left for the current diagnostic round trip;
    /// restored to `current_unit` once the report is ready.
    pub diagnostics_origin: Option<UnitName>,

    pub discharge_time: Option<f64>,
    pub transport_request_time: Option<f64>,
    pub transport_assigned_time: Option<f64>,

    pub satisfaction_score: Option<f64>,

    pub events: Vec<PatientEvent>,
}

impl Patient {
    pub fn new(id: PatientId, arrival_time: f64, acuity: Acuity) -> Self {
        Patient {
            id,
            arrival_time,
            acuity,
            status: PatientStatus::Arriving,
            current_unit: None,
            boarding_start: None,
            admitted_at: None,
            needs_imaging: false,
            imaging_modality: None,
            needs_lab: false,
            diagnostics_ordered_at: None,
            diagnostics_complete_at: None,
            diagnostics_origin: None,
            discharge_time: None,
            transport_request_time: None,
            transport_assigned_time: None,
            satisfaction_score: None,
            events: Vec::new(),
        }
    }

    pub fn add_event(&mut self, time: f64, kind: impl Into<String>, unit: Option<UnitName>) {
        self.events.push(PatientEvent {
            time,
            kind: kind.into(),
            unit,
        });
    }

    pub fn total_length_of_stay(&self, end_time: f64) -> f64 {
        let end = self.discharge_time.unwrap_or(end_time);
        end - self.arrival_time
    }
}
