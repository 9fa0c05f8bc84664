//! Discrete-event simulator of patient flow through a hospital: arrival and
//! triage in the emergency department, assessment, diagnostics, disposition
//! (discharge, inpatient/CDU admission, or transfer), and the staff and
//! transport resources that move and treat patients along the way.
//!
//! The engine is single-threaded and cooperative: event handlers run to
//! completion without blocking, and the only nondeterminism comes from the
//! seeded RNG, so two runs with the same [`config::Config`] produce the same
//! [`metrics::Report`].

pub mod acuity;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod metrics;
pub mod patient;
pub mod rng;
pub mod staff;
pub mod transport;
pub mod unit;

pub use acuity::{Acuity, ImagingModality, StaffType, TransportKind, UnitName};
pub use config::Config;
pub use engine::Engine;
pub use error::{Result, SimError};
pub use metrics::Report;
pub use patient::{Patient, PatientId, PatientStatus};
