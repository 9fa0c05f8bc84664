use serde::{Deserialize, Serialize};

/// Triage severity, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Acuity {
    Critical,
    UrgentAdmit,
    UrgentObs,
    NonUrgent,
}

impl Acuity {
    pub const ALL: [Acuity; 4] = [
        Acuity::Critical,
        Acuity::UrgentAdmit,
        Acuity::UrgentObs,
        Acuity::NonUrgent,
    ];

    /// Priority used to order otherwise-tied paid transport candidates;
    /// lower sorts first (most urgent served first).
    pub fn transport_priority(self) -> u8 {
        match self {
            Acuity::Critical => 1,
            Acuity::UrgentAdmit => 2,
            Acuity::UrgentObs => 3,
            Acuity::NonUrgent => 4,
        }
    }
}

impl std::fmt::Display for Acuity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Acuity::Critical => "CRITICAL",
            Acuity::UrgentAdmit => "URGENT_ADMIT",
            Acuity::UrgentObs => "URGENT_OBS",
            Acuity::NonUrgent => "NON_URGENT",
        };
        write!(f, "{s}")
    }
}

/// Imaging modality ordered for a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImagingModality {
    Ct,
    Mri,
}

impl std::fmt::Display for ImagingModality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImagingModality::Ct => write!(f, "CT"),
            ImagingModality::Mri => write!(f, "MRI"),
        }
    }
}

/// Which tier of the transport broker dispatched a patient's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    Pulley,
    PaidStaff,
    Volunteer,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Pulley => write!(f, "PULLEY"),
            TransportKind::PaidStaff => write!(f, "PAID_STAFF"),
            TransportKind::Volunteer => write!(f, "VOLUNTEER"),
        }
    }
}

/// A staff member's discipline. Drives cost rate lookup and roster pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffType {
    Physician,
    Nurse,
    Tech,
    Radiologist,
    Transport,
    VolunteerTransport,
}

impl std::fmt::Display for StaffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StaffType::Physician => "PHYSICIAN",
            StaffType::Nurse => "NURSE",
            StaffType::Tech => "TECH",
            StaffType::Radiologist => "RADIOLOGIST",
            StaffType::Transport => "TRANSPORT",
            StaffType::VolunteerTransport => "VOLUNTEER_TRANSPORT",
        };
        write!(f, "{s}")
    }
}

/// A bounded-capacity location a patient can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitName {
    Ed,
    Inpatient,
    Cdu,
    ImagingCt,
    ImagingMri,
    Lab,
    Radiology,
}

impl UnitName {
    pub const ALL: [UnitName; 7] = [
        UnitName::Ed,
        UnitName::Inpatient,
        UnitName::Cdu,
        UnitName::ImagingCt,
        UnitName::ImagingMri,
        UnitName::Lab,
        UnitName::Radiology,
    ];

    pub fn imaging(modality: ImagingModality) -> UnitName {
        match modality {
            ImagingModality::Ct => UnitName::ImagingCt,
            ImagingModality::Mri => UnitName::ImagingMri,
        }
    }
}

impl std::fmt::Display for UnitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnitName::Ed => "ED",
            UnitName::Inpatient => "INPATIENT",
            UnitName::Cdu => "CDU",
            UnitName::ImagingCt => "IMAGING_CT",
            UnitName::ImagingMri => "IMAGING_MRI",
            UnitName::Lab => "LAB",
            UnitName::Radiology => "RADIOLOGY",
        };
        write!(f, "{s}")
    }
}
