use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::acuity::{Acuity, ImagingModality, StaffType, UnitName};
use crate::error::{Result, SimError};

/// An inclusive `[lo, hi]` minute range sampled with `SimRng::uniform_int`.
pub type MinuteRange = (i64, i64);

/// Imaging/report classing used for CRITICAL vs ROUTINE turnaround times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportClass {
    Routine,
    Critical,
}

/// The frozen configuration record the scheduler is built from. Every field
/// here is read-only once a `HospitalSimulator` starts -- nothing in the
/// core mutates it, matching the "no global config singleton" redesign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sim_days: u32,
    pub sim_minutes_per_day: i64,
    pub tick_interval_minutes: i64,
    pub rng_seed: u64,

    pub patient_arrival_rate: f64,
    pub patient_acuity: Vec<(Acuity, f64)>,

    pub unit_capacity: HashMap<UnitName, u32>,
    pub staff_per_unit: HashMap<UnitName, HashMap<StaffType, u32>>,
    pub transport_staff: u32,
    pub volunteer_transport_staff: u32,

    pub volunteer_hours_start: i64,
    pub volunteer_hours_end: i64,
    pub volunteer_acuity_eligibility: Vec<Acuity>,
    pub volunteer_transfer_process_time: MinuteRange,

    pub pulley_system_capacity: u32,
    pub pulley_transfer_process_time: MinuteRange,
    pub pulley_eligible_units: Vec<UnitName>,
    pub pulley_eligible_destinations: Vec<UnitName>,

    pub cdu_beds: u32,
    pub cdu_criteria_match: f64,
    pub cdu_observation_time: MinuteRange,

    pub ed_triage_time: MinuteRange,
    pub ed_physician_assessment_time: HashMap<Acuity, MinuteRange>,
    pub imaging_processing_time: HashMap<ImagingModality, MinuteRange>,
    pub imaging_reporting_time: HashMap<ReportClass, MinuteRange>,
    pub lab_processing_time: MinuteRange,
    pub inpatient_stay_time: HashMap<Acuity, MinuteRange>,
    pub discharge_process_time: MinuteRange,
    pub transfer_process_time: MinuteRange,
    pub inpatient_cdu_check_interval: i64,

    pub physician_cost_per_minute: f64,
    pub nurse_cost_per_minute: f64,
    pub tech_cost_per_minute: f64,
    pub radiologist_cost_per_minute: f64,
    pub transport_cost_per_minute: f64,
    pub volunteer_cost_per_minute: f64,
    pub overtime_multiplier: f64,

    pub enable_cdu: bool,
    pub enable_ai_imaging: bool,
    pub enable_ai_staffing: bool,
    pub enable_amenities: bool,
    pub enable_ai_entertainment: bool,

    pub ai_critical_reduction: f64,
    pub ai_routine_prelim_reduction: f64,
    pub ai_discharge_reduction: f64,

    pub amenities_cost_per_patient_visit: f64,
    pub ai_entertainment_monthly_cost: f64,
    pub satisfaction_amenities_bonus: f64,
    pub satisfaction_entertainment_bonus: f64,
}

impl Config {
    pub fn horizon(&self) -> f64 {
        (self.sim_days as i64 * self.sim_minutes_per_day) as f64
    }

    pub fn cost_per_minute(&self, staff_type: StaffType) -> f64 {
        match staff_type {
            StaffType::Physician => self.physician_cost_per_minute,
            StaffType::Nurse => self.nurse_cost_per_minute,
            StaffType::Tech => self.tech_cost_per_minute,
            StaffType::Radiologist => self.radiologist_cost_per_minute,
            StaffType::Transport => self.transport_cost_per_minute,
            StaffType::VolunteerTransport => self.volunteer_cost_per_minute,
        }
    }

    /// Capacity a unit starts the run with; CDU collapses to zero beds
    /// unless `enable_cdu` is set, regardless of what `unit_capacity` says.
    pub fn effective_capacity(&self, unit: UnitName) -> u32 {
        if unit == UnitName::Cdu {
            if self.enable_cdu {
                self.cdu_beds
            } else {
                0
            }
        } else {
            *self.unit_capacity.get(&unit).unwrap_or(&0)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sim_days == 0 {
            return Err(SimError::Config("sim_days must be > 0".into()));
        }
        if self.patient_arrival_rate <= 0.0 {
            return Err(SimError::Config("patient_arrival_rate must be > 0".into()));
        }
        if self.patient_acuity.is_empty() {
            return Err(SimError::Config("patient_acuity must not be empty".into()));
        }
        if self.tick_interval_minutes <= 0 {
            return Err(SimError::Config("tick_interval_minutes must be > 0".into()));
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Baseline defaults mirroring a mid-size community hospital.
    pub fn baseline() -> Self {
        let mut unit_capacity = HashMap::new();
        unit_capacity.insert(UnitName::Ed, 45);
        unit_capacity.insert(UnitName::Inpatient, 165);
        unit_capacity.insert(UnitName::Cdu, 0);
        unit_capacity.insert(UnitName::ImagingCt, 2);
        unit_capacity.insert(UnitName::ImagingMri, 1);
        unit_capacity.insert(UnitName::Lab, 5);
        unit_capacity.insert(UnitName::Radiology, 1);

        let mut staff_per_unit = HashMap::new();
        staff_per_unit.insert(
            UnitName::Ed,
            HashMap::from([(StaffType::Nurse, 14), (StaffType::Physician, 8)]),
        );
        staff_per_unit.insert(
            UnitName::Inpatient,
            HashMap::from([(StaffType::Nurse, 30), (StaffType::Physician, 7)]),
        );
        staff_per_unit.insert(
            UnitName::Cdu,
            HashMap::from([(StaffType::Nurse, 4), (StaffType::Physician, 1)]),
        );
        staff_per_unit.insert(
            UnitName::Radiology,
            HashMap::from([(StaffType::Radiologist, 6)]),
        );
        staff_per_unit.insert(UnitName::ImagingCt, HashMap::from([(StaffType::Tech, 6)]));
        staff_per_unit.insert(UnitName::ImagingMri, HashMap::from([(StaffType::Tech, 4)]));
        staff_per_unit.insert(UnitName::Lab, HashMap::from([(StaffType::Tech, 5)]));

        Config {
            sim_days: 7,
            sim_minutes_per_day: 24 * 60,
            tick_interval_minutes: 5,
            rng_seed: 0,

            patient_arrival_rate: 0.40,
            patient_acuity: vec![
                (Acuity::Critical, 0.10),
                (Acuity::UrgentAdmit, 0.20),
                (Acuity::UrgentObs, 0.30),
                (Acuity::NonUrgent, 0.40),
            ],

            unit_capacity,
            staff_per_unit,
            transport_staff: 25,
            volunteer_transport_staff: 0,

            volunteer_hours_start: 8 * 60,
            volunteer_hours_end: 17 * 60,
            volunteer_acuity_eligibility: vec![Acuity::UrgentObs, Acuity::NonUrgent],
            volunteer_transfer_process_time: (20, 40),

            pulley_system_capacity: 0,
            pulley_transfer_process_time: (5, 10),
            pulley_eligible_units: vec![UnitName::Ed],
            pulley_eligible_destinations: vec![UnitName::ImagingCt, UnitName::ImagingMri],

            cdu_beds: 20,
            cdu_criteria_match: 0.80,
            cdu_observation_time: (10 * 60, 20 * 60),

            ed_triage_time: (10, 30),
            ed_physician_assessment_time: HashMap::from([
                (Acuity::Critical, (30, 60)),
                (Acuity::UrgentAdmit, (20, 45)),
                (Acuity::UrgentObs, (15, 30)),
                (Acuity::NonUrgent, (10, 20)),
            ]),
            imaging_processing_time: HashMap::from([
                (ImagingModality::Ct, (10, 20)),
                (ImagingModality::Mri, (20, 40)),
            ]),
            imaging_reporting_time: HashMap::from([
                (ReportClass::Routine, (120, 360)),
                (ReportClass::Critical, (60, 120)),
            ]),
            lab_processing_time: (60, 180),
            inpatient_stay_time: HashMap::from([
                (Acuity::Critical, (2 * 24 * 60 + 12 * 60, 6 * 24 * 60)),
                (Acuity::UrgentAdmit, (24 * 60 + 12 * 60, 4 * 24 * 60)),
                (Acuity::UrgentObs, (19 * 60 + 12, 2 * 24 * 60 + 12 * 60)),
                (Acuity::NonUrgent, (19 * 60 + 12, 2 * 24 * 60 + 12 * 60)),
            ]),
            discharge_process_time: (90, 150),
            transfer_process_time: (15, 30),
            inpatient_cdu_check_interval: 30,

            physician_cost_per_minute: 3.0,
            nurse_cost_per_minute: 1.0,
            tech_cost_per_minute: 0.50,
            radiologist_cost_per_minute: 2.5,
            transport_cost_per_minute: 0.60,
            volunteer_cost_per_minute: 0.0,
            overtime_multiplier: 1.5,

            enable_cdu: false,
            enable_ai_imaging: false,
            enable_ai_staffing: false,
            enable_amenities: false,
            enable_ai_entertainment: false,

            ai_critical_reduction: 0.30,
            ai_routine_prelim_reduction: 0.15,
            ai_discharge_reduction: 0.10,

            amenities_cost_per_patient_visit: 2.50,
            ai_entertainment_monthly_cost: 5000.00,
            satisfaction_amenities_bonus: 10.0,
            satisfaction_entertainment_bonus: 15.0,
        }
    }

    /// Named presets scaled off real ED visit volumes, supplementing the
    /// single baseline config with the hospital-specific variants the
    /// original model used to compare baseline vs AI-enhanced operation.
    pub fn preset(name: &str) -> Result<Self> {
        let mut cfg = Config::baseline();
        match name {
            "bellevue-baseline" => {
                cfg.patient_arrival_rate = 3.06;
                cfg.unit_capacity.insert(UnitName::Ed, 180);
                cfg.staff_per_unit.insert(
                    UnitName::Ed,
                    HashMap::from([(StaffType::Nurse, 20), (StaffType::Physician, 10)]),
                );
                cfg.transport_staff = 100;
                cfg.discharge_process_time = (180, 300);
                cfg.imaging_reporting_time = HashMap::from([
                    (ReportClass::Routine, (180, 480)),
                    (ReportClass::Critical, (90, 180)),
                ]);
            }
            "bellevue-enhanced" => {
                cfg = Config::preset("bellevue-baseline")?;
                cfg.enable_cdu = true;
                cfg.enable_ai_imaging = true;
                cfg.enable_ai_staffing = true;
                cfg.enable_amenities = true;
                cfg.enable_ai_entertainment = true;
                cfg.transport_staff = 60;
                cfg.volunteer_transport_staff = 15;
                cfg.pulley_system_capacity = 2;
                cfg.discharge_process_time = (90, 150);
                cfg.imaging_reporting_time = Config::baseline().imaging_reporting_time;
            }
            "jackson-baseline" => {
                cfg.patient_arrival_rate = 0.52;
                cfg.unit_capacity.insert(UnitName::Ed, 60);
                cfg.staff_per_unit.insert(
                    UnitName::Ed,
                    HashMap::from([(StaffType::Nurse, 11), (StaffType::Physician, 6)]),
                );
                cfg.transport_staff = 100;
                cfg.discharge_process_time = (120, 240);
                cfg.imaging_reporting_time = HashMap::from([
                    (ReportClass::Routine, (150, 400)),
                    (ReportClass::Critical, (75, 150)),
                ]);
            }
            "jackson-enhanced" => {
                cfg = Config::preset("jackson-baseline")?;
                cfg.enable_cdu = true;
                cfg.enable_ai_imaging = true;
                cfg.enable_ai_staffing = true;
                cfg.enable_amenities = true;
                cfg.enable_ai_entertainment = true;
                cfg.transport_staff = 60;
                cfg.volunteer_transport_staff = 15;
                cfg.pulley_system_capacity = 2;
                cfg.discharge_process_time = (90, 150);
                cfg.imaging_reporting_time = Config::baseline().imaging_reporting_time;
            }
            "cedars-baseline" => {
                cfg.patient_arrival_rate = 0.24;
                cfg.unit_capacity.insert(UnitName::Ed, 70);
                cfg.staff_per_unit.insert(
                    UnitName::Ed,
                    HashMap::from([(StaffType::Nurse, 15), (StaffType::Physician, 8)]),
                );
                cfg.transport_staff = 100;
                cfg.discharge_process_time = (100, 200);
                cfg.imaging_reporting_time = HashMap::from([
                    (ReportClass::Routine, (150, 400)),
                    (ReportClass::Critical, (75, 150)),
                ]);
            }
            "cedars-enhanced" => {
                cfg = Config::preset("cedars-baseline")?;
                cfg.enable_cdu = true;
                cfg.enable_ai_imaging = true;
                cfg.enable_ai_staffing = true;
                cfg.enable_amenities = true;
                cfg.enable_ai_entertainment = true;
                cfg.transport_staff = 60;
                cfg.volunteer_transport_staff = 15;
                cfg.pulley_system_capacity = 2;
                cfg.discharge_process_time = (90, 150);
                cfg.imaging_reporting_time = Config::baseline().imaging_reporting_time;
            }
            "baseline" => {}
            other => {
                return Err(SimError::Config(format!("unknown preset: {other}")));
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_validates() {
        assert!(Config::baseline().validate().is_ok());
    }

    #[test]
    fn cdu_capacity_gated_by_flag() {
        let mut cfg = Config::baseline();
        cfg.unit_capacity.insert(UnitName::Cdu, 999);
        assert_eq!(cfg.effective_capacity(UnitName::Cdu), 0);
        cfg.enable_cdu = true;
        assert_eq!(cfg.effective_capacity(UnitName::Cdu), cfg.cdu_beds);
    }

    #[test]
    fn presets_parse() {
        for name in [
            "baseline",
            "bellevue-baseline",
            "bellevue-enhanced",
            "jackson-baseline",
            "jackson-enhanced",
            "cedars-baseline",
            "cedars-enhanced",
        ] {
            Config::preset(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn unknown_preset_errors() {
        assert!(Config::preset("nonexistent").is_err());
    }
}
