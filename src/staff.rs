use serde::{Deserialize, Serialize};

use crate::acuity::{StaffType, UnitName};
use crate::config::Config;
use crate::patient::PatientId;

pub type StaffId = u64;

/// A single staff member. Cost accrues lazily: each time the member is
/// reassigned (or at simulation end) the minutes since the previous
/// assignment are booked against an 80/20 normal/overtime split, rather than
/// ticking a cost counter every scheduler step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub staff_type: StaffType,
    pub home_unit: UnitName,
    pub busy_until: f64,
    pub current_patient: Option<PatientId>,
    pub last_assignment_start: Option<f64>,
    pub normal_cost: f64,
    pub overtime_cost: f64,
}

impl Staff {
    pub fn new(id: StaffId, staff_type: StaffType, home_unit: UnitName) -> Self {
        Staff {
            id,
            staff_type,
            home_unit,
            busy_until: 0.0,
            current_patient: None,
            last_assignment_start: None,
            normal_cost: 0.0,
            overtime_cost: 0.0,
        }
    }

    pub fn is_free(&self, sim_time: f64) -> bool {
        self.current_patient.is_none() && sim_time >= self.busy_until
    }

    pub fn accrued_cost(&self) -> f64 {
        self.normal_cost + self.overtime_cost
    }

    /// Book cost for the task just finishing, then start a new one.
    pub fn assign(&mut self, patient: PatientId, sim_time: f64, duration: f64, config: &Config) {
        self.accrue_cost_for_completed_task(sim_time, config);
        self.current_patient = Some(patient);
        self.last_assignment_start = Some(sim_time);
        self.busy_until = sim_time + duration;
    }

    pub fn release(&mut self) {
        self.current_patient = None;
    }

    fn accrue_cost_for_completed_task(&mut self, sim_time: f64, config: &Config) {
        let Some(start) = self.last_assignment_start else {
            return;
        };
        let minutes = (sim_time.min(self.busy_until) - start).max(0.0);
        let (normal, overtime) = Self::split_cost(minutes, config.cost_per_minute(self.staff_type), config);
        self.normal_cost += normal;
        self.overtime_cost += overtime;
    }

    /// Booked once at run end for whatever task was still in flight.
    pub fn accrue_remaining_cost(&mut self, final_sim_time: f64, config: &Config) {
        let Some(start) = self.last_assignment_start else {
            return;
        };
        let minutes = (final_sim_time.min(self.busy_until) - start).max(0.0);
        let (normal, overtime) = Self::split_cost(minutes, config.cost_per_minute(self.staff_type), config);
        self.normal_cost += normal;
        self.overtime_cost += overtime;
        self.last_assignment_start = None;
    }

    /// 80% of the minutes are billed at the normal rate, 20% at
    /// `rate * OVERTIME_MULTIPLIER`.
    fn split_cost(minutes: f64, rate_per_minute: f64, config: &Config) -> (f64, f64) {
        let normal = minutes * 0.80 * rate_per_minute;
        let overtime = minutes * 0.20 * rate_per_minute * config.overtime_multiplier;
        (normal, overtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::baseline()
    }

    #[test]
    fn assign_accrues_previous_task_cost() {
        let config = cfg();
        let mut s = Staff::new(1, StaffType::Nurse, UnitName::Ed);
        s.assign(10, 0.0, 60.0, &config);
        assert_eq!(s.accrued_cost(), 0.0);
        s.assign(11, 60.0, 30.0, &config);
        let (normal, overtime) = Staff::split_cost(60.0, config.cost_per_minute(StaffType::Nurse), &config);
        assert!((s.accrued_cost() - (normal + overtime)).abs() < 1e-9);
    }

    #[test]
    fn remaining_cost_uses_busy_until_cap() {
        let config = cfg();
        let mut s = Staff::new(1, StaffType::Nurse, UnitName::Ed);
        s.assign(10, 0.0, 60.0, &config);
        s.accrue_remaining_cost(1000.0, &config);
        let (normal, overtime) = Staff::split_cost(60.0, config.cost_per_minute(StaffType::Nurse), &config);
        assert!((s.accrued_cost() - (normal + overtime)).abs() < 1e-9);
    }

    #[test]
    fn is_free_requires_no_patient_and_time_elapsed() {
        let config = cfg();
        let mut s = Staff::new(1, StaffType::Nurse, UnitName::Ed);
        assert!(s.is_free(0.0));
        s.assign(10, 0.0, 60.0, &config);
        assert!(!s.is_free(30.0));
        s.release();
        assert!(!s.is_free(30.0));
        assert!(s.is_free(60.0));
    }
}
