use std::collections::HashMap;

use serde::Serialize;

use crate::acuity::{StaffType, TransportKind, UnitName};

/// Streaming collector fed by the engine as events fire. Nothing here is
/// queried mid-run except the occupancy series, which the periodic
/// `MetricsCheckpoint` event samples.
#[derive(Debug, Default)]
pub struct MetricsAccumulator {
    occupancy_series: HashMap<UnitName, Vec<(f64, u32)>>,
    pulley_occupancy_series: Vec<(f64, u32)>,
    arrivals: u64,
    discharges: u64,
    lengths_of_stay: Vec<f64>,
    ed_boarding_waits: Vec<f64>,
    satisfaction_scores: Vec<f64>,
    transport_counts: HashMap<TransportKind, u64>,
    imaging_count: u64,
    lab_count: u64,
    imaging_tats: Vec<f64>,
    critical_imaging_tats: Vec<f64>,
    ed_cdu_imaging_tats: Vec<f64>,
    transfer_time_to_admit: Vec<f64>,
    ed_wait_for_transport: Vec<f64>,
    staff_cost: HashMap<StaffType, f64>,
    normal_cost: f64,
    overtime_cost: f64,
    amenities_cost: f64,
    cdu_admissions: u64,
    cdu_conversions: u64,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_occupancy(&mut self, unit: UnitName, time: f64, count: u32) {
        let series = self.occupancy_series.entry(unit).or_default();
        if let Some(last) = series.last() {
            if last.1 == count {
                return;
            }
        }
        series.push((time, count));
    }

    pub fn record_pulley_occupancy(&mut self, time: f64, count: u32) {
        if let Some(last) = self.pulley_occupancy_series.last() {
            if last.1 == count {
                return;
            }
        }
        self.pulley_occupancy_series.push((time, count));
    }

    pub fn record_arrival(&mut self) {
        self.arrivals += 1;
    }

    pub fn record_discharge(&mut self, length_of_stay: f64) {
        self.discharges += 1;
        self.lengths_of_stay.push(length_of_stay);
    }

    pub fn record_ed_boarding_wait(&mut self, minutes: f64) {
        self.ed_boarding_waits.push(minutes);
    }

    pub fn record_satisfaction(&mut self, score: f64) {
        self.satisfaction_scores.push(score);
    }

    pub fn record_transport(&mut self, kind: TransportKind) {
        *self.transport_counts.entry(kind).or_insert(0) += 1;
    }

    pub fn record_imaging(&mut self) {
        self.imaging_count += 1;
    }

    pub fn record_lab(&mut self) {
        self.lab_count += 1;
    }

    pub fn add_staff_cost(&mut self, staff_type: StaffType, cost: f64) {
        *self.staff_cost.entry(staff_type).or_insert(0.0) += cost;
    }

    pub fn add_normal_cost(&mut self, cost: f64) {
        self.normal_cost += cost;
    }

    pub fn add_overtime_cost(&mut self, cost: f64) {
        self.overtime_cost += cost;
    }

    pub fn add_amenities_cost(&mut self, cost: f64) {
        self.amenities_cost += cost;
    }

    /// Imaging turnaround time (order to result). `is_critical` and
    /// `is_ed_cdu_origin` feed the acuity- and origin-scoped subsets.
    pub fn record_imaging_tat(&mut self, tat: f64, is_critical: bool, is_ed_cdu_origin: bool) {
        self.imaging_tats.push(tat);
        if is_critical {
            self.critical_imaging_tats.push(tat);
        }
        if is_ed_cdu_origin {
            self.ed_cdu_imaging_tats.push(tat);
        }
    }

    pub fn record_transfer_time_to_admit(&mut self, minutes: f64) {
        self.transfer_time_to_admit.push(minutes);
    }

    pub fn record_ed_wait_for_transport(&mut self, minutes: f64) {
        self.ed_wait_for_transport.push(minutes);
    }

    pub fn record_cdu_admission(&mut self) {
        self.cdu_admissions += 1;
    }

    pub fn record_cdu_conversion(&mut self) {
        self.cdu_conversions += 1;
    }

    pub fn cdu_discharge_rate(&self) -> f64 {
        if self.cdu_admissions == 0 {
            0.0
        } else {
            self.cdu_conversions as f64 / self.cdu_admissions as f64
        }
    }

    /// Time-weighted average occupancy over `[0, horizon]`: each step's
    /// count is weighted by the minutes until the next recorded step (or
    /// until `horizon` for the last one).
    pub fn weighted_average_occupancy(&self, unit: UnitName, horizon: f64) -> f64 {
        match self.occupancy_series.get(&unit) {
            Some(series) => Self::weighted_average(series, horizon),
            None => 0.0,
        }
    }

    pub fn weighted_average_pulley_occupancy(&self, horizon: f64) -> f64 {
        Self::weighted_average(&self.pulley_occupancy_series, horizon)
    }

    fn weighted_average(series: &[(f64, u32)], horizon: f64) -> f64 {
        if series.is_empty() || horizon <= 0.0 {
            return 0.0;
        }
        let mut total = 0.0;
        for (i, (time, count)) in series.iter().enumerate() {
            let next_time = series.get(i + 1).map(|(t, _)| *t).unwrap_or(horizon);
            let span = (next_time - time).max(0.0);
            total += span * (*count as f64);
        }
        total / horizon
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    pub fn report(&self, horizon: f64, ai_entertainment_cost: f64, pulley_capacity: u32) -> Report {
        let total_cost: f64 =
            self.staff_cost.values().sum::<f64>() + ai_entertainment_cost + self.amenities_cost;
        let pulley_avg_occupancy = self.weighted_average_pulley_occupancy(horizon);
        let pulley_avg_utilization = if pulley_capacity == 0 {
            0.0
        } else {
            pulley_avg_occupancy / pulley_capacity as f64
        };
        Report {
            total_arrivals: self.arrivals,
            total_discharges: self.discharges,
            average_length_of_stay_minutes: Self::mean(&self.lengths_of_stay),
            average_ed_boarding_wait_minutes: Self::mean(&self.ed_boarding_waits),
            average_satisfaction_score: Self::mean(&self.satisfaction_scores),
            average_occupancy: UnitName::ALL
                .iter()
                .map(|u| (u.to_string(), self.weighted_average_occupancy(*u, horizon)))
                .collect(),
            pulley_avg_occupancy,
            pulley_avg_utilization,
            transport_counts: self
                .transport_counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            imaging_studies_completed: self.imaging_count,
            lab_studies_completed: self.lab_count,
            average_overall_imaging_tat: Self::mean(&self.imaging_tats),
            average_critical_imaging_tat: Self::mean(&self.critical_imaging_tats),
            average_ed_cdu_imaging_tat: Self::mean(&self.ed_cdu_imaging_tats),
            average_transfer_time_to_admit: Self::mean(&self.transfer_time_to_admit),
            average_ed_wait_for_transport: Self::mean(&self.ed_wait_for_transport),
            staff_cost_by_type: self.staff_cost.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            total_normal_cost: self.normal_cost,
            total_overtime_cost: self.overtime_cost,
            ai_entertainment_cost,
            amenities_cost: self.amenities_cost,
            cdu_admissions: self.cdu_admissions,
            cdu_discharge_rate: self.cdu_discharge_rate(),
            total_operating_cost: total_cost,
        }
    }
}

/// Serializable snapshot of a completed run. Enum-keyed maps are rendered
/// with their `Display` labels as string keys since `serde_json` cannot
/// serialize a map whose keys are not strings.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_arrivals: u64,
    pub total_discharges: u64,
    pub average_length_of_stay_minutes: f64,
    pub average_ed_boarding_wait_minutes: f64,
    pub average_satisfaction_score: f64,
    pub average_occupancy: HashMap<String, f64>,
    pub pulley_avg_occupancy: f64,
    pub pulley_avg_utilization: f64,
    pub transport_counts: HashMap<String, u64>,
    pub imaging_studies_completed: u64,
    pub lab_studies_completed: u64,
    pub average_overall_imaging_tat: f64,
    pub average_critical_imaging_tat: f64,
    pub average_ed_cdu_imaging_tat: f64,
    pub average_transfer_time_to_admit: f64,
    pub average_ed_wait_for_transport: f64,
    pub staff_cost_by_type: HashMap<String, f64>,
    pub total_normal_cost: f64,
    pub total_overtime_cost: f64,
    pub ai_entertainment_cost: f64,
    pub amenities_cost: f64,
    pub cdu_admissions: u64,
    pub cdu_discharge_rate: f64,
    pub total_operating_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_average_occupancy_matches_step_integral() {
        let mut m = MetricsAccumulator::new();
        m.record_occupancy(UnitName::Ed, 0.0, 0);
        m.record_occupancy(UnitName::Ed, 10.0, 2);
        m.record_occupancy(UnitName::Ed, 30.0, 4);
        // 0 for [0,10), 2 for [10,30), 4 for [30,40]
        let avg = m.weighted_average_occupancy(UnitName::Ed, 40.0);
        let expected = (0.0 * 10.0 + 2.0 * 20.0 + 4.0 * 10.0) / 40.0;
        assert!((avg - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_series_is_zero() {
        let m = MetricsAccumulator::new();
        assert_eq!(m.weighted_average_occupancy(UnitName::Ed, 100.0), 0.0);
    }

    #[test]
    fn duplicate_counts_are_collapsed() {
        let mut m = MetricsAccumulator::new();
        m.record_occupancy(UnitName::Ed, 0.0, 1);
        m.record_occupancy(UnitName::Ed, 5.0, 1);
        m.record_occupancy(UnitName::Ed, 10.0, 2);
        assert_eq!(m.occupancy_series.get(&UnitName::Ed).unwrap().len(), 2);
    }
}
