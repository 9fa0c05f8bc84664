use std::collections::HashMap;

use tracing::{debug, trace};

use crate::acuity::{Acuity, ImagingModality, StaffType, TransportKind, UnitName};
use crate::config::{Config, ReportClass};
use crate::event::{Event, EventQueue, Stage};
use crate::metrics::{MetricsAccumulator, Report};
use crate::patient::{Patient, PatientId, PatientStatus};
use crate::rng::SimRng;
use crate::staff::{Staff, StaffId};
use crate::transport::{TransportBroker, TransportTier};
use crate::unit::Unit;

/// Where a patient should end up once assessment and any diagnostics are
/// done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Discharge,
    Admit(UnitName),
}

/// Probability an admission-eligible non-urgent patient is routed through
/// the CDU instead of straight discharge. Distinct from `cdu_criteria_match`,
/// which governs urgent-observation patients.
const NON_URGENT_CDU_THRESHOLD: f64 = 0.40;

/// The hospital's discrete-event scheduler: owns every unit, staff member,
/// and in-flight patient, and drains the event queue until the horizon is
/// exhausted.
pub struct Engine {
    config: Config,
    rng: SimRng,
    queue: EventQueue,
    sim_time: f64,
    horizon: f64,

    next_patient_id: PatientId,
    next_staff_id: StaffId,

    patients: HashMap<PatientId, Patient>,
    units: HashMap<UnitName, Unit>,
    staff: HashMap<StaffId, Staff>,
    roster: HashMap<(UnitName, StaffType), Vec<StaffId>>,
    transport_staff_ids: Vec<StaffId>,
    volunteer_staff_ids: Vec<StaffId>,

    broker: TransportBroker,
    metrics: MetricsAccumulator,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let horizon = config.horizon();
        let mut engine = Engine {
            sim_time: 0.0,
            horizon,
            next_patient_id: 0,
            next_staff_id: 0,
            patients: HashMap::new(),
            units: HashMap::new(),
            staff: HashMap::new(),
            roster: HashMap::new(),
            transport_staff_ids: Vec::new(),
            volunteer_staff_ids: Vec::new(),
            broker: TransportBroker::new(),
            metrics: MetricsAccumulator::new(),
            rng: SimRng::new(config.rng_seed),
            queue: EventQueue::new(),
            config,
        };
        engine.initialize_units();
        engine.initialize_staff();
        engine.seed_events();
        engine
    }

    fn initialize_units(&mut self) {
        for unit in UnitName::ALL {
            let capacity = self.config.effective_capacity(unit);
            self.units.insert(unit, Unit::new(unit, capacity));
            self.metrics.record_occupancy(unit, 0.0, 0);
        }
        self.metrics.record_pulley_occupancy(0.0, 0);
    }

    fn initialize_staff(&mut self) {
        let assignments: Vec<(UnitName, StaffType, u32)> = self
            .config
            .staff_per_unit
            .iter()
            .flat_map(|(unit, by_type)| {
                by_type
                    .iter()
                    .map(move |(staff_type, count)| (*unit, *staff_type, *count))
            })
            .collect();
        for (unit, staff_type, count) in assignments {
            for _ in 0..count {
                let id = self.next_staff_id;
                self.next_staff_id += 1;
                self.staff.insert(id, Staff::new(id, staff_type, unit));
                self.roster.entry((unit, staff_type)).or_default().push(id);
            }
        }
        for _ in 0..self.config.transport_staff {
            let id = self.next_staff_id;
            self.next_staff_id += 1;
            self.staff.insert(id, Staff::new(id, StaffType::Transport, UnitName::Ed));
            self.transport_staff_ids.push(id);
        }
        for _ in 0..self.config.volunteer_transport_staff {
            let id = self.next_staff_id;
            self.next_staff_id += 1;
            self.staff
                .insert(id, Staff::new(id, StaffType::VolunteerTransport, UnitName::Ed));
            self.volunteer_staff_ids.push(id);
        }
    }

    fn seed_events(&mut self) {
        self.queue.schedule(0.0, Event::ScheduleArrival);
        self.queue
            .schedule(self.config.tick_interval_minutes as f64, Event::MetricsCheckpoint);
        if self.config.enable_ai_staffing {
            self.queue
                .schedule(self.config.tick_interval_minutes as f64, Event::AiStaffingAdjustment);
        }
    }

    /// Runs the event loop to completion and returns the aggregated report.
    /// Once `sim_time` would exceed the horizon, events are drained without
    /// processing -- the clock stops advancing and nothing further fires,
    /// so whatever was already in flight is abandoned rather than completed.
    pub fn run(mut self) -> Report {
        while let Some(queued) = self.queue.pop() {
            if queued.time > self.horizon {
                continue;
            }
            self.sim_time = queued.time;
            trace!(time = self.sim_time, event = queued.event.label(), "processing event");
            self.process_event(queued.event);
        }
        self.finalize()
    }

    fn finalize(&mut self) -> Report {
        let final_time = self.horizon + 1.0;
        for staff in self.staff.values_mut() {
            staff.accrue_remaining_cost(final_time, &self.config);
        }
        let costs: Vec<(StaffType, f64, f64)> = self
            .staff
            .values()
            .map(|s| (s.staff_type, s.normal_cost, s.overtime_cost))
            .collect();
        for (staff_type, normal, overtime) in costs {
            self.metrics.add_staff_cost(staff_type, normal + overtime);
            self.metrics.add_normal_cost(normal);
            self.metrics.add_overtime_cost(overtime);
        }
        let ai_entertainment_cost = if self.config.enable_ai_entertainment {
            (self.config.sim_days as f64 / 30.0) * self.config.ai_entertainment_monthly_cost
        } else {
            0.0
        };
        self.metrics
            .report(self.horizon, ai_entertainment_cost, self.config.pulley_system_capacity)
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::ScheduleArrival => self.handle_schedule_arrival(),
            Event::PatientArrival => self.handle_patient_arrival(),
            Event::TriageComplete { patient } => self.handle_triage_complete(patient),
            Event::AssessmentComplete { patient } => self.handle_assessment_complete(patient),
            Event::ReEvaluateAfterDiagnostics { patient } => self.handle_re_evaluate_after_diagnostics(patient),
            Event::TransportComplete { patient, destination, kind, track_boarding } => {
                self.handle_transport_complete(patient, destination, kind, track_boarding)
            }
            Event::DiagnosticProcessingComplete { patient, unit } => {
                self.handle_diagnostic_processing_complete(patient, unit)
            }
            Event::DiagnosticReportReady { patient, unit } => {
                self.handle_diagnostic_report_ready(patient, unit)
            }
            Event::CduObservationComplete { patient } => self.handle_cdu_observation_complete(patient),
            Event::InpatientPatientCheck { patient } => self.handle_inpatient_patient_check(patient),
            Event::DischargeProcessComplete { patient } => self.handle_discharge_process_complete(patient),
            Event::MetricsCheckpoint => self.handle_metrics_checkpoint(),
            Event::AiStaffingAdjustment => self.handle_ai_staffing_adjustment(),
            Event::Retry { patient, stage } => self.handle_retry(patient, stage),
        }
    }

    // -- arrivals & triage -------------------------------------------------

    /// Self-refreshing meta-scheduler: draws one candidate inter-arrival gap
    /// per tick and reschedules itself at `now + TICK` regardless of whether
    /// that candidate produced an arrival.
    fn handle_schedule_arrival(&mut self) {
        let gap = self.rng.exponential(self.config.patient_arrival_rate);
        if self.sim_time + gap < self.horizon {
            self.queue.schedule(self.sim_time + gap, Event::PatientArrival);
        }
        self.queue.schedule(
            self.sim_time + self.config.tick_interval_minutes as f64,
            Event::ScheduleArrival,
        );
    }

    fn handle_patient_arrival(&mut self) {
        let id = self.next_patient_id;
        self.next_patient_id += 1;
        let acuity = self.rng.weighted_acuity(&self.config.patient_acuity);
        let mut patient = Patient::new(id, self.sim_time, acuity);
        patient.current_unit = Some(UnitName::Ed);
        patient.status = PatientStatus::InTriage;
        patient.add_event(self.sim_time, "ARRIVAL", Some(UnitName::Ed));
        self.patients.insert(id, patient);
        self.metrics.record_arrival();
        if self.config.enable_amenities {
            self.metrics.add_amenities_cost(self.config.amenities_cost_per_patient_visit);
        }

        let range = self.config.ed_triage_time;
        let duration = self.rng.uniform_int(range.0, range.1) as f64;
        self.queue
            .schedule(self.sim_time + duration, Event::TriageComplete { patient: id });
    }

    /// Triage happens in the waiting room before a bed is assigned; only
    /// once it's done does the patient compete for an ED bed.
    fn handle_triage_complete(&mut self, id: PatientId) {
        self.try_admit_or_queue(id, UnitName::Ed);
    }

    fn try_assign_assessment(&mut self, id: PatientId) {
        let acuity = self.patients[&id].acuity;
        match self.find_free_staff_in_unit(UnitName::Ed, StaffType::Physician) {
            Some(staff_id) => {
                let range = self.config.ed_physician_assessment_time[&acuity];
                let duration = self.rng.uniform_int(range.0, range.1) as f64;
                self.assign_staff(staff_id, id, duration);
                self.patients.get_mut(&id).unwrap().status = PatientStatus::InAssessment;
                self.queue
                    .schedule(self.sim_time + duration, Event::AssessmentComplete { patient: id });
            }
            None => self.retry_later(id, Stage::Assessment),
        }
    }

    fn handle_assessment_complete(&mut self, id: PatientId) {
        self.release_staff_holding(id);
        let needs_imaging = self.rng.bernoulli(0.3);
        let needs_lab = self.rng.bernoulli(0.4);
        let p = self.patients.get_mut(&id).unwrap();
        p.needs_imaging = needs_imaging;
        p.needs_lab = needs_lab;
        if needs_imaging {
            let modality = *self.rng.choice(&[ImagingModality::Ct, ImagingModality::Mri]);
            self.patients.get_mut(&id).unwrap().imaging_modality = Some(modality);
        }
        self.handle_re_evaluate_after_diagnostics(id);
    }

    /// Runs after assessment and after every diagnostic report: orders
    /// imaging first if still needed, then labs, and only resolves
    /// disposition once both flags are clear.
    fn handle_re_evaluate_after_diagnostics(&mut self, id: PatientId) {
        let p = &self.patients[&id];
        if p.needs_imaging {
            let modality = p.imaging_modality.unwrap_or(ImagingModality::Ct);
            let destination = UnitName::imaging(modality);
            let origin = p.current_unit.unwrap_or(UnitName::Ed);
            let p = self.patients.get_mut(&id).unwrap();
            p.status = PatientStatus::AwaitingDiagnostics;
            p.diagnostics_ordered_at = Some(self.sim_time);
            p.diagnostics_origin = Some(origin);
            self.request_move(id, destination, false);
        } else if p.needs_lab {
            let origin = p.current_unit.unwrap_or(UnitName::Ed);
            let p = self.patients.get_mut(&id).unwrap();
            p.status = PatientStatus::AwaitingDiagnostics;
            p.diagnostics_ordered_at = Some(self.sim_time);
            p.diagnostics_origin = Some(origin);
            self.request_move(id, UnitName::Lab, false);
        } else {
            self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingDisposition;
            self.resolve_disposition(id);
        }
    }

    // -- transport -----------------------------------------------------

    /// Checks destination capacity before committing to a transport: a
    /// patient only leaves their current unit once a bed is actually
    /// available to receive them. `track_boarding` marks the ED-boarding
    /// clock while the patient waits on an admission target.
    fn request_move(&mut self, id: PatientId, destination: UnitName, track_boarding: bool) {
        let p = self.patients.get_mut(&id).unwrap();
        if p.transport_request_time.is_none() {
            p.transport_request_time = Some(self.sim_time);
        }
        if !self.units[&destination].has_free_bed() {
            if track_boarding {
                let p = self.patients.get_mut(&id).unwrap();
                if p.boarding_start.is_none() {
                    p.boarding_start = Some(self.sim_time);
                }
            }
            self.retry_later(id, Stage::Transport { destination, track_boarding });
            return;
        }
        self.request_transport(id, destination, track_boarding);
    }

    fn request_transport(&mut self, id: PatientId, destination: UnitName, track_boarding: bool) {
        let (acuity, origin) = {
            let p = &self.patients[&id];
            (p.acuity, p.current_unit.unwrap_or(UnitName::Ed))
        };

        let pulley_available = self.broker.pulley_has_capacity(&self.config);
        let tier =
            TransportBroker::resolve_tier(&self.config, self.sim_time, acuity, origin, destination, pulley_available);

        if tier == TransportTier::Pulley {
            self.broker.try_reserve_pulley(&self.config, origin, destination);
            self.depart_origin(id, origin);
            let range = self.config.pulley_transfer_process_time;
            let duration = self.rng.uniform_int(range.0, range.1) as f64;
            let p = self.patients.get_mut(&id).unwrap();
            p.status = PatientStatus::InTransit;
            p.transport_assigned_time = Some(self.sim_time);
            self.queue.schedule(
                self.sim_time + duration,
                Event::TransportComplete {
                    patient: id,
                    destination,
                    kind: TransportKind::Pulley,
                    track_boarding,
                },
            );
            return;
        }

        let staff_id = if tier == TransportTier::Volunteer {
            self.find_free_pool_staff(&self.volunteer_staff_ids)
                .or_else(|| self.find_free_pool_staff(&self.transport_staff_ids))
        } else {
            self.find_free_pool_staff(&self.transport_staff_ids)
        };

        match staff_id {
            Some(staff_id) => {
                let kind = if tier == TransportTier::Volunteer && self.volunteer_staff_ids.contains(&staff_id) {
                    TransportKind::Volunteer
                } else {
                    TransportKind::PaidStaff
                };
                let range = if kind == TransportKind::Volunteer {
                    self.config.volunteer_transfer_process_time
                } else {
                    self.config.transfer_process_time
                };
                let duration = self.rng.uniform_int(range.0, range.1) as f64;
                self.assign_staff(staff_id, id, duration);
                self.depart_origin(id, origin);
                let p = self.patients.get_mut(&id).unwrap();
                p.status = PatientStatus::InTransit;
                p.transport_assigned_time = Some(self.sim_time);
                self.queue.schedule(
                    self.sim_time + duration,
                    Event::TransportComplete { patient: id, destination, kind, track_boarding },
                );
            }
            None => self.retry_later(id, Stage::Transport { destination, track_boarding }),
        }
    }

    fn depart_origin(&mut self, id: PatientId, origin: UnitName) {
        if let Some(unit) = self.units.get_mut(&origin) {
            if unit.discharge_patient(id) {
                self.metrics.record_occupancy(origin, self.sim_time, unit.occupied());
                self.pull_unit_queue(origin);
            }
        }
    }

    fn handle_transport_complete(
        &mut self,
        id: PatientId,
        destination: UnitName,
        kind: TransportKind,
        track_boarding: bool,
    ) {
        self.metrics.record_transport(kind);
        if kind == TransportKind::Pulley {
            self.broker.release_pulley();
        }
        self.release_staff_holding(id);

        let (request_time, assigned_time) = {
            let p = &self.patients[&id];
            (p.transport_request_time, p.transport_assigned_time)
        };
        if track_boarding {
            if let Some(requested) = request_time {
                self.metrics.record_transfer_time_to_admit(self.sim_time - requested);
            }
        }
        if kind != TransportKind::Pulley {
            if let (Some(requested), Some(assigned)) = (request_time, assigned_time) {
                self.metrics.record_ed_wait_for_transport(assigned - requested);
            }
        }

        let p = self.patients.get_mut(&id).unwrap();
        p.current_unit = Some(destination);
        p.transport_request_time = None;
        p.transport_assigned_time = None;
        if track_boarding {
            self.clear_boarding_and_record(id);
        }
        self.try_admit_or_queue(id, destination);
    }

    // -- units: admit, queue, begin stay --------------------------------

    fn try_admit_or_queue(&mut self, id: PatientId, unit: UnitName) {
        let admitted = self.units.get_mut(&unit).unwrap().admit_patient(id);
        if admitted {
            self.patients.get_mut(&id).unwrap().current_unit = Some(unit);
            self.metrics.record_occupancy(unit, self.sim_time, self.units[&unit].occupied());
            if unit == UnitName::Ed {
                self.clear_boarding_and_record(id);
            }
            self.begin_unit_stay(id, unit);
        } else {
            let p = self.patients.get_mut(&id).unwrap();
            p.status = PatientStatus::Waiting;
            let priority = p.acuity.transport_priority();
            let arrival = p.arrival_time;
            if unit == UnitName::Ed && p.boarding_start.is_none() {
                p.boarding_start = Some(self.sim_time);
            }
            self.units.get_mut(&unit).unwrap().enqueue(id, priority, arrival);
        }
    }

    fn clear_boarding_and_record(&mut self, id: PatientId) {
        let p = self.patients.get_mut(&id).unwrap();
        if let Some(start) = p.boarding_start.take() {
            let wait = self.sim_time - start;
            self.metrics.record_ed_boarding_wait(wait);
        }
    }

    fn pull_unit_queue(&mut self, unit: UnitName) {
        loop {
            let has_room = self.units[&unit].has_free_bed();
            if !has_room {
                return;
            }
            let Some(next) = self.units.get_mut(&unit).unwrap().pop_waiting() else {
                return;
            };
            self.units.get_mut(&unit).unwrap().admit_patient(next);
            self.patients.get_mut(&next).unwrap().current_unit = Some(unit);
            self.metrics.record_occupancy(unit, self.sim_time, self.units[&unit].occupied());
            if unit == UnitName::Ed {
                self.clear_boarding_and_record(next);
            }
            self.begin_unit_stay(next, unit);
        }
    }

    fn begin_unit_stay(&mut self, id: PatientId, unit: UnitName) {
        let acuity = self.patients[&id].acuity;
        match unit {
            UnitName::Ed => {
                self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingAssessment;
                self.try_assign_assessment(id);
            }
            UnitName::Inpatient => {
                let p = self.patients.get_mut(&id).unwrap();
                p.status = PatientStatus::Admitted;
                p.admitted_at = Some(self.sim_time);
                let range = self.config.inpatient_stay_time[&acuity];
                let stay = self.rng.uniform_int(range.0, range.1) as f64;
                let interval = self.config.inpatient_cdu_check_interval as f64;
                self.queue
                    .schedule(self.sim_time + stay, Event::InpatientPatientCheck { patient: id });
                self.queue
                    .schedule(self.sim_time + interval, Event::InpatientPatientCheck { patient: id });
            }
            UnitName::Cdu => {
                self.patients.get_mut(&id).unwrap().status = PatientStatus::Admitted;
                self.metrics.record_cdu_admission();
                let range = self.config.cdu_observation_time;
                let duration = self.rng.uniform_int(range.0, range.1) as f64;
                self.queue
                    .schedule(self.sim_time + duration, Event::CduObservationComplete { patient: id });
            }
            UnitName::ImagingCt | UnitName::ImagingMri | UnitName::Lab => {
                self.patients.get_mut(&id).unwrap().status = PatientStatus::InDiagnostics;
                self.try_start_diagnostic_processing(id, unit);
            }
            UnitName::Radiology => {}
        }
    }

    // -- diagnostics -----------------------------------------------------

    /// Imaging/lab processing requires a tech from the destination unit's
    /// roster, same as every other resource-gated stage; retries TICK if
    /// none are free.
    fn try_start_diagnostic_processing(&mut self, id: PatientId, unit: UnitName) {
        match self.find_free_staff_in_unit(unit, StaffType::Tech) {
            Some(staff_id) => {
                let duration = if unit == UnitName::Lab {
                    let range = self.config.lab_processing_time;
                    self.rng.uniform_int(range.0, range.1) as f64
                } else {
                    let modality = self.patients[&id].imaging_modality.unwrap_or(ImagingModality::Ct);
                    let range = self.config.imaging_processing_time[&modality];
                    self.rng.uniform_int(range.0, range.1) as f64
                };
                self.assign_staff(staff_id, id, duration);
                self.queue.schedule(
                    self.sim_time + duration,
                    Event::DiagnosticProcessingComplete { patient: id, unit },
                );
            }
            None => self.retry_later(id, Stage::DiagnosticStart { unit }),
        }
    }

    fn handle_diagnostic_processing_complete(&mut self, id: PatientId, unit: UnitName) {
        self.release_staff_holding(id);
        if let Some(u) = self.units.get_mut(&unit) {
            u.discharge_patient(id);
            self.metrics.record_occupancy(unit, self.sim_time, u.occupied());
        }
        self.pull_unit_queue(unit);

        if unit == UnitName::Lab {
            self.metrics.record_lab();
        } else {
            self.metrics.record_imaging();
        }

        if unit == UnitName::Lab {
            self.queue
                .schedule(self.sim_time, Event::DiagnosticReportReady { patient: id, unit });
        } else {
            self.try_assign_report(id, unit);
        }
    }

    fn try_assign_report(&mut self, id: PatientId, unit: UnitName) {
        match self.find_free_staff_in_unit(UnitName::Radiology, StaffType::Radiologist) {
            Some(staff_id) => {
                let acuity = self.patients[&id].acuity;
                let class = if acuity == Acuity::Critical {
                    ReportClass::Critical
                } else {
                    ReportClass::Routine
                };
                let range = self.config.imaging_reporting_time[&class];
                let mut duration = self.rng.uniform_int(range.0, range.1) as f64;
                if self.config.enable_ai_imaging {
                    let reduction = match class {
                        ReportClass::Critical => self.config.ai_critical_reduction,
                        ReportClass::Routine => self.config.ai_routine_prelim_reduction,
                    };
                    duration *= 1.0 - reduction;
                }
                self.assign_staff(staff_id, id, duration);
                self.queue.schedule(
                    self.sim_time + duration,
                    Event::DiagnosticReportReady { patient: id, unit },
                );
            }
            None => self.retry_later(id, Stage::DiagnosticProcessing { unit }),
        }
    }

    fn handle_diagnostic_report_ready(&mut self, id: PatientId, unit: UnitName) {
        self.release_staff_holding(id);
        let (ordered_at, origin, acuity) = {
            let p = &self.patients[&id];
            (p.diagnostics_ordered_at, p.diagnostics_origin, p.acuity)
        };

        let p = self.patients.get_mut(&id).unwrap();
        if unit == UnitName::Lab {
            p.needs_lab = false;
        } else {
            p.needs_imaging = false;
        }
        p.diagnostics_complete_at = Some(self.sim_time);
        if let Some(origin) = origin {
            p.current_unit = Some(origin);
        }
        p.diagnostics_origin = None;

        if unit != UnitName::Lab {
            if let Some(ordered_at) = ordered_at {
                self.metrics.record_imaging_tat(
                    self.sim_time - ordered_at,
                    acuity == Acuity::Critical,
                    matches!(origin, Some(UnitName::Ed) | Some(UnitName::Cdu)),
                );
            }
        }

        self.queue
            .schedule(self.sim_time, Event::ReEvaluateAfterDiagnostics { patient: id });
    }

    // -- disposition -----------------------------------------------------

    fn resolve_disposition(&mut self, id: PatientId) {
        let acuity = self.patients[&id].acuity;
        match Self::determine_disposition(acuity, &self.config, &mut self.rng) {
            Disposition::Discharge => {
                self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingDischarge;
                self.begin_discharge_process(id);
            }
            Disposition::Admit(unit) => {
                self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingTransport;
                self.request_move(id, unit, true);
            }
        }
    }

    fn determine_disposition(acuity: Acuity, config: &Config, rng: &mut SimRng) -> Disposition {
        match acuity {
            Acuity::Critical | Acuity::UrgentAdmit => Disposition::Admit(UnitName::Inpatient),
            Acuity::UrgentObs => {
                if config.enable_cdu && rng.bernoulli(config.cdu_criteria_match) {
                    Disposition::Admit(UnitName::Cdu)
                } else {
                    Disposition::Admit(UnitName::Inpatient)
                }
            }
            Acuity::NonUrgent => {
                if config.enable_cdu && rng.bernoulli(NON_URGENT_CDU_THRESHOLD) {
                    Disposition::Admit(UnitName::Cdu)
                } else {
                    Disposition::Discharge
                }
            }
        }
    }

    fn begin_discharge_process(&mut self, id: PatientId) {
        let unit = self.patients[&id].current_unit.unwrap_or(UnitName::Ed);
        match self.find_free_staff_in_unit(unit, StaffType::Nurse) {
            Some(staff_id) => {
                let range = self.config.discharge_process_time;
                let mut duration = self.rng.uniform_int(range.0, range.1) as f64;
                if self.config.enable_ai_staffing {
                    duration *= 1.0 - self.config.ai_discharge_reduction;
                }
                self.assign_staff(staff_id, id, duration);
                self.queue
                    .schedule(self.sim_time + duration, Event::DischargeProcessComplete { patient: id });
            }
            None => self.retry_later(id, Stage::Discharge),
        }
    }

    /// `U(0,1) < 0.80` counts as a conversion (discharged straight from
    /// observation); otherwise the patient still needs an inpatient bed.
    fn handle_cdu_observation_complete(&mut self, id: PatientId) {
        if self.rng.bernoulli(0.80) {
            self.metrics.record_cdu_conversion();
            self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingDischarge;
            self.begin_discharge_process(id);
        } else {
            self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingTransport;
            self.request_move(id, UnitName::Inpatient, true);
        }
    }

    /// A patient is checked both at the drawn stay duration and on the
    /// fixed check interval; whichever fires first may discharge them,
    /// after which the other is a stale no-op.
    fn handle_inpatient_patient_check(&mut self, id: PatientId) {
        let p = &self.patients[&id];
        if p.status != PatientStatus::Admitted {
            return;
        }
        let acuity = p.acuity;
        let admitted_at = p.admitted_at.unwrap_or(self.sim_time);
        let elapsed = self.sim_time - admitted_at;
        let min_stay = self.config.inpatient_stay_time[&acuity].0 as f64;
        if elapsed >= min_stay && self.rng.bernoulli(0.85) {
            self.patients.get_mut(&id).unwrap().status = PatientStatus::AwaitingDischarge;
            self.begin_discharge_process(id);
        } else {
            let interval = self.config.inpatient_cdu_check_interval as f64;
            self.queue
                .schedule(self.sim_time + interval, Event::InpatientPatientCheck { patient: id });
        }
    }

    fn handle_discharge_process_complete(&mut self, id: PatientId) {
        self.release_staff_holding(id);
        let unit = self.patients[&id].current_unit.unwrap_or(UnitName::Ed);
        if let Some(u) = self.units.get_mut(&unit) {
            u.discharge_patient(id);
            self.metrics.record_occupancy(unit, self.sim_time, u.occupied());
        }
        self.pull_unit_queue(unit);

        let score = self.satisfaction_score(id);
        let p = self.patients.get_mut(&id).unwrap();
        p.status = PatientStatus::Discharged;
        p.discharge_time = Some(self.sim_time);
        p.satisfaction_score = Some(score);
        let los = p.total_length_of_stay(self.sim_time);
        self.metrics.record_discharge(los);
        self.metrics.record_satisfaction(score);
        debug!(patient = id, los, score, "patient discharged");
    }

    /// `L<=30` minutes is a perfect stay, `L>=480` is as bad as it gets;
    /// between those it interpolates linearly.
    fn satisfaction_score(&self, id: PatientId) -> f64 {
        let patient = &self.patients[&id];
        let los = patient.total_length_of_stay(self.sim_time);
        let mut score = if los <= 30.0 {
            100.0
        } else if los >= 480.0 {
            1.0
        } else {
            100.0 - ((los - 30.0) / 450.0) * 99.0
        };
        if self.config.enable_amenities {
            score += self.config.satisfaction_amenities_bonus;
        }
        if self.config.enable_ai_entertainment {
            score += self.config.satisfaction_entertainment_bonus;
        }
        score.clamp(1.0, 100.0)
    }

    // -- periodic / housekeeping ------------------------------------------

    fn handle_metrics_checkpoint(&mut self) {
        for unit in UnitName::ALL {
            self.metrics.record_occupancy(unit, self.sim_time, self.units[&unit].occupied());
        }
        self.metrics.record_pulley_occupancy(self.sim_time, self.broker.pulley_in_use());
        self.queue.schedule(
            self.sim_time + self.config.tick_interval_minutes as f64,
            Event::MetricsCheckpoint,
        );
    }

    /// No-op by design: the original staffing-adjustment hook never altered
    /// any roster, it only rescheduled itself. Kept as a faithful stub
    /// rather than a real mechanic.
    fn handle_ai_staffing_adjustment(&mut self) {
        self.queue.schedule(
            self.sim_time + self.config.tick_interval_minutes as f64,
            Event::AiStaffingAdjustment,
        );
    }

    fn handle_retry(&mut self, id: PatientId, stage: Stage) {
        match stage {
            Stage::Assessment => self.try_assign_assessment(id),
            Stage::Transport { destination, track_boarding } => {
                self.request_move(id, destination, track_boarding)
            }
            Stage::DiagnosticStart { unit } => self.try_start_diagnostic_processing(id, unit),
            Stage::DiagnosticProcessing { unit } => self.try_assign_report(id, unit),
            Stage::Discharge => self.begin_discharge_process(id),
        }
    }

    fn retry_later(&mut self, id: PatientId, stage: Stage) {
        self.queue.schedule(
            self.sim_time + self.config.tick_interval_minutes as f64,
            Event::Retry { patient: id, stage },
        );
    }

    // -- staff lookups -----------------------------------------------------

    /// Least-recently-busy selection: among free candidates, the one with
    /// the smallest `busy_until` goes first.
    fn find_free_staff_in_unit(&self, unit: UnitName, staff_type: StaffType) -> Option<StaffId> {
        self.roster
            .get(&(unit, staff_type))?
            .iter()
            .copied()
            .filter(|id| self.staff[id].is_free(self.sim_time))
            .min_by(|a, b| {
                self.staff[a]
                    .busy_until
                    .partial_cmp(&self.staff[b].busy_until)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    fn find_free_pool_staff(&self, pool: &[StaffId]) -> Option<StaffId> {
        pool.iter()
            .copied()
            .filter(|id| self.staff[id].is_free(self.sim_time))
            .min_by(|a, b| {
                self.staff[a]
                    .busy_until
                    .partial_cmp(&self.staff[b].busy_until)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    fn assign_staff(&mut self, staff_id: StaffId, patient_id: PatientId, duration: f64) {
        let sim_time = self.sim_time;
        let config = &self.config;
        self.staff.get_mut(&staff_id).unwrap().assign(patient_id, sim_time, duration, config);
    }

    fn release_staff_holding(&mut self, patient_id: PatientId) {
        for staff in self.staff.values_mut() {
            if staff.current_patient == Some(patient_id) {
                staff.release();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_run_produces_arrivals_and_discharges() {
        let mut config = Config::baseline();
        config.sim_days = 1;
        config.rng_seed = 7;
        let engine = Engine::new(config);
        let report = engine.run();
        assert!(report.total_arrivals > 0);
        assert!(report.total_discharges <= report.total_arrivals);
    }

    #[test]
    fn deterministic_given_same_seed() {
        let mut config = Config::baseline();
        config.sim_days = 1;
        config.rng_seed = 42;
        let report_a = Engine::new(config.clone()).run();
        let report_b = Engine::new(config).run();
        assert_eq!(report_a.total_arrivals, report_b.total_arrivals);
        assert_eq!(report_a.total_discharges, report_b.total_discharges);
    }

    #[test]
    fn never_exceeds_unit_capacity() {
        let mut config = Config::baseline();
        config.sim_days = 2;
        config.unit_capacity.insert(UnitName::Ed, 3);
        config.rng_seed = 3;
        let engine = Engine::new(config);
        // capacity invariant is enforced structurally by Unit::admit_patient;
        // a run that completes without panicking demonstrates it held.
        let _ = engine.run();
    }

    #[test]
    fn cdu_enabled_admits_some_patients_to_cdu() {
        let mut config = Config::baseline();
        config.sim_days = 3;
        config.enable_cdu = true;
        config.cdu_criteria_match = 1.0;
        config.rng_seed = 11;
        let engine = Engine::new(config);
        let report = engine.run();
        assert!(report.total_discharges > 0);
    }

    proptest::proptest! {
        #[test]
        fn discharges_never_exceed_arrivals_for_any_seed(seed in 0u64..10_000) {
            let mut config = Config::baseline();
            config.sim_days = 2;
            config.rng_seed = seed;
            let report = Engine::new(config).run();
            proptest::prop_assert!(report.total_discharges <= report.total_arrivals);
            if report.total_discharges > 0 {
                proptest::prop_assert!(report.average_satisfaction_score >= 1.0);
                proptest::prop_assert!(report.average_satisfaction_score <= 100.0);
            }
        }

        #[test]
        fn same_seed_is_always_deterministic(seed in 0u64..10_000) {
            let mut config = Config::baseline();
            config.sim_days = 1;
            config.rng_seed = seed;
            let a = Engine::new(config.clone()).run();
            let b = Engine::new(config).run();
            proptest::prop_assert_eq!(a.total_arrivals, b.total_arrivals);
            proptest::prop_assert_eq!(a.total_discharges, b.total_discharges);
        }
    }
}
