use crate::acuity::{Acuity, TransportKind, UnitName};
use crate::config::Config;

/// Tracks the shared pulley system's in-flight usage. The rest of the
/// broker's tiers (paid staff, volunteers) are plain `Staff` pool lookups
/// the engine already owns, so only the pulley's capacity needs state here.
#[derive(Debug, Default)]
pub struct TransportBroker {
    pulley_in_use: u32,
}

impl TransportBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulley_eligible(config: &Config, origin: UnitName, destination: UnitName) -> bool {
        config.pulley_eligible_units.contains(&origin)
            && config.pulley_eligible_destinations.contains(&destination)
    }

    pub fn try_reserve_pulley(&mut self, config: &Config, origin: UnitName, destination: UnitName) -> bool {
        if !Self::pulley_eligible(config, origin, destination) {
            return false;
        }
        if !self.pulley_has_capacity(config) {
            return false;
        }
        self.pulley_in_use += 1;
        true
    }

    pub fn pulley_has_capacity(&self, config: &Config) -> bool {
        self.pulley_in_use < config.pulley_system_capacity
    }

    pub fn pulley_in_use(&self) -> u32 {
        self.pulley_in_use
    }

    pub fn release_pulley(&mut self) {
        self.pulley_in_use = self.pulley_in_use.saturating_sub(1);
    }

    /// Volunteers only run a fixed daily window and only carry lower-acuity
    /// patients; `sim_time` is wrapped to minute-of-day first.
    pub fn volunteer_window_open(config: &Config, sim_time: f64) -> bool {
        let minute_of_day = sim_time.rem_euclid(24.0 * 60.0);
        minute_of_day >= config.volunteer_hours_start as f64
            && minute_of_day < config.volunteer_hours_end as f64
    }

    pub fn volunteer_eligible_acuity(config: &Config, acuity: Acuity) -> bool {
        config.volunteer_acuity_eligibility.contains(&acuity)
    }

    /// Determines which tier a transport request should attempt, given
    /// request context. Called by `engine::request_transport` for every
    /// dispatch. Tier order is fixed: pulley, then paid staff for critical
    /// patients (never wait on a volunteer), then volunteer within the time
    /// window, then paid staff as the universal fallback.
    pub fn resolve_tier(
        config: &Config,
        sim_time: f64,
        acuity: Acuity,
        origin: UnitName,
        destination: UnitName,
        pulley_available: bool,
    ) -> TransportTier {
        if pulley_available && Self::pulley_eligible(config, origin, destination) {
            return TransportTier::Pulley;
        }
        if acuity == Acuity::Critical {
            return TransportTier::PaidStaff;
        }
        if Self::volunteer_window_open(config, sim_time) && Self::volunteer_eligible_acuity(config, acuity) {
            return TransportTier::Volunteer;
        }
        TransportTier::PaidStaff
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportTier {
    Pulley,
    PaidStaff,
    Volunteer,
}

impl From<TransportTier> for TransportKind {
    fn from(tier: TransportTier) -> Self {
        match tier {
            TransportTier::Pulley => TransportKind::Pulley,
            TransportTier::PaidStaff => TransportKind::PaidStaff,
            TransportTier::Volunteer => TransportKind::Volunteer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        let mut c = Config::baseline();
        c.pulley_system_capacity = 1;
        c.pulley_eligible_units = vec![UnitName::Ed];
        c.pulley_eligible_destinations = vec![UnitName::ImagingCt];
        c
    }

    #[test]
    fn critical_never_waits_for_volunteer() {
        let config = cfg();
        let tier = TransportBroker::resolve_tier(
            &config,
            config.volunteer_hours_start as f64 + 10.0,
            Acuity::Critical,
            UnitName::Ed,
            UnitName::Inpatient,
            false,
        );
        assert_eq!(tier, TransportTier::PaidStaff);
    }

    #[test]
    fn pulley_takes_priority_when_eligible() {
        let config = cfg();
        let tier = TransportBroker::resolve_tier(
            &config,
            0.0,
            Acuity::NonUrgent,
            UnitName::Ed,
            UnitName::ImagingCt,
            true,
        );
        assert_eq!(tier, TransportTier::Pulley);
    }

    #[test]
    fn volunteer_only_inside_window_and_eligible_acuity() {
        let config = cfg();
        let outside_window = TransportBroker::resolve_tier(
            &config,
            config.volunteer_hours_end as f64 + 60.0,
            Acuity::NonUrgent,
            UnitName::Ed,
            UnitName::Inpatient,
            false,
        );
        assert_eq!(outside_window, TransportTier::PaidStaff);

        let inside_window = TransportBroker::resolve_tier(
            &config,
            config.volunteer_hours_start as f64 + 10.0,
            Acuity::NonUrgent,
            UnitName::Ed,
            UnitName::Inpatient,
            false,
        );
        assert_eq!(inside_window, TransportTier::Volunteer);
    }

    #[test]
    fn pulley_reservation_respects_capacity() {
        let config = cfg();
        let mut broker = TransportBroker::new();
        assert!(broker.try_reserve_pulley(&config, UnitName::Ed, UnitName::ImagingCt));
        assert!(!broker.try_reserve_pulley(&config, UnitName::Ed, UnitName::ImagingCt));
        broker.release_pulley();
        assert!(broker.try_reserve_pulley(&config, UnitName::Ed, UnitName::ImagingCt));
    }
}
