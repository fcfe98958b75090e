//! Pack health verdict from state of health and anomaly count.

use cellscope_core::Verdict;

/// Below this SoH (percent) a pack needs service.
pub const SERVICE_SOH_PERCENT: f64 = 80.0;
/// Below this SoH (percent) a pack is degraded.
pub const DEGRADED_SOH_PERCENT: f64 = 90.0;
/// More anomalous cells than this means service.
pub const SERVICE_ANOMALY_COUNT: usize = 5;

pub fn verdict(state_of_health: f64, anomaly_count: usize) -> Verdict {
    if state_of_health < SERVICE_SOH_PERCENT || anomaly_count > SERVICE_ANOMALY_COUNT {
        Verdict::ServiceRequired
    } else if state_of_health < DEGRADED_SOH_PERCENT || anomaly_count > 0 {
        Verdict::Degraded
    } else {
        Verdict::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_soh_requires_service() {
        assert_eq!(verdict(75.0, 0), Verdict::ServiceRequired);
    }

    #[test]
    fn many_anomalies_require_service() {
        assert_eq!(verdict(99.0, 6), Verdict::ServiceRequired);
        assert_eq!(verdict(99.0, 5), Verdict::Degraded);
    }

    #[test]
    fn any_anomaly_degrades() {
        assert_eq!(verdict(95.0, 1), Verdict::Degraded);
    }

    #[test]
    fn soh_boundaries() {
        assert_eq!(verdict(80.0, 0), Verdict::Degraded);
        assert_eq!(verdict(89.9, 0), Verdict::Degraded);
        assert_eq!(verdict(90.0, 0), Verdict::Good);
    }

    #[test]
    fn healthy_pack_is_good() {
        assert_eq!(verdict(98.0, 0), Verdict::Good);
    }
}
