use super::kpi::TimeSample;
use super::series::clock_label;
use super::Severity;
use serde::Serialize;

/// Teleports in a single sample above this count mark a critical period.
pub const TELEPORT_LIMIT: u32 = 2;

/// A moment in the run that deserves attention.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CriticalPeriod {
    /// Simulation time in s.
    pub time: f64,
    pub label: String,
    pub severity: Severity,
    pub collisions: u32,
    pub teleports: u32,
}

/// Flags samples with any collision (high) or too many teleports (medium).
pub fn critical_periods(samples: &[TimeSample]) -> Vec<CriticalPeriod> {
    samples
        .iter()
        .filter_map(|sample| {
            let severity = if sample.collisions > 0 {
                Severity::High
            } else if sample.teleports > TELEPORT_LIMIT {
                Severity::Medium
            } else {
                return None;
            };
            Some(CriticalPeriod {
                time: sample.time,
                label: clock_label(sample.time),
                severity,
                collisions: sample.collisions,
                teleports: sample.teleports,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_collisions_and_teleports() {
        let sample = |time, collisions, teleports| TimeSample {
            time,
            collisions,
            teleports,
            ..Default::default()
        };
        let samples = [
            sample(0.0, 0, 0),
            sample(60.0, 1, 0),
            sample(120.0, 0, 2),
            sample(180.0, 0, 3),
            sample(240.0, 2, 5),
        ];
        let periods = critical_periods(&samples);
        let flagged = periods
            .iter()
            .map(|p| (p.time, p.severity))
            .collect::<Vec<_>>();
        assert_eq!(
            flagged,
            [
                (60.0, Severity::High),
                (180.0, Severity::Medium),
                (240.0, Severity::High)
            ]
        );
        assert_eq!(periods[1].label, "00:03:00");
    }
}
