use super::kpi::TimeSample;
use super::series::hour_label;
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

/// Average traffic for one hour of the day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: usize,
    pub label: String,
    /// The number of samples that fell in this hour.
    pub samples: u32,
    pub avg_vehicle_count: f64,
    /// Average speed in m/s.
    pub avg_speed: f64,
}

/// The hour of day (0-23) a simulation time in s falls in.
pub fn hour_of_day(time: f64) -> usize {
    ((time / 3600.0).floor() as i64).rem_euclid(HOURS_PER_DAY as i64) as usize
}

/// Buckets samples by hour of day and averages each bucket.
/// Hours without samples report zeros.
pub fn hourly_profile(samples: &[TimeSample]) -> Vec<HourlyBucket> {
    let mut counts = [0u32; HOURS_PER_DAY];
    let mut vehicles = [0.0; HOURS_PER_DAY];
    let mut speeds = [0.0; HOURS_PER_DAY];

    for sample in samples {
        let hour = hour_of_day(sample.time);
        counts[hour] += 1;
        vehicles[hour] += sample.vehicle_count;
        speeds[hour] += sample.avg_speed;
    }

    (0..HOURS_PER_DAY)
        .map(|hour| {
            let n = counts[hour];
            let mean = |total: f64| if n == 0 { 0.0 } else { total / n as f64 };
            HourlyBucket {
                hour,
                label: hour_label(hour),
                samples: n,
                avg_vehicle_count: mean(vehicles[hour]),
                avg_speed: mean(speeds[hour]),
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(time: f64, vehicle_count: f64, avg_speed: f64) -> TimeSample {
        TimeSample {
            time,
            vehicle_count,
            avg_speed,
            ..Default::default()
        }
    }

    #[test]
    fn one_sample_per_hour_is_reproduced() {
        let samples = (0..24)
            .map(|h| sample(h as f64 * 3600.0 + 1800.0, 10.0 + h as f64, 0.5 * h as f64))
            .collect::<Vec<_>>();
        let profile = hourly_profile(&samples);
        assert_eq!(profile.len(), 24);
        for (h, bucket) in profile.iter().enumerate() {
            assert_eq!(bucket.hour, h);
            assert_eq!(bucket.samples, 1);
            assert_eq!(bucket.avg_vehicle_count, samples[h].vehicle_count);
            assert_eq!(bucket.avg_speed, samples[h].avg_speed);
        }
    }

    #[test]
    fn averages_and_empty_hours() {
        let samples = [
            sample(0.0, 10.0, 5.0),
            sample(600.0, 20.0, 15.0),
            sample(25.0 * 3600.0, 4.0, 2.0),
        ];
        let profile = hourly_profile(&samples);
        assert_eq!(profile[0].samples, 2);
        assert_eq!(profile[0].avg_vehicle_count, 15.0);
        assert_eq!(profile[0].avg_speed, 10.0);
        // The second day wraps onto the same hours.
        assert_eq!(profile[1].avg_vehicle_count, 4.0);
        assert_eq!(profile[2].samples, 0);
        assert_eq!(profile[2].avg_vehicle_count, 0.0);
        assert_eq!(profile[2].label, "02:00");
    }
}
