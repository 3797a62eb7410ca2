//! Unit conversion and chart series.

use super::kpi::TimeSample;
use serde::Serialize;

pub fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

pub fn seconds_to_minutes(seconds: f64) -> f64 {
    seconds / 60.0
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

pub fn grams_to_kg(grams: f64) -> f64 {
    grams / 1000.0
}

/// Formats a simulation time in s as `HH:MM:SS`.
pub fn clock_label(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// The label of an hour-of-day bucket, e.g. `08:00`.
pub fn hour_label(hour: usize) -> String {
    format!("{:02}:00", hour)
}

/// The time series a chart can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    VehicleCount,
    Speed,
    Throughput,
    WaitingTime,
    Distance,
    Emissions,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::VehicleCount,
        ChartKind::Speed,
        ChartKind::Throughput,
        ChartKind::WaitingTime,
        ChartKind::Distance,
        ChartKind::Emissions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::VehicleCount => "Vehicles in network",
            ChartKind::Speed => "Average speed",
            ChartKind::Throughput => "Throughput",
            ChartKind::WaitingTime => "Average waiting time",
            ChartKind::Distance => "Distance travelled",
            ChartKind::Emissions => "CO2 emissions",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ChartKind::VehicleCount => "vehicles",
            ChartKind::Speed => "km/h",
            ChartKind::Throughput => "veh/h",
            ChartKind::WaitingTime => "min",
            ChartKind::Distance => "km",
            ChartKind::Emissions => "kg",
        }
    }

    /// The sample's value in this chart's unit.
    pub fn value(self, sample: &TimeSample) -> f64 {
        match self {
            ChartKind::VehicleCount => sample.vehicle_count,
            ChartKind::Speed => ms_to_kmh(sample.avg_speed),
            ChartKind::Throughput => sample.throughput,
            ChartKind::WaitingTime => seconds_to_minutes(sample.waiting_time),
            ChartKind::Distance => meters_to_km(sample.distance),
            ChartKind::Emissions => grams_to_kg(sample.co2),
        }
    }

    pub fn series(self, samples: &[TimeSample]) -> ChartSeries {
        ChartSeries {
            kind: self,
            title: self.title(),
            unit: self.unit(),
            points: samples
                .iter()
                .map(|sample| ChartPoint {
                    label: clock_label(sample.time),
                    time: sample.time,
                    value: self.value(sample),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    /// Simulation time in s.
    pub time: f64,
    pub value: f64,
}

/// A labelled series ready to plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: &'static str,
    pub unit: &'static str,
    pub points: Vec<ChartPoint>,
}

/// Headline numbers for the top of the results page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub average_speed_kmh: f64,
    pub total_throughput: f64,
    pub total_distance_km: f64,
    pub total_co2_kg: f64,
    pub peak_vehicles: f64,
    pub average_waiting_minutes: f64,
}

impl SummaryCards {
    pub fn from_samples(samples: &[TimeSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let sum = |f: fn(&TimeSample) -> f64| samples.iter().map(f).sum::<f64>();
        Self {
            average_speed_kmh: ms_to_kmh(sum(|s| s.avg_speed) / n),
            total_throughput: sum(|s| s.throughput),
            total_distance_km: meters_to_km(sum(|s| s.distance)),
            total_co2_kg: grams_to_kg(sum(|s| s.co2)),
            peak_vehicles: samples
                .iter()
                .map(|s| s.vehicle_count)
                .fold(0.0, f64::max),
            average_waiting_minutes: seconds_to_minutes(sum(|s| s.waiting_time) / n),
        }
    }
}
