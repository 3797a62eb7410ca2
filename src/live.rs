//! Normalization of live status payloads.
//!
//! Status updates reach the console in three shapes:
//!
//! * a push-channel envelope, `{"data": {...}}`;
//! * a flat poll response carrying a `simulation_time` field;
//! * the legacy canonical shape, already in camelCase with `simulationTime`.
//!
//! [RawStatus::classify] tells them apart by the fields present, and
//! [RawStatus::into_stats] maps all of them onto [LiveStats].

use crate::error::{Error, Result};
use crate::util::lenient::to_count;
use serde::Serialize;
use serde_json::{Map, Value};

/// The canonical live statistics record shown on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStats {
    /// Simulation time in s.
    pub simulation_time: f64,
    pub running_vehicles: u32,
    /// Average speed in m/s.
    pub average_speed: f64,
    /// Vehicles per hour.
    pub throughput: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halting_vehicles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissions: Option<f64>,
}

/// Spellings of each status field, most preferred first.
const SIMULATION_TIME: &[&str] = &["simulation_time", "simulationTime", "time"];
const ACTIVE_VEHICLES: &[&str] = &[
    "active_vehicles",
    "running_vehicles",
    "runningVehicles",
    "vehicle_count",
];
const AVG_SPEED: &[&str] = &["avg_speed", "average_speed", "averageSpeed", "mean_speed"];
const THROUGHPUT: &[&str] = &["throughput"];
const HALTING_VEHICLES: &[&str] = &["halting_vehicles", "haltingVehicles", "halting"];
const EMISSIONS: &[&str] = &["emissions", "co2_emissions", "total_emissions"];

/// The fields of a status message, whatever they were called on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusFields {
    pub simulation_time: f64,
    pub active_vehicles: u32,
    pub avg_speed: f64,
    pub throughput: f64,
    pub halting_vehicles: Option<u32>,
    pub emissions: Option<f64>,
}

impl StatusFields {
    /// Reads the fields of a status object.
    ///
    /// Where a field has several spellings the first one holding a number
    /// wins. Missing, `null` and non-numeric fields count as absent.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let number = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| object.get(*key).and_then(Value::as_f64))
        };
        Self {
            simulation_time: number(SIMULATION_TIME).unwrap_or_default(),
            active_vehicles: number(ACTIVE_VEHICLES).map(to_count).unwrap_or_default(),
            avg_speed: number(AVG_SPEED).unwrap_or_default(),
            throughput: number(THROUGHPUT).unwrap_or_default(),
            halting_vehicles: number(HALTING_VEHICLES).map(to_count),
            emissions: number(EMISSIONS),
        }
    }
}

/// A status payload, discriminated by shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawStatus {
    /// `{"data": {...}}` from the push channel.
    Envelope(StatusFields),
    /// A flat object with `simulation_time`, from a direct poll.
    Flat(StatusFields),
    /// Already in canonical form.
    Legacy(LiveStats),
}

impl RawStatus {
    /// Works out which shape a payload has and parses it.
    pub fn classify(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or(Error::UnrecognisedPayload)?;
        if let Some(data) = object.get("data").and_then(Value::as_object) {
            log::debug!("status payload is a push envelope");
            return Ok(RawStatus::Envelope(StatusFields::from_object(data)));
        }
        if object.contains_key("simulation_time") {
            log::debug!("status payload is a flat poll response");
            return Ok(RawStatus::Flat(StatusFields::from_object(object)));
        }
        if object.contains_key("simulationTime") {
            log::debug!("status payload is in legacy form");
            return Ok(RawStatus::Legacy(StatusFields::from_object(object).into()));
        }
        Err(Error::UnrecognisedPayload)
    }

    pub fn into_stats(self) -> LiveStats {
        match self {
            RawStatus::Envelope(fields) | RawStatus::Flat(fields) => fields.into(),
            RawStatus::Legacy(stats) => stats,
        }
    }
}

impl From<StatusFields> for LiveStats {
    fn from(fields: StatusFields) -> Self {
        Self {
            simulation_time: fields.simulation_time,
            running_vehicles: fields.active_vehicles,
            average_speed: fields.avg_speed,
            throughput: fields.throughput,
            halting_vehicles: fields.halting_vehicles,
            emissions: fields.emissions,
        }
    }
}

impl LiveStats {
    /// Normalizes a status payload of any known shape.
    pub fn normalize(value: &Value) -> Result<Self> {
        RawStatus::classify(value).map(RawStatus::into_stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_poll_response() {
        let stats = LiveStats::normalize(&json!({
            "simulation_time": 120,
            "active_vehicles": 42,
            "avg_speed": 8.3,
            "throughput": 900
        }))
        .unwrap();
        assert_eq!(stats.simulation_time, 120.0);
        assert_eq!(stats.running_vehicles, 42);
        assert_eq!(stats.average_speed, 8.3);
        assert_eq!(stats.throughput, 900.0);
        assert_eq!(stats.halting_vehicles, None);
    }

    #[test]
    fn push_envelope() {
        let raw = RawStatus::classify(&json!({
            "data": {"simulation_time": 30.5, "running_vehicles": 7.0, "halting_vehicles": 2}
        }))
        .unwrap();
        assert!(matches!(raw, RawStatus::Envelope(_)));
        let stats = raw.into_stats();
        assert_eq!(stats.simulation_time, 30.5);
        assert_eq!(stats.running_vehicles, 7);
        assert_eq!(stats.halting_vehicles, Some(2));
        assert_eq!(stats.average_speed, 0.0);
    }

    #[test]
    fn empty_envelope_defaults_to_zero() {
        let stats = LiveStats::normalize(&json!({"data": {}})).unwrap();
        assert_eq!(stats, LiveStats::default());
    }

    #[test]
    fn legacy_shape_passes_through() {
        let stats = LiveStats::normalize(&json!({
            "simulationTime": 10,
            "runningVehicles": 3,
            "averageSpeed": 12.5,
            "throughput": 60,
            "emissions": 1.25
        }))
        .unwrap();
        assert_eq!(stats.running_vehicles, 3);
        assert_eq!(stats.average_speed, 12.5);
        assert_eq!(stats.emissions, Some(1.25));
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        assert!(matches!(
            LiveStats::normalize(&json!({"vehicles": 3})),
            Err(Error::UnrecognisedPayload)
        ));
        assert!(matches!(
            LiveStats::normalize(&json!([1, 2, 3])),
            Err(Error::UnrecognisedPayload)
        ));
        // A non-object `data` field is not an envelope.
        assert!(matches!(
            LiveStats::normalize(&json!({"data": 5})),
            Err(Error::UnrecognisedPayload)
        ));
    }

    #[test]
    fn null_fields_read_as_zero() {
        let stats = LiveStats::normalize(&json!({
            "data": {"simulation_time": 120, "active_vehicles": 42, "avg_speed": null, "emissions": null}
        }))
        .unwrap();
        assert_eq!(stats.simulation_time, 120.0);
        assert_eq!(stats.running_vehicles, 42);
        assert_eq!(stats.average_speed, 0.0);
        assert_eq!(stats.emissions, None);
    }

    #[test]
    fn repeated_spellings_prefer_the_first() {
        let stats = LiveStats::normalize(&json!({
            "simulation_time": 120,
            "active_vehicles": 42,
            "running_vehicles": 40,
            "averageSpeed": 9.0
        }))
        .unwrap();
        assert_eq!(stats.running_vehicles, 42);
        assert_eq!(stats.average_speed, 9.0);

        // A null preferred spelling falls through to the next one.
        let stats = LiveStats::normalize(&json!({
            "data": {"active_vehicles": null, "running_vehicles": 7}
        }))
        .unwrap();
        assert_eq!(stats.running_vehicles, 7);
    }

    #[test]
    fn canonical_form_round_trips_through_the_adapter() {
        let stats = LiveStats {
            simulation_time: 5.0,
            running_vehicles: 2,
            average_speed: 3.0,
            throughput: 4.0,
            halting_vehicles: Some(1),
            emissions: None,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(LiveStats::normalize(&value).unwrap(), stats);
    }
}
