//! Push-channel events and the in-process bus that delivers them.

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::live::RawStatus;
use crate::snapshot::SimulationSnapshot;
use crate::SubscriptionId;
use serde::Deserialize;
use serde_json::{json, Value};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// The status the engine reports for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Running,
    Paused,
    #[serde(alias = "completed")]
    Stopped,
    Finished,
    Error,
    #[serde(other)]
    Unknown,
}

/// A `simulation_status` message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatusUpdate {
    pub status: EngineStatus,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// An event received from the push channel.
#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    /// `simulation_stats`
    SimulationStats(RawStatus),
    /// `simulation_data`
    SimulationData(Box<SimulationSnapshot>),
    /// `simulation_status`
    SimulationStatus(StatusUpdate),
    /// `connection_status`, `connect` or `disconnect`
    Connection { connected: bool },
}

/// The kinds of [PushEvent], for filtering subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Stats,
    Data,
    Status,
    Connection,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Stats,
        EventKind::Data,
        EventKind::Status,
        EventKind::Connection,
    ];
}

impl PushEvent {
    /// Parses an event as it arrives on the wire.
    pub fn from_wire(name: &str, payload: &Value) -> Result<Self> {
        let event = match name {
            "simulation_stats" => PushEvent::SimulationStats(RawStatus::classify(payload)?),
            "simulation_data" => {
                let data = payload
                    .get("data")
                    .filter(|data| data.is_object())
                    .unwrap_or(payload);
                PushEvent::SimulationData(Box::new(SimulationSnapshot::deserialize(data)?))
            }
            "simulation_status" => PushEvent::SimulationStatus(StatusUpdate::deserialize(payload)?),
            "connect" => PushEvent::Connection { connected: true },
            "disconnect" => PushEvent::Connection { connected: false },
            "connection_status" => PushEvent::Connection {
                connected: parse_connected(payload),
            },
            _ => return Err(Error::UnrecognisedPayload),
        };
        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            PushEvent::SimulationStats(_) => EventKind::Stats,
            PushEvent::SimulationData(_) => EventKind::Data,
            PushEvent::SimulationStatus(_) => EventKind::Status,
            PushEvent::Connection { .. } => EventKind::Connection,
        }
    }
}

/// `connection_status` is sent either as `{"connected": bool}` or `{"status": "connected"}`.
fn parse_connected(payload: &Value) -> bool {
    if let Some(connected) = payload.get("connected").and_then(Value::as_bool) {
        return connected;
    }
    matches!(
        payload.get("status").and_then(Value::as_str),
        Some("connected") | Some("connect")
    )
}

/// An event the console emits for the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum OutboundEvent {
    SimulationLaunched { session_id: String },
    ConfigSaved { config: SimulationConfig },
}

impl OutboundEvent {
    /// The wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::SimulationLaunched { .. } => "simulation_launched",
            OutboundEvent::ConfigSaved { .. } => "config_saved",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            OutboundEvent::SimulationLaunched { session_id } => json!({ "sessionId": session_id }),
            OutboundEvent::ConfigSaved { config } => json!({ "config": config }),
        }
    }
}

struct Subscriber {
    kinds: SmallVec<[EventKind; 4]>,
    queue: VecDeque<PushEvent>,
}

/// Delivers push events to subscribers, in the order they were published.
///
/// Each subscription has its own queue which its owner drains. Once a
/// subscription is dropped, nothing more is delivered to it.
#[derive(Default)]
pub struct PushBus {
    subscribers: SlotMap<SubscriptionId, Subscriber>,
}

impl PushBus {
    pub fn new() -> Self {
        Default::default()
    }

    /// Subscribes to the given kinds of event.
    pub fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        self.subscribers.insert(Subscriber {
            kinds: kinds.iter().copied().collect(),
            queue: VecDeque::new(),
        })
    }

    /// Drops a subscription and any events still queued for it.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queues an event for every interested subscriber.
    pub fn publish(&mut self, event: PushEvent) {
        let kind = event.kind();
        for subscriber in self.subscribers.values_mut() {
            if subscriber.kinds.contains(&kind) {
                subscriber.queue.push_back(event.clone());
            }
        }
    }

    /// Parses a wire event and publishes it.
    pub fn publish_wire(&mut self, name: &str, payload: &Value) -> Result<()> {
        let event = PushEvent::from_wire(name, payload).inspect_err(|err| {
            log::warn!("dropping `{}` event: {}", name, err);
        })?;
        self.publish(event);
        Ok(())
    }

    /// Takes the events queued for a subscription.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<PushEvent> {
        self.subscribers
            .get_mut(id)
            .map(|subscriber| subscriber.queue.drain(..).collect())
            .unwrap_or_default()
    }
}
