pub use analytics::{AnalyticsConfig, DerivedAnalytics, KpiBundle};
pub use backend::{ApiClient, Backend, Transport};
pub use cgmath;
pub use config::SimulationConfig;
pub use control::{Controls, RunController, RunState, UpdateSource};
pub use error::{Action, Error, Result};
pub use events::{PushBus, PushEvent};
pub use live::LiveStats;
pub use network::{Edge, Junction, NetworkGeometry};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
pub use snapshot::SimulationSnapshot;
pub use util::Interval;
pub use vehicle::{VehicleState, VehicleType};

pub mod analytics;
pub mod backend;
pub mod config;
pub mod control;
mod error;
pub mod events;
pub mod live;
pub mod math;
mod network;
pub mod projection;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod setup;
mod snapshot;
mod util;
mod vehicle;
pub mod view;

new_key_type! {
    /// Unique ID of a scheduled frame callback.
    pub struct FrameRequestId;
    /// Unique ID of a [PushBus] subscription.
    pub struct SubscriptionId;
}
