//! Tests that walk a run from setup to results against a scripted backend.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use traffic_console::analytics::{metric, ChartKind, TimeSample};
use traffic_console::backend::{LaunchReply, LaunchRequest, SaveConfigReply};
use traffic_console::events::OutboundEvent;
use traffic_console::render::{RecordingCanvas, RenderStyle};
use traffic_console::scheduler::FrameScheduler;
use traffic_console::session::{MemoryStore, PersistedSession};
use traffic_console::setup::SetupFlow;
use traffic_console::view::{ResultsPage, RunPage};
use traffic_console::{
    Action, AnalyticsConfig, Backend, Error, KpiBundle, PushBus, Result, RunState,
    SimulationConfig, UpdateSource,
};

#[derive(Default)]
struct Script {
    failing: Vec<Action>,
    calls: Vec<Action>,
    launches: usize,
    launched: Vec<LaunchRequest>,
    stats: Value,
    results: KpiBundle,
}

/// A backend whose replies the test controls while a page owns it.
#[derive(Clone, Default)]
struct Scripted(Rc<RefCell<Script>>);

impl Scripted {
    fn fail(&self, action: Action) {
        self.0.borrow_mut().failing.push(action);
    }

    fn recover(&self) {
        self.0.borrow_mut().failing.clear();
    }

    fn calls(&self) -> Vec<Action> {
        self.0.borrow().calls.clone()
    }

    fn check(&self, action: Action) -> Result<()> {
        let mut script = self.0.borrow_mut();
        script.calls.push(action);
        if script.failing.contains(&action) {
            return Err(Error::Request {
                action,
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

impl Backend for Scripted {
    fn save_config(&mut self, _: &SimulationConfig) -> Result<SaveConfigReply> {
        self.check(Action::SaveConfig)?;
        Ok(SaveConfigReply::default())
    }

    fn launch(&mut self, request: &LaunchRequest) -> Result<LaunchReply> {
        self.check(Action::Launch)?;
        let mut script = self.0.borrow_mut();
        script.launches += 1;
        script.launched.push(request.clone());
        Ok(LaunchReply {
            session_id: format!("session-{}", script.launches),
        })
    }

    fn pause(&mut self, _: &str) -> Result<()> {
        self.check(Action::Pause)
    }

    fn resume(&mut self, _: &str) -> Result<()> {
        self.check(Action::Resume)
    }

    fn stop(&mut self, _: &str) -> Result<()> {
        self.check(Action::Stop)
    }

    fn stats(&mut self, _: &str) -> Result<Value> {
        self.check(Action::Stats)?;
        Ok(self.0.borrow().stats.clone())
    }

    fn download_results(&mut self, _: &str) -> Result<KpiBundle> {
        self.check(Action::DownloadResults)?;
        Ok(self.0.borrow().results.clone())
    }

    fn status(&mut self) -> Result<Value> {
        self.check(Action::Status)?;
        Ok(json!({"status": "ok"}))
    }
}

/// Everything a run page needs around it.
struct Harness {
    backend: Scripted,
    store: MemoryStore,
    bus: PushBus,
    scheduler: FrameScheduler,
    canvas: RecordingCanvas,
}

impl Harness {
    /// Completes setup with the default configuration on the `grid` network.
    fn after_setup() -> Self {
        let mut harness = Harness {
            backend: Scripted::default(),
            store: MemoryStore::new(),
            bus: PushBus::new(),
            scheduler: FrameScheduler::new(),
            canvas: RecordingCanvas::new(800.0, 600.0),
        };
        let mut setup = SetupFlow::default();
        setup
            .configure(SimulationConfig {
                duration: 3600.0,
                traffic_volume: 0.5,
                ..Default::default()
            })
            .unwrap();
        setup.choose_network("grid").unwrap();
        setup
            .save(&mut harness.backend.clone(), &mut harness.store)
            .unwrap();
        harness
    }

    fn open(&self) -> RunPage<Scripted> {
        RunPage::open(self.backend.clone(), &self.store, RenderStyle::default()).unwrap()
    }

    fn launch(&mut self, page: &mut RunPage<Scripted>, now: f64) -> Result<()> {
        page.launch(&mut self.bus, &mut self.scheduler, &mut self.store, now)
    }

    fn refresh(&mut self, page: &mut RunPage<Scripted>, now: f64) -> bool {
        let fired = self.scheduler.tick(now);
        page.refresh(
            &mut self.bus,
            &mut self.scheduler,
            &fired,
            &mut self.canvas,
            now,
        )
    }

    fn push(&mut self, name: &str, payload: Value) {
        self.bus.publish_wire(name, &payload).unwrap();
    }
}

fn stats_event(time: f64, vehicles: u32) -> Value {
    json!({"data": {"simulation_time": time, "active_vehicles": vehicles, "avg_speed": 8.0}})
}

#[test]
fn live_stats_stop_updating_after_stop() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    assert_eq!(page.controller().state(), RunState::Ready);

    h.launch(&mut page, 0.0).unwrap();
    assert_eq!(page.controller().state(), RunState::Running);
    assert_eq!(page.controller().session_id(), Some("session-1"));
    let launched = page.controller_mut().take_outbound();
    assert_eq!(
        launched,
        vec![OutboundEvent::SimulationLaunched {
            session_id: "session-1".into()
        }]
    );

    h.push("simulation_stats", stats_event(120.0, 42));
    assert!(h.refresh(&mut page, 0.016));
    let stats = *page.controller().stats();
    assert_eq!(stats.simulation_time, 120.0);
    assert_eq!(stats.running_vehicles, 42);

    page.stop(&mut h.bus, &mut h.scheduler).unwrap();
    assert_eq!(page.controller().state(), RunState::Stopped);
    assert_eq!(page.controller().subscription(), None);
    assert_eq!(h.bus.subscriber_count(), 0);
    assert_eq!(h.scheduler.pending_count(), 0);
    assert_eq!(page.controller().elapsed(10.0), 0.0);

    h.push("simulation_stats", stats_event(240.0, 7));
    assert!(!h.refresh(&mut page, 0.033));
    assert_eq!(*page.controller().stats(), stats);
}

#[test]
fn launch_uses_the_saved_config() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    let script = h.backend.0.borrow();
    let request = &script.launched[0];
    assert_eq!(request.config.duration, 3600.0);
    assert_eq!(request.config.traffic_volume, 0.5);
    assert_eq!(request.network.as_deref(), Some("grid"));
    drop(script);

    let session = PersistedSession::load(&h.store).unwrap();
    assert_eq!(session.require_session_id().unwrap(), "session-1");
    assert_eq!(session.data.last_run.as_deref(), Some("session-1"));
}

#[test]
fn run_page_needs_a_saved_config() {
    let store = MemoryStore::new();
    let err = RunPage::open(Scripted::default(), &store, RenderStyle::default())
        .err()
        .unwrap();
    assert!(matches!(err, Error::MissingPrerequisite { .. }));
}

#[test]
fn failed_launch_can_be_retried() {
    let mut h = Harness::after_setup();
    let mut page = h.open();

    h.backend.fail(Action::Launch);
    assert!(h.launch(&mut page, 0.0).is_err());
    assert_eq!(page.controller().state(), RunState::Error);
    assert!(page.controller().error().unwrap().contains("backend unavailable"));
    assert!(page.controller().controls().launch);
    assert_eq!(h.bus.subscriber_count(), 0);

    h.backend.recover();
    h.launch(&mut page, 1.0).unwrap();
    assert_eq!(page.controller().state(), RunState::Running);
    assert_eq!(page.controller().error(), None);
    assert_eq!(h.bus.subscriber_count(), 1);
}

#[test]
fn failed_pause_keeps_running() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    h.backend.fail(Action::Pause);
    assert!(page.pause(5.0).is_err());
    assert_eq!(page.controller().state(), RunState::Running);
    assert!(page.controller().error().is_some());

    h.backend.recover();
    page.pause(5.0).unwrap();
    assert_eq!(page.controller().state(), RunState::Paused);
    assert_eq!(page.controller().elapsed(100.0), 5.0);

    page.resume(&mut h.scheduler, 20.0).unwrap();
    assert_eq!(page.controller().elapsed(30.0), 15.0);
}

#[test]
fn actions_are_checked_against_the_state() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    assert!(matches!(
        page.pause(0.0),
        Err(Error::InvalidTransition {
            state: RunState::Ready,
            ..
        })
    ));
    assert!(page.stop(&mut h.bus, &mut h.scheduler).is_err());
    assert!(h.backend.calls().iter().all(|action| *action == Action::SaveConfig));
}

#[test]
fn engine_finishing_ends_the_run() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    h.push("simulation_status", json!({"status": "finished"}));
    h.push("simulation_stats", stats_event(3600.0, 0));
    h.refresh(&mut page, 0.016);

    assert_eq!(page.controller().state(), RunState::Stopped);
    assert_eq!(h.bus.subscriber_count(), 0);
    assert_eq!(page.controller().stats().simulation_time, 0.0);
    assert!(!page.map().is_scheduled());
}

#[test]
fn engine_errors_are_surfaced() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    h.push("simulation_status", json!({"status": "error", "error": "engine crashed"}));
    h.refresh(&mut page, 0.016);
    assert_eq!(page.controller().state(), RunState::Error);
    assert_eq!(page.controller().error(), Some("engine crashed"));
}

#[test]
fn snapshots_replace_each_other() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    h.push(
        "simulation_data",
        json!({
            "timestamp": 10.0,
            "vehicles": [
                {"id": "a", "x": 0.0, "y": 0.0, "speed": 5.0, "angle": 0.0, "type": "passenger"},
                {"id": "b", "x": 50.0, "y": 0.0, "speed": 5.0, "angle": 90.0, "type": "bus"}
            ],
            "junctions": [{"id": "j0", "x": 0.0, "y": 0.0}, {"id": "j1", "x": 100.0, "y": 0.0}],
            "edges": [{"id": "e0", "from": "j0", "to": "j1"}],
            "statistics": {"simulationTime": 10.0, "runningVehicles": 2}
        }),
    );
    h.push(
        "simulation_data",
        json!({"timestamp": 11.0, "vehicles": [{"id": "b", "x": 60.0, "y": 0.0}]}),
    );
    h.refresh(&mut page, 0.016);

    let snapshot = page.controller().snapshot().unwrap();
    assert_eq!(snapshot.timestamp, 11.0);
    assert_eq!(snapshot.vehicles.len(), 1);
    assert!(snapshot.network.is_empty());
    assert_eq!(page.controller().stats().running_vehicles, 2);
}

#[test]
fn connection_status_is_tracked() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();

    h.push("connect", Value::Null);
    h.refresh(&mut page, 0.016);
    assert!(page.controller().is_connected());

    h.push("connection_status", json!({"status": "disconnected"}));
    h.refresh(&mut page, 0.033);
    assert!(!page.controller().is_connected());
}

#[test]
fn unknown_payloads_are_dropped() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();
    h.push("simulation_stats", stats_event(60.0, 3));

    assert!(h
        .bus
        .publish_wire("simulation_stats", &json!({"vehicles": 9}))
        .is_err());
    h.refresh(&mut page, 0.016);
    assert_eq!(page.controller().stats().running_vehicles, 3);
}

#[test]
fn polling_only_runs_without_a_subscription() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.backend.0.borrow_mut().stats = json!({"simulation_time": 30.0, "running_vehicles": 4});

    page.controller_mut()
        .set_update_source(UpdateSource::Poll)
        .unwrap();
    h.launch(&mut page, 0.0).unwrap();
    assert_eq!(h.bus.subscriber_count(), 0);
    assert!(page.controller_mut().poll_stats().unwrap());
    assert_eq!(page.controller().stats().running_vehicles, 4);

    page.stop(&mut h.bus, &mut h.scheduler).unwrap();
    page.controller_mut()
        .set_update_source(UpdateSource::Push)
        .unwrap();
    h.launch(&mut page, 1.0).unwrap();
    assert!(matches!(
        page.controller_mut().set_update_source(UpdateSource::Poll),
        Err(Error::UpdateSourceBusy)
    ));
    assert!(!page.controller_mut().poll_stats().unwrap());
}

#[test]
fn closing_the_page_releases_everything() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();
    assert_eq!(h.scheduler.pending_count(), 1);

    page.close(&mut h.bus, &mut h.scheduler);
    assert_eq!(h.scheduler.pending_count(), 0);
    assert_eq!(h.bus.subscriber_count(), 0);
}

#[test]
fn results_page_derives_analytics() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    h.launch(&mut page, 0.0).unwrap();
    page.stop(&mut h.bus, &mut h.scheduler).unwrap();

    h.backend.0.borrow_mut().results = KpiBundle {
        time_series: vec![
            TimeSample {
                time: 0.0,
                vehicle_count: 10.0,
                avg_speed: 10.0,
                ..Default::default()
            },
            TimeSample {
                time: 60.0,
                vehicle_count: 20.0,
                avg_speed: 12.0,
                teleports: 3,
                ..Default::default()
            },
        ],
        ..Default::default()
    }
    .with_kpi(metric::SAFETY_SCORE, 50.0);

    let mut results = ResultsPage::open(&h.store).unwrap();
    assert_eq!(results.session_id(), "session-1");
    let analytics = results
        .load(&mut h.backend.clone(), &AnalyticsConfig::default())
        .unwrap();
    assert_eq!(analytics.safety_score, 50.0);
    assert_eq!(analytics.critical_periods.len(), 1);
    assert_eq!(analytics.recommendations.len(), 1);

    results.select_chart(ChartKind::VehicleCount);
    let chart = results.selected_chart().unwrap();
    assert_eq!(chart.points.len(), 2);
    assert_eq!(chart.points[1].value, 20.0);
}

#[test]
fn results_download_through_the_controller() {
    let mut h = Harness::after_setup();
    let mut page = h.open();
    let config = AnalyticsConfig::default();
    assert!(matches!(
        page.controller_mut().download_results(&config),
        Err(Error::MissingPrerequisite { .. })
    ));

    h.launch(&mut page, 0.0).unwrap();
    page.stop(&mut h.bus, &mut h.scheduler).unwrap();
    h.backend.0.borrow_mut().results = KpiBundle::default().with_kpi(metric::SAFETY_SCORE, 80.0);

    h.backend.fail(Action::DownloadResults);
    assert!(page.controller_mut().download_results(&config).is_err());
    assert!(page.controller().error().unwrap().contains("download-results"));
    assert_eq!(page.controller().state(), RunState::Stopped);

    h.backend.recover();
    page.controller_mut().dismiss_error();
    let analytics = page.controller_mut().download_results(&config).unwrap();
    assert_eq!(analytics.safety_score, 80.0);
    assert_eq!(page.controller().error(), None);
    assert_eq!(h.backend.calls().last(), Some(&Action::DownloadResults));
}
