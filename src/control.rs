//! The lifecycle of a simulation run.
//!
//! [RunState::next] is the single place state transitions are decided; both
//! user actions and engine status pushes go through it. [RunController]
//! performs the backend calls and owns the run's live-update subscription.

use crate::analytics::{AnalyticsConfig, DerivedAnalytics};
use crate::backend::{Backend, LaunchRequest};
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::events::{EngineStatus, EventKind, OutboundEvent, PushBus, PushEvent};
use crate::live::LiveStats;
use crate::scheduler::ElapsedClock;
use crate::snapshot::SimulationSnapshot;
use crate::SubscriptionId;
use serde::Serialize;
use std::fmt;

/// The state of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Ready,
    Launching,
    Running,
    Paused,
    Stopped,
    Error,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Ready => "ready",
            RunState::Launching => "launching",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
            RunState::Error => "in error",
        };
        f.write_str(name)
    }
}

/// Something that happened to a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMsg {
    /// The user asked to launch (or relaunch).
    Launch,
    LaunchSucceeded,
    LaunchFailed,
    /// The backend accepted a pause.
    Paused,
    /// The backend accepted a resume.
    Resumed,
    /// The backend accepted a stop.
    Stopped,
    /// The engine pushed a status.
    Engine(EngineStatus),
}

impl RunState {
    /// The state after `msg`, or `None` if `msg` is not valid in this state.
    pub fn next(self, msg: RunMsg) -> Option<RunState> {
        use RunState::{Launching, Paused, Ready, Running, Stopped};
        let next = match (self, msg) {
            (Ready | Stopped | RunState::Error, RunMsg::Launch) => Launching,
            (Launching, RunMsg::LaunchSucceeded) => Running,
            (Launching, RunMsg::LaunchFailed) => RunState::Error,
            (Running, RunMsg::Paused) => Paused,
            (Paused, RunMsg::Resumed) => Running,
            (Running | Paused, RunMsg::Stopped) => Stopped,
            (Launching | Running | Paused, RunMsg::Engine(EngineStatus::Running)) => Running,
            (Running | Paused, RunMsg::Engine(EngineStatus::Paused)) => Paused,
            (
                Launching | Running | Paused,
                RunMsg::Engine(EngineStatus::Stopped | EngineStatus::Finished),
            ) => Stopped,
            (_, RunMsg::Engine(EngineStatus::Error)) => RunState::Error,
            _ => return None,
        };
        Some(next)
    }

    /// Whether the run is live, i.e. the map should keep redrawing.
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn controls(self) -> Controls {
        Controls {
            launch: matches!(self, RunState::Ready | RunState::Stopped | RunState::Error),
            pause: self == RunState::Running,
            resume: self == RunState::Paused,
            stop: matches!(self, RunState::Running | RunState::Paused),
        }
    }
}

/// Which run controls are enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub launch: bool,
    pub pause: bool,
    pub resume: bool,
    pub stop: bool,
}

/// Where live statistics come from.
///
/// Only one source ever feeds the displayed statistics. Polling is kept for
/// backends without a push channel and is never run beside a subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateSource {
    #[default]
    Push,
    Poll,
}

/// Drives one run: launch, pause, resume, stop, and live updates.
pub struct RunController<B> {
    backend: B,
    state: RunState,
    /// The configuration the current run was launched with.
    config: Option<SimulationConfig>,
    session_id: Option<String>,
    stats: LiveStats,
    snapshot: Option<Box<SimulationSnapshot>>,
    error: Option<String>,
    connected: bool,
    source: UpdateSource,
    subscription: Option<SubscriptionId>,
    clock: ElapsedClock,
    outbound: Vec<OutboundEvent>,
}

impl<B: Backend> RunController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RunState::Ready,
            config: None,
            session_id: None,
            stats: LiveStats::default(),
            snapshot: None,
            error: None,
            connected: false,
            source: UpdateSource::Push,
            subscription: None,
            clock: ElapsedClock::default(),
            outbound: vec![],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.state.controls()
    }

    pub fn stats(&self) -> &LiveStats {
        &self.stats
    }

    pub fn snapshot(&self) -> Option<&SimulationSnapshot> {
        self.snapshot.as_deref()
    }

    /// The message of the last failed action, if it hasn't been dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The configuration the current run was launched with.
    pub fn config(&self) -> Option<&SimulationConfig> {
        self.config.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn update_source(&self) -> UpdateSource {
        self.source
    }

    /// Time spent running at `now`, in s.
    pub fn elapsed(&self, now: f64) -> f64 {
        self.clock.elapsed(now)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Takes the events waiting to be emitted to the host.
    pub fn take_outbound(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.outbound)
    }

    /// Selects where live statistics come from.
    /// Fails if a push subscription is currently live.
    pub fn set_update_source(&mut self, source: UpdateSource) -> Result<()> {
        if self.subscription.is_some() {
            return Err(Error::UpdateSourceBusy);
        }
        self.source = source;
        Ok(())
    }

    /// Launches a run with a frozen copy of `config`.
    ///
    /// On failure the run moves to [RunState::Error], keeping the message.
    pub fn launch(
        &mut self,
        bus: &mut PushBus,
        config: &SimulationConfig,
        network: Option<&str>,
        now: f64,
    ) -> Result<()> {
        let launching = self.allowed(RunMsg::Launch, "launch")?;
        config.validate()?;

        self.teardown(bus);
        self.set_state(launching);
        self.error = None;
        self.stats = LiveStats::default();
        self.snapshot = None;
        self.session_id = None;

        log::info!(
            "launching a {} s run of {} steps",
            config.duration,
            config.step_count()
        );
        let request = LaunchRequest {
            config: config.clone(),
            network: network.map(str::to_owned).or_else(|| config.network.clone()),
        };
        match self.backend.launch(&request) {
            Ok(reply) => {
                log::info!("simulation launched as session {}", reply.session_id);
                self.transition(RunMsg::LaunchSucceeded);
                self.config = Some(request.config);
                self.clock.start(now);
                if self.source == UpdateSource::Push {
                    self.subscription = Some(bus.subscribe(&EventKind::ALL));
                }
                self.outbound.push(OutboundEvent::SimulationLaunched {
                    session_id: reply.session_id.clone(),
                });
                self.session_id = Some(reply.session_id);
                Ok(())
            }
            Err(err) => {
                log::warn!("launch failed: {}", err);
                self.transition(RunMsg::LaunchFailed);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn pause(&mut self, now: f64) -> Result<()> {
        let paused = self.allowed(RunMsg::Paused, "pause")?;
        let session_id = self.require_session()?.to_owned();
        let reply = self.backend.pause(&session_id);
        self.record(reply)?;
        self.set_state(paused);
        self.clock.pause(now);
        Ok(())
    }

    pub fn resume(&mut self, now: f64) -> Result<()> {
        let running = self.allowed(RunMsg::Resumed, "resume")?;
        let session_id = self.require_session()?.to_owned();
        let reply = self.backend.resume(&session_id);
        self.record(reply)?;
        self.set_state(running);
        self.clock.start(now);
        Ok(())
    }

    /// Stops the run and drops its live-update subscription.
    /// Nothing published afterwards changes the displayed statistics.
    pub fn stop(&mut self, bus: &mut PushBus) -> Result<()> {
        let stopped = self.allowed(RunMsg::Stopped, "stop")?;
        let session_id = self.require_session()?.to_owned();
        let reply = self.backend.stop(&session_id);
        self.record(reply)?;
        self.set_state(stopped);
        self.teardown(bus);
        Ok(())
    }

    /// Drops the live-update subscription without touching the run, for when
    /// the page showing it goes away.
    pub fn detach(&mut self, bus: &mut PushBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
    }

    /// Applies the events queued on the run's subscription, in order.
    /// Returns the number of events applied.
    pub fn pump(&mut self, bus: &mut PushBus, now: f64) -> usize {
        let Some(id) = self.subscription else {
            return 0;
        };
        let mut applied = 0;
        for event in bus.drain(id) {
            self.apply(event, now);
            applied += 1;
            if !self.state_has_subscription() {
                self.teardown(bus);
                break;
            }
        }
        applied
    }

    /// Fetches statistics with the legacy poller.
    ///
    /// Does nothing unless the update source is [UpdateSource::Poll] and a
    /// run is live. Returns whether the statistics were updated.
    pub fn poll_stats(&mut self) -> Result<bool> {
        if self.source != UpdateSource::Poll || self.subscription.is_some() {
            return Ok(false);
        }
        if !matches!(self.state, RunState::Running | RunState::Paused) {
            return Ok(false);
        }
        let session_id = self.require_session()?.to_owned();
        let reply = self.backend.stats(&session_id);
        let raw = self.record(reply)?;
        self.stats = LiveStats::normalize(&raw)?;
        Ok(true)
    }

    /// Downloads the results of the current session and derives the analytics views.
    pub fn download_results(&mut self, config: &AnalyticsConfig) -> Result<DerivedAnalytics> {
        let session_id = self.require_session()?.to_owned();
        let reply = self.backend.download_results(&session_id);
        let bundle = self.record(reply)?;
        Ok(DerivedAnalytics::build(&bundle, config))
    }

    fn apply(&mut self, event: PushEvent, now: f64) {
        match event {
            PushEvent::SimulationStats(raw) => self.stats = raw.into_stats(),
            PushEvent::SimulationData(snapshot) => {
                if let Some(stats) = snapshot.stats() {
                    self.stats = stats;
                }
                self.snapshot = Some(snapshot);
            }
            PushEvent::SimulationStatus(update) => {
                let before = self.state;
                if !self.transition(RunMsg::Engine(update.status)) {
                    log::warn!("ignoring engine status {:?} while {}", update.status, before);
                    return;
                }
                match self.state {
                    RunState::Running => self.clock.start(now),
                    RunState::Paused => self.clock.pause(now),
                    RunState::Error => {
                        self.error = Some(
                            update
                                .message
                                .unwrap_or_else(|| "the simulation engine reported an error".into()),
                        )
                    }
                    _ => {}
                }
            }
            PushEvent::Connection { connected } => {
                if connected != self.connected {
                    log::info!("push channel {}", if connected { "connected" } else { "disconnected" });
                }
                self.connected = connected;
            }
        }
    }

    /// Whether the current state keeps a live subscription.
    fn state_has_subscription(&self) -> bool {
        matches!(
            self.state,
            RunState::Launching | RunState::Running | RunState::Paused
        )
    }

    fn teardown(&mut self, bus: &mut PushBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
            log::debug!("dropped live-update subscription {:?}", id);
        }
        if matches!(self.state, RunState::Stopped | RunState::Error) {
            self.clock.reset();
        }
    }

    /// Checks that `msg` is allowed, returning the state it leads to.
    fn allowed(&self, msg: RunMsg, action: &'static str) -> Result<RunState> {
        self.state.next(msg).ok_or(Error::InvalidTransition {
            action,
            state: self.state,
        })
    }

    fn transition(&mut self, msg: RunMsg) -> bool {
        match self.state.next(msg) {
            Some(next) => {
                self.set_state(next);
                true
            }
            None => false,
        }
    }

    fn set_state(&mut self, next: RunState) {
        if next != self.state {
            log::info!("run state {} -> {}", self.state, next);
            self.state = next;
        }
    }

    fn require_session(&self) -> Result<&str> {
        self.session_id
            .as_deref()
            .ok_or(Error::MissingPrerequisite {
                what: "simulation session",
            })
    }

    /// Keeps the message of a failed request for display.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::warn!("{}", err);
            self.error = Some(err.to_string());
        }
        result
    }
}
