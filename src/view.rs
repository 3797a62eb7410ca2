//! Per-page state: the live map, the run page and the results page.
//!
//! Pages own their scheduled work and must be closed (or the map dismantled)
//! when they go away, so no frame callback outlives its canvas.

use crate::analytics::{AnalyticsConfig, ChartKind, ChartSeries, DerivedAnalytics};
use crate::backend::Backend;
use crate::control::RunController;
use crate::error::{Error, Result};
use crate::events::PushBus;
use crate::render::{Canvas, EdgeResolution, FrameRenderer, RenderOptions, RenderStyle, ViewMode};
use crate::scheduler::FrameScheduler;
use crate::session::{self, PersistedSession, SessionStore, SESSION_ID_KEY};
use crate::snapshot::SimulationSnapshot;
use crate::FrameRequestId;

/// The live map: draws the latest snapshot once per display refresh.
#[derive(Default)]
pub struct MapView {
    renderer: FrameRenderer,
    options: RenderOptions,
    /// The frame callback currently scheduled, if any.
    pending: Option<FrameRequestId>,
    frames_drawn: u64,
}

impl MapView {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            renderer: FrameRenderer::new(style),
            ..Default::default()
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.options.mode = mode;
    }

    pub fn toggle_grid(&mut self) {
        self.options.show_grid = !self.options.show_grid;
    }

    pub fn set_edge_resolution(&mut self, resolution: EdgeResolution) {
        self.options.edge_resolution = resolution;
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Schedules the next frame, unless one is already scheduled.
    pub fn activate(&mut self, scheduler: &mut FrameScheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Handles a display refresh. Draws if this view's frame fired, then
    /// schedules another frame only while `active`.
    ///
    /// Returns whether a frame was drawn.
    pub fn on_refresh(
        &mut self,
        scheduler: &mut FrameScheduler,
        fired: &[FrameRequestId],
        canvas: &mut impl Canvas,
        snapshot: Option<&SimulationSnapshot>,
        active: bool,
    ) -> bool {
        match self.pending {
            Some(id) if fired.contains(&id) => self.pending = None,
            _ => return false,
        }
        self.renderer.render(canvas, snapshot, &self.options);
        self.frames_drawn += 1;
        if active {
            self.activate(scheduler);
        }
        true
    }

    /// Cancels any scheduled frame.
    pub fn dismantle(&mut self, scheduler: &mut FrameScheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }
}

/// The page that launches and watches a run.
pub struct RunPage<B> {
    session: PersistedSession,
    controller: RunController<B>,
    map: MapView,
}

impl<B: Backend> RunPage<B> {
    /// Opens the page. A configuration must have been saved by setup.
    pub fn open(backend: B, store: &impl SessionStore, style: RenderStyle) -> Result<Self> {
        let session = PersistedSession::load(store)?;
        Ok(Self {
            session,
            controller: RunController::new(backend),
            map: MapView::new(style),
        })
    }

    pub fn controller(&self) -> &RunController<B> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut RunController<B> {
        &mut self.controller
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    pub fn session(&self) -> &PersistedSession {
        &self.session
    }

    /// Launches (or relaunches) the saved configuration, and remembers the
    /// session for the results page.
    pub fn launch(
        &mut self,
        bus: &mut PushBus,
        scheduler: &mut FrameScheduler,
        store: &mut impl SessionStore,
        now: f64,
    ) -> Result<()> {
        let network = self.session.data.network.clone();
        self.controller
            .launch(bus, &self.session.config, network.as_deref(), now)?;

        if let Some(session_id) = self.controller.session_id() {
            session::save_session_id(store, session_id)?;
            self.session.session_id = Some(session_id.to_owned());
            self.session.data.last_run = Some(session_id.to_owned());
            session::save_session_data(store, &self.session.data)?;
        }
        self.map.activate(scheduler);
        Ok(())
    }

    pub fn pause(&mut self, now: f64) -> Result<()> {
        self.controller.pause(now)
    }

    pub fn resume(&mut self, scheduler: &mut FrameScheduler, now: f64) -> Result<()> {
        self.controller.resume(now)?;
        self.map.activate(scheduler);
        Ok(())
    }

    /// Stops the run, dropping its subscription and any scheduled frame.
    pub fn stop(&mut self, bus: &mut PushBus, scheduler: &mut FrameScheduler) -> Result<()> {
        self.controller.stop(bus)?;
        self.map.dismantle(scheduler);
        Ok(())
    }

    /// Applies pending live updates, then draws if the map's frame fired.
    pub fn refresh(
        &mut self,
        bus: &mut PushBus,
        scheduler: &mut FrameScheduler,
        fired: &[FrameRequestId],
        canvas: &mut impl Canvas,
        now: f64,
    ) -> bool {
        self.controller.pump(bus, now);
        let active = self.controller.state().is_active();
        self.map.on_refresh(
            scheduler,
            fired,
            canvas,
            self.controller.snapshot(),
            active,
        )
    }

    /// Leaves the page. The run itself carries on in the backend.
    pub fn close(&mut self, bus: &mut PushBus, scheduler: &mut FrameScheduler) {
        self.map.dismantle(scheduler);
        self.controller.detach(bus);
    }
}

/// The page showing the results of the last run.
pub struct ResultsPage {
    session_id: String,
    analytics: Option<DerivedAnalytics>,
    selected: ChartKind,
}

impl ResultsPage {
    /// Opens the page. A run must have been launched.
    pub fn open(store: &impl SessionStore) -> Result<Self> {
        let session_id = store.get(SESSION_ID_KEY)?.ok_or(Error::MissingPrerequisite {
            what: "simulation session",
        })?;
        Ok(Self {
            session_id,
            analytics: None,
            selected: ChartKind::VehicleCount,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Downloads the run's KPIs and derives everything the page shows.
    pub fn load(
        &mut self,
        backend: &mut impl Backend,
        config: &AnalyticsConfig,
    ) -> Result<&DerivedAnalytics> {
        let bundle = backend
            .download_results(&self.session_id)
            .inspect_err(|err| log::warn!("{}", err))?;
        log::info!(
            "downloaded {} samples for session {}",
            bundle.time_series.len(),
            self.session_id
        );
        Ok(&*self
            .analytics
            .insert(DerivedAnalytics::build(&bundle, config)))
    }

    pub fn analytics(&self) -> Option<&DerivedAnalytics> {
        self.analytics.as_ref()
    }

    pub fn select_chart(&mut self, kind: ChartKind) {
        self.selected = kind;
    }

    pub fn selected_chart(&self) -> Option<&ChartSeries> {
        self.analytics.as_ref()?.chart(self.selected)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::render::{DrawCommand, RecordingCanvas};
    use crate::session::MemoryStore;

    #[test]
    fn map_redraws_only_while_active() {
        let mut scheduler = FrameScheduler::new();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        let mut map = MapView::default();

        map.activate(&mut scheduler);
        map.activate(&mut scheduler);
        assert_eq!(scheduler.pending_count(), 1);

        let fired = scheduler.tick(0.016);
        assert!(map.on_refresh(&mut scheduler, &fired, &mut canvas, None, true));
        assert!(map.is_scheduled());
        assert!(matches!(canvas.commands()[0], DrawCommand::Clear { .. }));

        let fired = scheduler.tick(0.033);
        assert!(map.on_refresh(&mut scheduler, &fired, &mut canvas, None, false));
        assert!(!map.is_scheduled());
        assert_eq!(scheduler.pending_count(), 0);

        let fired = scheduler.tick(0.050);
        assert!(!map.on_refresh(&mut scheduler, &fired, &mut canvas, None, false));
        assert_eq!(map.frames_drawn(), 2);
    }

    #[test]
    fn dismantle_cancels_the_pending_frame() {
        let mut scheduler = FrameScheduler::new();
        let mut map = MapView::default();
        map.activate(&mut scheduler);
        map.dismantle(&mut scheduler);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.tick(0.016).is_empty());
    }

    #[test]
    fn view_options() {
        let mut map = MapView::default();
        map.set_mode(ViewMode::Traffic);
        map.toggle_grid();
        assert_eq!(map.options().mode, ViewMode::Traffic);
        assert!(!map.options().show_grid);
    }

    #[test]
    fn results_need_a_session() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            ResultsPage::open(&store),
            Err(Error::MissingPrerequisite { .. })
        ));
        session::save_session_id(&mut store, "s1").unwrap();
        let page = ResultsPage::open(&store).unwrap();
        assert_eq!(page.session_id(), "s1");
        assert!(page.selected_chart().is_none());
    }
}
