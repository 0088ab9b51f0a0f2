//! Per-frame orchestration of the session.
//!
//! One call to [`SessionDriver::step`] is one logical frame, executed in a
//! fixed order with no preemption:
//!
//!   1. fade tick (may commit a scene change at full opacity)
//!   2. symbolic input events
//!   3. vitals update + survival evaluation (every running frame, victory
//!      phases included; a failure pre-empts the victory sequence)
//!   4. level / victory sequence tick
//!   5. queued scene change offered to the fade controller
//!
//! Scene changes are committed from the fade callback, behind black. The fade
//! never queues, so the stage keeps a single queued request and offers it
//! again every frame until a fade accepts it. A run outcome (fail or win) is
//! latched when raised, so it is reported exactly once per run. Leaving the
//! run for a menu discards the latch and any outcome still waiting for a fade.

use crate::config::LevelCatalog;
use crate::error::CoreError;
use crate::fade::{FadeController, FadeEvent};
use crate::input::InputQueue;
use crate::level::{LevelLifecycle, LevelView};
use crate::session::{SessionEvent, SessionState, SessionStateMachine};
use crate::survival::{SurvivalMonitor, SurvivalOutcome};
use crate::time::seconds_to_frames;
use crate::victory::LevelPhaseEvent;
use crate::vitals::PlayerVitals;
use crate::world::World;

/// How long the splash screen holds before fading to the menu.
pub const SPLASH_SECONDS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    Enter(SessionState),
    StartRun(u32),
    /// Fail or Win raised by the running level.
    EndRun(SessionState),
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub fade: Option<FadeEvent>,
    pub outcome: Option<SurvivalOutcome>,
    pub phase_event: Option<LevelPhaseEvent>,
    pub state: SessionState,
}

/// Everything a fade callback may touch.
pub struct Stage<W> {
    pub session: SessionStateMachine,
    pub level: LevelLifecycle,
    pub vitals: PlayerVitals,
    pub world: W,
    run_outcome: Option<SessionState>,
    queued_scene: Option<SceneChange>,
}

impl<W: World> Stage<W> {
    fn apply_scene(&mut self, change: SceneChange) {
        match change {
            SceneChange::StartRun(day_id) => self.start_run(day_id),
            SceneChange::Enter(target) => self.enter(target),
            SceneChange::EndRun(target) => self.end_run(target),
        }
    }

    fn start_run(&mut self, day_id: u32) {
        if !self.session.can_transition(SessionState::Running) {
            log::warn!(
                "Run start for day {day_id} ignored from {}",
                self.session.current()
            );
            return;
        }
        if self.level.is_active() && self.level.day_id() == Some(day_id) {
            self.level.reset(&mut self.vitals, &mut self.world);
        } else if let Err(err) = self.level.initialize(day_id, &mut self.vitals, &mut self.world) {
            log::warn!("Run start ignored: {err}");
            return;
        }
        self.run_outcome = None;
        if let Err(err) = self.session.request_transition(SessionState::Running) {
            log::warn!("Run start ignored: {err}");
        }
    }

    fn enter(&mut self, target: SessionState) {
        if let Err(err) = self.session.request_transition(target) {
            log::warn!("Ignored scene change: {err}");
            return;
        }
        if matches!(
            target,
            SessionState::Menu | SessionState::LevelSelect | SessionState::Splash
        ) {
            self.level.cleanup();
            self.run_outcome = None;
            if let Some(SceneChange::EndRun(stale)) = self.queued_scene {
                log::debug!("Dropped {stale} raised by the abandoned run");
                self.queued_scene = None;
            }
        }
    }

    fn end_run(&mut self, target: SessionState) {
        if self.run_outcome != Some(target) {
            log::debug!("Dropped stale run outcome {target}");
            return;
        }
        if let Err(err) = self.session.request_transition(target) {
            log::warn!("Ignored run outcome: {err}");
        }
    }
}

pub struct SessionDriver<W: World + 'static> {
    fade: FadeController<Stage<W>>,
    stage: Stage<W>,
    input: InputQueue,
    assets_ready: bool,
    splash_frames: u64,
    frame: u64,
}

impl<W: World + 'static> SessionDriver<W> {
    pub fn new(catalog: LevelCatalog, world: W) -> Self {
        Self::with_state(catalog, world, SessionState::Loading)
    }

    pub fn with_state(catalog: LevelCatalog, world: W, state: SessionState) -> Self {
        Self {
            fade: FadeController::new(),
            stage: Stage {
                session: SessionStateMachine::with_state(state),
                level: LevelLifecycle::new(catalog),
                vitals: PlayerVitals::default(),
                world,
                run_outcome: None,
                queued_scene: None,
            },
            input: InputQueue::new(),
            assets_ready: false,
            splash_frames: seconds_to_frames(SPLASH_SECONDS),
            frame: 0,
        }
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.input.push(event);
    }

    /// Reported by the asset collaborator once loading has finished.
    pub fn mark_assets_ready(&mut self) {
        self.assets_ready = true;
    }

    pub fn state(&self) -> SessionState {
        self.stage.session.current()
    }

    pub fn session(&self) -> &SessionStateMachine {
        &self.stage.session
    }

    pub fn level(&self) -> &LevelLifecycle {
        &self.stage.level
    }

    pub fn vitals(&self) -> &PlayerVitals {
        &self.stage.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut PlayerVitals {
        &mut self.stage.vitals
    }

    pub fn world(&self) -> &W {
        &self.stage.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.stage.world
    }

    pub fn fade_alpha(&self) -> f32 {
        self.fade.current_alpha()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_active()
    }

    pub fn queued_scene(&self) -> Option<SceneChange> {
        self.stage.queued_scene
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn view(&self) -> Option<LevelView<'_>> {
        self.stage.level.display(&self.stage.vitals)
    }

    pub fn step(&mut self) -> FrameReport {
        let fade = self.fade.tick(&mut self.stage);
        self.stage.session.tick();

        for event in self.input.take_for_step() {
            self.apply_event(event);
        }
        self.advance_boot_flow();

        let (outcome, phase_event) = self.simulate_run();

        self.offer_queued_scene();
        self.frame += 1;

        FrameReport {
            frame: self.frame,
            fade,
            outcome,
            phase_event,
            state: self.stage.session.current(),
        }
    }

    fn apply_event(&mut self, event: SessionEvent) {
        let stage = &mut self.stage;
        let session = &mut stage.session;
        let queued = &mut stage.queued_scene;
        let result = match event {
            SessionEvent::RequestPause if !session.is_paused() && stage.run_outcome.is_some() => {
                log::debug!("Pause ignored: run already ended");
                Ok(())
            }
            SessionEvent::RequestPause => session.toggle_pause().map(|_| ()),
            SessionEvent::RequestResume => session.resume().map(|_| ()),
            // Pause menu navigation is an overlay, not a scene change.
            SessionEvent::RequestState(target)
                if session.is_paused()
                    && (target == SessionState::Paused || target.is_pause_subscreen()) =>
            {
                session.request_transition(target).map(|_| ())
            }
            SessionEvent::RequestState(SessionState::Paused) if stage.run_outcome.is_some() => {
                log::debug!("Pause ignored: run already ended");
                Ok(())
            }
            SessionEvent::RequestState(SessionState::Paused) => {
                session.request_transition(SessionState::Paused).map(|_| ())
            }
            // Runs start through RequestRunStart and end through the monitor.
            SessionEvent::RequestState(target)
                if target == SessionState::Running || target.is_run_end() =>
            {
                Err(CoreError::InvalidTransition {
                    from: session.current(),
                    request: format!("request {target}"),
                })
            }
            SessionEvent::RequestState(target) if !session.can_transition(target) => {
                Err(CoreError::InvalidTransition {
                    from: session.current(),
                    request: format!("enter {target}"),
                })
            }
            SessionEvent::RequestState(target) => {
                queue_scene(queued, SceneChange::Enter(target));
                Ok(())
            }
            SessionEvent::RequestRunStart(day_id) => {
                if session.can_transition(SessionState::Running) {
                    queue_scene(queued, SceneChange::StartRun(day_id));
                } else {
                    log::warn!(
                        "Ignored run start for day {day_id} from {}",
                        session.current()
                    );
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("Ignored {event:?}: {err}");
        }
    }

    fn advance_boot_flow(&mut self) {
        match self.stage.session.current() {
            SessionState::Loading if self.assets_ready => {
                if let Err(err) = self.stage.session.request_transition(SessionState::Splash) {
                    log::warn!("Boot flow stalled: {err}");
                }
            }
            SessionState::Splash
                if self.stage.session.frames_in_state() >= self.splash_frames
                    && !self.fade.is_active() =>
            {
                queue_scene(
                    &mut self.stage.queued_scene,
                    SceneChange::Enter(SessionState::Menu),
                );
            }
            _ => {}
        }
    }

    fn simulate_run(&mut self) -> (Option<SurvivalOutcome>, Option<LevelPhaseEvent>) {
        let stage = &mut self.stage;
        if stage.session.current() != SessionState::Running || stage.run_outcome.is_some() {
            return (None, None);
        }
        let (Some(phase), Some(config)) = (stage.level.phase(), stage.level.config()) else {
            return (None, None);
        };

        stage.world.step();
        let hazard_hit = stage.world.take_hazard_hit();
        stage.vitals.tick(stage.world.scroll_speed());
        let outcome = SurvivalMonitor::evaluate(&stage.vitals, config, hazard_hit, phase);

        if let Some(SurvivalOutcome::Fail(reason)) = outcome {
            log::info!("Run failed in {} phase: {reason}", phase.label());
            let target = SessionState::Fail(reason);
            stage.run_outcome = Some(target);
            queue_scene(&mut stage.queued_scene, SceneChange::EndRun(target));
            return (outcome, None);
        }

        let phase_event = stage.level.update(&stage.vitals, &mut stage.world, outcome);
        if phase_event == Some(LevelPhaseEvent::SettlementComplete) {
            log::info!("Run won");
            stage.run_outcome = Some(SessionState::Win);
            queue_scene(&mut stage.queued_scene, SceneChange::EndRun(SessionState::Win));
        }
        (outcome, phase_event)
    }

    fn offer_queued_scene(&mut self) {
        let Some(change) = self.stage.queued_scene else {
            return;
        };
        if self
            .fade
            .trigger(move |stage: &mut Stage<W>| stage.apply_scene(change))
        {
            self.stage.queued_scene = None;
        }
    }
}

/// One-slot queue: the first request wins until a fade accepts it.
fn queue_scene(slot: &mut Option<SceneChange>, change: SceneChange) {
    match slot {
        Some(pending) => log::debug!("Scene change {change:?} dropped; {pending:?} pending"),
        None => *slot = Some(change),
    }
}
