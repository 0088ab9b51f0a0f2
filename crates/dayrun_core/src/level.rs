//! Level lifecycle: setup, per-frame ticks, reset and cleanup of the level
//! for the selected day.
//!
//! The level kind is chosen once, at `initialize`, from the day's config:
//! tutorial days reveal scripted hints, procedural days run a seeded obstacle
//! schedule. Both share the victory sequence, which runs once the survival
//! monitor reports the distance goal.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{LevelCatalog, LevelConfig, LevelKindConfig, TutorialHint};
use crate::error::CoreResult;
use crate::survival::SurvivalOutcome;
use crate::victory::{LevelPhase, LevelPhaseEvent, LevelSession, VictorySequencer};
use crate::vitals::PlayerVitals;
use crate::world::{ObstacleGate, World};

#[derive(Debug, Clone)]
pub struct TutorialLevel {
    hints: Vec<TutorialHint>,
    revealed: usize,
}

impl TutorialLevel {
    pub fn new(mut hints: Vec<TutorialHint>) -> Self {
        hints.sort_by(|a, b| a.at_distance.total_cmp(&b.at_distance));
        Self { hints, revealed: 0 }
    }

    fn update(&mut self, distance: f32) {
        while let Some(hint) = self.hints.get(self.revealed) {
            if hint.at_distance > distance {
                break;
            }
            log::debug!("Tutorial hint at {:.0}: {}", hint.at_distance, hint.text);
            self.revealed += 1;
        }
    }

    /// Most recently revealed hint.
    pub fn current_hint(&self) -> Option<&str> {
        self.revealed
            .checked_sub(1)
            .and_then(|i| self.hints.get(i))
            .map(|h| h.text.as_str())
    }

    fn reset(&mut self) {
        self.revealed = 0;
    }
}

#[derive(Debug, Clone)]
pub struct ProceduralLevel {
    seed: u64,
    rng: ChaCha8Rng,
    interval_frames: u32,
    lanes: u8,
    frames_until_spawn: u32,
    spawned: u32,
}

impl ProceduralLevel {
    pub fn new(seed: u64, interval_frames: u32, lanes: u8) -> Self {
        let interval_frames = interval_frames.max(1);
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            interval_frames,
            lanes: lanes.max(1),
            frames_until_spawn: interval_frames,
            spawned: 0,
        }
    }

    /// Count down one frame and spawn when due. Nothing spawns once the gate
    /// is closed.
    fn update<G: ObstacleGate + ?Sized>(&mut self, gate: &mut G) -> Option<u8> {
        if !gate.is_open() {
            return None;
        }
        self.frames_until_spawn = self.frames_until_spawn.saturating_sub(1);
        if self.frames_until_spawn > 0 {
            return None;
        }
        self.frames_until_spawn = self.interval_frames;
        let lane = self.rng.random_range(0..self.lanes);
        gate.spawn(lane);
        self.spawned += 1;
        Some(lane)
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.frames_until_spawn = self.interval_frames;
        self.spawned = 0;
    }
}

#[derive(Debug, Clone)]
pub enum LevelKind {
    Tutorial(TutorialLevel),
    Procedural(ProceduralLevel),
}

impl LevelKind {
    pub fn from_config(config: &LevelConfig) -> Self {
        match config.kind {
            LevelKindConfig::Tutorial => Self::Tutorial(TutorialLevel::new(config.hints.clone())),
            LevelKindConfig::Procedural => Self::Procedural(ProceduralLevel::new(
                config.spawn_seed(),
                config.spawn_interval_frames,
                config.lanes,
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tutorial(_) => "tutorial",
            Self::Procedural(_) => "procedural",
        }
    }

    fn update<W: World + ?Sized>(&mut self, vitals: &PlayerVitals, world: &mut W) {
        match self {
            Self::Tutorial(level) => level.update(vitals.distance_run),
            Self::Procedural(level) => {
                if let Some(lane) = level.update(world) {
                    log::trace!("Spawned obstacle in lane {lane}");
                }
            }
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            Self::Tutorial(level) => level.current_hint(),
            Self::Procedural(_) => None,
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Tutorial(level) => level.reset(),
            Self::Procedural(level) => level.reset(),
        }
    }
}

/// Read-only snapshot handed to the rendering collaborator each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelView<'a> {
    pub day_id: u32,
    pub kind: &'static str,
    pub phase: LevelPhase,
    /// Distance run over target distance, clamped to `[0, 1]`.
    pub progress: f32,
    pub health_fraction: f32,
    pub frames_remaining: u64,
    pub hint: Option<&'a str>,
    pub settlement_progress: f32,
}

struct ActiveLevel {
    config: LevelConfig,
    session: LevelSession,
    kind: LevelKind,
    sequencer: VictorySequencer,
}

pub struct LevelLifecycle {
    catalog: LevelCatalog,
    active: Option<ActiveLevel>,
}

impl LevelLifecycle {
    pub fn new(catalog: LevelCatalog) -> Self {
        Self {
            catalog,
            active: None,
        }
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Set up the level for `day_id` and apply its stats to the player and
    /// world. On a missing config no level is left active.
    pub fn initialize<W: World + ?Sized>(
        &mut self,
        day_id: u32,
        vitals: &mut PlayerVitals,
        world: &mut W,
    ) -> CoreResult<()> {
        let config = match self.catalog.get(day_id) {
            Ok(config) => config.clone(),
            Err(err) => {
                log::warn!("Level initialize failed: {err}");
                self.active = None;
                return Err(err);
            }
        };

        apply_stats(&config, vitals, world);
        let kind = LevelKind::from_config(&config);
        log::info!(
            "Day {}: {} level ready (target {:.0}, limit {} frames)",
            day_id,
            kind.label(),
            config.target_distance,
            config.time_limit_frames()
        );
        self.active = Some(ActiveLevel {
            session: LevelSession::new(day_id),
            sequencer: VictorySequencer::new(config.victory_backdrop_height),
            kind,
            config,
        });
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn day_id(&self) -> Option<u32> {
        self.active.as_ref().map(|level| level.session.day_id)
    }

    pub fn phase(&self) -> Option<LevelPhase> {
        self.active.as_ref().map(|level| level.session.phase)
    }

    pub fn config(&self) -> Option<&LevelConfig> {
        self.active.as_ref().map(|level| &level.config)
    }

    pub fn session(&self) -> Option<&LevelSession> {
        self.active.as_ref().map(|level| &level.session)
    }

    pub fn kind(&self) -> Option<&LevelKind> {
        self.active.as_ref().map(|level| &level.kind)
    }

    /// One frame of level logic. While running, a `VictoryReached` outcome
    /// starts the victory sequence; afterwards the sequencer is ticked.
    pub fn update<W: World + ?Sized>(
        &mut self,
        vitals: &PlayerVitals,
        world: &mut W,
        outcome: Option<SurvivalOutcome>,
    ) -> Option<LevelPhaseEvent> {
        let level = self.active.as_mut()?;
        level.kind.update(vitals, world);
        match level.session.phase {
            LevelPhase::Running => {
                if outcome == Some(SurvivalOutcome::VictoryReached) {
                    level.sequencer.begin(&mut level.session, world)
                } else {
                    None
                }
            }
            LevelPhase::VictoryTransition | LevelPhase::VictoryZone => {
                level.sequencer.tick(&mut level.session, world)
            }
        }
    }

    pub fn display<'a>(&'a self, vitals: &PlayerVitals) -> Option<LevelView<'a>> {
        let level = self.active.as_ref()?;
        let target = level.config.target_distance;
        let progress = if target > 0.0 {
            (vitals.distance_run / target).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(LevelView {
            day_id: level.session.day_id,
            kind: level.kind.label(),
            phase: level.session.phase,
            progress,
            health_fraction: vitals.health_fraction(),
            frames_remaining: level
                .config
                .time_limit_frames()
                .saturating_sub(vitals.elapsed_frames),
            hint: level.kind.hint(),
            settlement_progress: level.sequencer.settlement_progress(&level.session),
        })
    }

    /// Restart the same day: re-apply stats and rewind the level.
    /// Returns `false` when no level is active.
    pub fn reset<W: World + ?Sized>(&mut self, vitals: &mut PlayerVitals, world: &mut W) -> bool {
        let Some(level) = self.active.as_mut() else {
            log::warn!("Level reset requested with no active level");
            return false;
        };
        apply_stats(&level.config, vitals, world);
        level.session = LevelSession::new(level.session.day_id);
        level.kind.reset();
        log::info!("Day {}: level reset", level.session.day_id);
        true
    }

    /// Drop the active level. Safe to call when none is active.
    pub fn cleanup(&mut self) {
        match self.active.take() {
            Some(level) => log::debug!("Day {}: level cleaned up", level.session.day_id),
            None => log::trace!("Level cleanup with no active level"),
        }
    }
}

fn apply_stats<W: World + ?Sized>(config: &LevelConfig, vitals: &mut PlayerVitals, world: &mut W) {
    vitals.reset(config.max_health, config.health_decay);
    world.restart();
    world.set_scroll_speed(config.scroll_speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::world::testing::TestWorld;

    fn level(day_id: u32, kind: LevelKindConfig) -> LevelConfig {
        LevelConfig {
            day_id,
            kind,
            target_distance: 100.0,
            time_limit_seconds: 60.0,
            scroll_speed: 10.0,
            spawn_interval_frames: 3,
            health_decay: 0.5,
            max_health: 80.0,
            victory_backdrop_height: 50.0,
            lanes: 3,
            seed: Some(42),
            hints: vec![
                TutorialHint {
                    at_distance: 30.0,
                    text: "Duck!".to_string(),
                },
                TutorialHint {
                    at_distance: 0.0,
                    text: "Run!".to_string(),
                },
            ],
        }
    }

    fn lifecycle() -> LevelLifecycle {
        LevelLifecycle::new(LevelCatalog::from_levels([
            level(0, LevelKindConfig::Tutorial),
            level(1, LevelKindConfig::Procedural),
        ]))
    }

    #[test]
    fn initialize_applies_difficulty() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels
            .initialize(1, &mut vitals, &mut world)
            .expect("day 1 exists");

        assert_eq!(levels.day_id(), Some(1));
        assert_eq!(levels.phase(), Some(LevelPhase::Running));
        assert_eq!(vitals.max_health, 80.0);
        assert_eq!(vitals.health, 80.0);
        assert_eq!(vitals.decay_per_frame, 0.5);
        assert_eq!(world.speed, 10.0);
        assert!(world.open);
        assert_eq!(world.restarts, 1);
        assert!(matches!(levels.kind(), Some(LevelKind::Procedural(_))));
    }

    #[test]
    fn initialize_unknown_day_leaves_nothing_active() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(0, &mut vitals, &mut world).expect("day 0");

        let err = levels
            .initialize(9, &mut vitals, &mut world)
            .expect_err("day 9 missing");
        assert_eq!(err, CoreError::ConfigNotFound { day_id: 9 });
        assert!(!levels.is_active());
        assert!(levels.display(&vitals).is_none());
        assert_eq!(levels.update(&vitals, &mut world, None), None);
    }

    #[test]
    fn update_without_level_is_noop() {
        let mut levels = lifecycle();
        let vitals = PlayerVitals::default();
        let mut world = TestWorld::moving(5.0);
        assert_eq!(
            levels.update(&vitals, &mut world, Some(SurvivalOutcome::VictoryReached)),
            None
        );
        assert!(world.spawned.is_empty());
    }

    #[test]
    fn victory_signal_drives_full_sequence() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(1, &mut vitals, &mut world).expect("day 1");

        world.step();
        assert_eq!(
            levels.update(&vitals, &mut world, Some(SurvivalOutcome::VictoryReached)),
            Some(LevelPhaseEvent::EnteredTransition)
        );
        assert!(!world.open);
        let spawned_at_victory = world.spawned.len();

        let mut events = Vec::new();
        for _ in 0..200 {
            world.step();
            events.extend(levels.update(&vitals, &mut world, None));
        }
        assert_eq!(
            events,
            vec![
                LevelPhaseEvent::EnteredZone,
                LevelPhaseEvent::SettlementComplete
            ]
        );
        assert_eq!(world.spawned.len(), spawned_at_victory);
        assert_eq!(world.speed, 0.0);
        assert_eq!(levels.phase(), Some(LevelPhase::VictoryZone));
    }

    #[test]
    fn procedural_spawns_on_interval_and_reset_replays_schedule() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(1, &mut vitals, &mut world).expect("day 1");

        for _ in 0..9 {
            levels.update(&vitals, &mut world, None);
        }
        assert_eq!(world.spawned.len(), 3);
        assert!(world.spawned.iter().all(|&lane| lane < 3));
        let first_run = world.spawned.clone();

        assert!(levels.reset(&mut vitals, &mut world));
        assert!(world.spawned.is_empty());
        for _ in 0..9 {
            levels.update(&vitals, &mut world, None);
        }
        assert_eq!(world.spawned, first_run);
    }

    #[test]
    fn tutorial_reveals_hints_in_distance_order() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(0, &mut vitals, &mut world).expect("day 0");
        assert_eq!(levels.display(&vitals).and_then(|v| v.hint), None);

        levels.update(&vitals, &mut world, None);
        assert_eq!(levels.display(&vitals).and_then(|v| v.hint), Some("Run!"));

        vitals.distance_run = 35.0;
        levels.update(&vitals, &mut world, None);
        assert_eq!(levels.display(&vitals).and_then(|v| v.hint), Some("Duck!"));
        assert!(world.spawned.is_empty());
    }

    #[test]
    fn reset_keeps_day_and_rewinds_phase() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(1, &mut vitals, &mut world).expect("day 1");
        levels.update(&vitals, &mut world, Some(SurvivalOutcome::VictoryReached));
        vitals.tick(10.0);

        assert!(levels.reset(&mut vitals, &mut world));
        assert_eq!(levels.day_id(), Some(1));
        assert_eq!(levels.phase(), Some(LevelPhase::Running));
        assert_eq!(vitals.distance_run, 0.0);
        assert_eq!(vitals.health, 80.0);
        assert!(world.open);
        assert_eq!(world.speed, 10.0);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.cleanup();
        levels.initialize(0, &mut vitals, &mut world).expect("day 0");
        levels.cleanup();
        assert!(!levels.is_active());
        levels.cleanup();
        assert!(!levels.reset(&mut vitals, &mut world));
    }

    #[test]
    fn display_reports_progress_and_time() {
        let mut levels = lifecycle();
        let mut vitals = PlayerVitals::default();
        let mut world = TestWorld::default();
        levels.initialize(1, &mut vitals, &mut world).expect("day 1");
        for _ in 0..5 {
            vitals.tick(10.0);
        }
        let view = levels.display(&vitals).expect("active level");
        assert_eq!(view.day_id, 1);
        assert_eq!(view.kind, "procedural");
        assert!((view.progress - 0.5).abs() < f32::EPSILON);
        assert_eq!(view.frames_remaining, 3600 - 5);
        assert!((view.health_fraction - 77.5 / 80.0).abs() < 1e-5);
        assert_eq!(view.settlement_progress, 0.0);
    }
}
