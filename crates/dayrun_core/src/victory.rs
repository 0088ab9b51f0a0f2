//! Victory sequence: the level-phase sub-state machine.
//!
//! `Running -> VictoryTransition -> VictoryZone -> (win reported up)`
//!
//! - Entering the transition records the scroll position and closes the
//!   obstacle gate. Obstacles already spawned keep moving.
//! - The zone is entered once the world has scrolled a full backdrop height
//!   past that point. The scroll is frozen there.
//! - The zone counts exactly one frame per tick and reports
//!   `SettlementComplete` once, when the settlement window is full.
//!
//! The sequencer owns no run state. It mutates the [`LevelSession`] passed in.

use crate::time::seconds_to_frames;
use crate::world::{ObstacleGate, ScrollSource};

/// Real-time length of the settlement window.
pub const SETTLEMENT_SECONDS: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelPhase {
    #[default]
    Running,
    VictoryTransition,
    VictoryZone,
}

impl LevelPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::VictoryTransition => "victory transition",
            Self::VictoryZone => "victory zone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhaseEvent {
    EnteredTransition,
    EnteredZone,
    SettlementComplete,
}

/// Run state of one level attempt. Reset on every initialize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSession {
    pub day_id: u32,
    pub phase: LevelPhase,
    pub victory_start_scroll: f32,
    pub victory_zone_frame_count: u32,
    pub victory_zone_start_offset: f32,
}

impl LevelSession {
    pub fn new(day_id: u32) -> Self {
        Self {
            day_id,
            phase: LevelPhase::Running,
            victory_start_scroll: 0.0,
            victory_zone_frame_count: 0,
            victory_zone_start_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VictorySequencer {
    pub backdrop_height: f32,
    pub settlement_frames: u32,
}

impl VictorySequencer {
    pub fn new(backdrop_height: f32) -> Self {
        Self {
            backdrop_height,
            settlement_frames: seconds_to_frames(SETTLEMENT_SECONDS) as u32,
        }
    }

    /// Handle `VictoryReached`. Only the first call per session has effect.
    pub fn begin<W>(&self, session: &mut LevelSession, world: &mut W) -> Option<LevelPhaseEvent>
    where
        W: ScrollSource + ObstacleGate + ?Sized,
    {
        if session.phase != LevelPhase::Running {
            return None;
        }
        session.phase = LevelPhase::VictoryTransition;
        session.victory_start_scroll = world.scroll_offset();
        world.close();
        log::debug!(
            "Day {}: victory transition from scroll {:.1}",
            session.day_id,
            session.victory_start_scroll
        );
        Some(LevelPhaseEvent::EnteredTransition)
    }

    /// Advance one frame of the victory sequence. No-op while running.
    pub fn tick<S>(&self, session: &mut LevelSession, scroll: &mut S) -> Option<LevelPhaseEvent>
    where
        S: ScrollSource + ?Sized,
    {
        match session.phase {
            LevelPhase::Running => None,
            LevelPhase::VictoryTransition => {
                let current = scroll.scroll_offset();
                if current - session.victory_start_scroll < self.backdrop_height {
                    return None;
                }
                scroll.set_scroll_speed(0.0);
                session.phase = LevelPhase::VictoryZone;
                session.victory_zone_frame_count = 0;
                session.victory_zone_start_offset = current;
                log::debug!("Day {}: victory zone at scroll {:.1}", session.day_id, current);
                Some(LevelPhaseEvent::EnteredZone)
            }
            LevelPhase::VictoryZone => {
                if session.victory_zone_frame_count >= self.settlement_frames {
                    return None;
                }
                session.victory_zone_frame_count += 1;
                if session.victory_zone_frame_count == self.settlement_frames {
                    log::debug!("Day {}: settlement complete", session.day_id);
                    Some(LevelPhaseEvent::SettlementComplete)
                } else {
                    None
                }
            }
        }
    }

    /// Settlement progress in `[0, 1]` while in the zone.
    pub fn settlement_progress(&self, session: &LevelSession) -> f32 {
        if session.phase != LevelPhase::VictoryZone || self.settlement_frames == 0 {
            return 0.0;
        }
        session.victory_zone_frame_count as f32 / self.settlement_frames as f32
    }
}
