//! Per-frame failure and victory detection for a running player.
//!
//! The monitor is a pure function over the vitals, the level config and the
//! hazard report for this frame. It must be called after the vitals have been
//! updated for the frame. First match wins:
//!
//! 1. instant-kill hazard reported -> `Fail(HitHazard)`
//! 2. `health <= 0` -> `Fail(Exhausted)`
//! 3. `elapsed_frames` past the time limit -> `Fail(OutOfTime)`
//! 4. target distance reached while still in the running phase -> `VictoryReached`

use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::victory::LevelPhase;
use crate::vitals::PlayerVitals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailReason {
    HitHazard,
    Exhausted,
    OutOfTime,
}

impl FailReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::HitHazard => "hit hazard",
            Self::Exhausted => "exhausted",
            Self::OutOfTime => "out of time",
        }
    }
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivalOutcome {
    Fail(FailReason),
    /// Distance goal reached. Not terminal: it starts the victory sequence.
    VictoryReached,
}

/// Stateless evaluator. Holds no data of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurvivalMonitor;

impl SurvivalMonitor {
    pub fn evaluate(
        vitals: &PlayerVitals,
        config: &LevelConfig,
        hazard_hit: bool,
        phase: LevelPhase,
    ) -> Option<SurvivalOutcome> {
        if hazard_hit {
            return Some(SurvivalOutcome::Fail(FailReason::HitHazard));
        }
        if vitals.is_exhausted() {
            return Some(SurvivalOutcome::Fail(FailReason::Exhausted));
        }
        if vitals.elapsed_frames > config.time_limit_frames() {
            return Some(SurvivalOutcome::Fail(FailReason::OutOfTime));
        }
        if vitals.distance_run >= config.target_distance
            && vitals.health > 0.0
            && phase == LevelPhase::Running
        {
            return Some(SurvivalOutcome::VictoryReached);
        }
        None
    }
}
