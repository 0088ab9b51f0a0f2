use dayrun_core::driver::{FrameReport, SessionDriver};
use dayrun_core::session::{SessionEvent, SessionState};
use dayrun_core::survival::SurvivalOutcome;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::world::HeadlessWorld;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub hazard: bool,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub lane: Option<u8>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Input applied right before one logical frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayInput {
    pub events: Vec<SessionEvent>,
    pub hazard: bool,
    pub ready: bool,
    pub lane: Option<u8>,
}

impl ReplaySequence {
    /// One input per logical frame. Events and hazard reports are edges, so a
    /// repeated frame delivers them on its first repetition only.
    pub fn expanded_frames(&self) -> Vec<ReplayInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                let first = i == 0;
                out.push(ReplayInput {
                    events: if first { frame.events.clone() } else { Vec::new() },
                    hazard: first && frame.hazard,
                    ready: frame.ready,
                    lane: frame.lane,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        if frame.repeat == 0 {
            return Err(format!(
                "Replay validation failed: frame {index} has repeat 0"
            ));
        }
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

/// Feed one replay input into the driver and run the frame.
pub fn apply_input(driver: &mut SessionDriver<HeadlessWorld>, input: &ReplayInput) -> FrameReport {
    if input.ready {
        driver.mark_assets_ready();
    }
    if let Some(lane) = input.lane {
        driver.world_mut().set_player_lane(lane);
    }
    if input.hazard {
        driver.world_mut().report_hazard();
    }
    for event in &input.events {
        driver.push_event(*event);
    }
    driver.step()
}

/// What a finished replay left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub outcomes: Vec<SurvivalOutcome>,
    pub final_state: Option<SessionState>,
    pub distance_run: f32,
    pub health: f32,
    pub obstacles_spawned: u32,
    pub obstacles_passed: u32,
}

impl RunSummary {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames = report.frame;
        self.final_state = Some(report.state);
        if let Some(outcome) = report.outcome {
            self.outcomes.push(outcome);
        }
    }

    pub fn finish(&mut self, driver: &SessionDriver<HeadlessWorld>) {
        self.final_state = Some(driver.state());
        self.distance_run = driver.vitals().distance_run;
        self.health = driver.vitals().health;
        self.obstacles_spawned = driver.world().obstacles_spawned;
        self.obstacles_passed = driver.world().obstacles_passed;
    }
}
