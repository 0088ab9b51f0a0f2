//! Headless stand-in for the scrolling world.
//!
//! Obstacles spawn a fixed distance ahead of the player and close in at the
//! scroll speed. One that reaches the player in the player's lane is an
//! instant-kill hazard hit, reported to the core on the next frame.

use dayrun_core::world::{ObstacleGate, ScrollSource, World};

/// Distance ahead of the player at which new obstacles appear.
pub const SPAWN_DISTANCE: f32 = 480.0;
pub const START_LANE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub lane: u8,
    pub distance: f32,
}

#[derive(Debug)]
pub struct HeadlessWorld {
    scroll_offset: f32,
    scroll_speed: f32,
    gate_open: bool,
    obstacles: Vec<Obstacle>,
    player_lane: u8,
    hazard_hit: bool,
    pub obstacles_spawned: u32,
    pub obstacles_passed: u32,
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0.0,
            scroll_speed: 0.0,
            gate_open: true,
            obstacles: Vec::new(),
            player_lane: START_LANE,
            hazard_hit: false,
            obstacles_spawned: 0,
            obstacles_passed: 0,
        }
    }

    pub fn set_player_lane(&mut self, lane: u8) {
        self.player_lane = lane;
    }

    /// Scripted collision report, e.g. from a replay.
    pub fn report_hazard(&mut self) {
        self.hazard_hit = true;
    }
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSource for HeadlessWorld {
    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed.max(0.0);
    }
}

impl ObstacleGate for HeadlessWorld {
    fn close(&mut self) {
        if self.gate_open {
            log::debug!(
                "Obstacle gate closed with {} in flight",
                self.obstacles.len()
            );
        }
        self.gate_open = false;
    }

    fn is_open(&self) -> bool {
        self.gate_open
    }

    fn spawn(&mut self, lane: u8) {
        if !self.gate_open {
            log::trace!("Spawn in lane {lane} refused: gate closed");
            return;
        }
        self.obstacles.push(Obstacle {
            lane,
            distance: SPAWN_DISTANCE,
        });
        self.obstacles_spawned += 1;
    }
}

impl World for HeadlessWorld {
    fn step(&mut self) {
        let speed = self.scroll_speed;
        self.scroll_offset += speed;

        let player_lane = self.player_lane;
        let mut hit = false;
        let mut passed = 0;
        self.obstacles.retain_mut(|obstacle| {
            obstacle.distance -= speed;
            if obstacle.distance > 0.0 {
                return true;
            }
            if obstacle.lane == player_lane {
                hit = true;
            } else {
                passed += 1;
            }
            false
        });
        self.obstacles_passed += passed;
        if hit {
            log::debug!("Obstacle hit in lane {player_lane}");
            self.hazard_hit = true;
        }
    }

    fn take_hazard_hit(&mut self) -> bool {
        std::mem::take(&mut self.hazard_hit)
    }

    fn restart(&mut self) {
        self.scroll_offset = 0.0;
        self.gate_open = true;
        self.obstacles.clear();
        self.player_lane = START_LANE;
        self.hazard_hit = false;
    }
}
