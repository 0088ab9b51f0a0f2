//! Collaborator interfaces the level lifecycle depends on.
//!
//! The scrolling world, the obstacle system and collision detection live
//! outside the core. The core only reads the scroll position, freezes the
//! scroll, closes the spawn gate and consumes instant-kill hazard reports.

/// Current world scroll, monotonic while running.
pub trait ScrollSource {
    fn scroll_offset(&self) -> f32;
    /// World units scrolled per frame.
    fn scroll_speed(&self) -> f32;
    fn set_scroll_speed(&mut self, speed: f32);
}

/// Entry point of the obstacle system.
pub trait ObstacleGate {
    /// Stop all future spawns. Obstacles already in flight keep moving.
    fn close(&mut self);
    fn is_open(&self) -> bool;
    /// Ask the obstacle system for a new obstacle in `lane`.
    fn spawn(&mut self, lane: u8);
}

/// Everything a running level touches besides the player vitals.
pub trait World: ScrollSource + ObstacleGate {
    /// Advance the world by one frame at the current scroll speed.
    fn step(&mut self);
    /// Consume the instant-kill hazard flag reported by collision detection
    /// since the previous frame.
    fn take_hazard_hit(&mut self) -> bool;
    /// Rewind to the start of a run: scroll offset zero, gate open, no
    /// obstacles in flight.
    fn restart(&mut self);
}
