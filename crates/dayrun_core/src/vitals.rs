//! Survival metrics of the running player.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerVitals {
    pub health: f32,
    pub max_health: f32,
    pub distance_run: f32,
    pub elapsed_frames: u64,
    /// Health lost per running frame.
    pub decay_per_frame: f32,
}

impl PlayerVitals {
    pub fn new(max_health: f32, decay_per_frame: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
            distance_run: 0.0,
            elapsed_frames: 0,
            decay_per_frame: decay_per_frame.max(0.0),
        }
    }

    /// Restore a fresh run with the given difficulty.
    pub fn reset(&mut self, max_health: f32, decay_per_frame: f32) {
        *self = Self::new(max_health, decay_per_frame);
    }

    /// Advance one running frame: cover `stride` distance and decay health.
    ///
    /// Health is clamped at zero; distance never decreases.
    pub fn tick(&mut self, stride: f32) {
        self.distance_run += stride.max(0.0);
        self.health = (self.health - self.decay_per_frame).max(0.0);
        self.elapsed_frames += 1;
    }

    pub fn is_exhausted(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self::new(100.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_distance_and_decays_health() {
        let mut vitals = PlayerVitals::new(100.0, 0.05);
        vitals.distance_run = 4999.5;
        vitals.elapsed_frames = 100;
        vitals.tick(0.5);
        assert!((vitals.distance_run - 5000.0).abs() < f32::EPSILON);
        assert!((vitals.health - 99.95).abs() < 1e-4);
        assert_eq!(vitals.elapsed_frames, 101);
    }

    #[test]
    fn health_clamps_at_zero() {
        let mut vitals = PlayerVitals::new(100.0, 0.05);
        vitals.health = 0.04;
        vitals.tick(1.0);
        assert_eq!(vitals.health, 0.0);
        assert!(vitals.is_exhausted());
    }

    #[test]
    fn negative_stride_never_moves_backwards() {
        let mut vitals = PlayerVitals::new(100.0, 0.0);
        vitals.tick(3.0);
        vitals.tick(-10.0);
        assert!((vitals.distance_run - 3.0).abs() < f32::EPSILON);
    }
}
