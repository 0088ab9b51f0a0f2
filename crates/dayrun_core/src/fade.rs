//! Full-screen cross-fade used to mask scene changes.
//!
//! A fade runs `0 -> 255 -> 0`. The pending callback fires exactly once, on the
//! frame alpha first reaches 255, so whatever it changes happens behind a
//! fully opaque overlay. The controller is generic over the context `C` handed
//! to that callback, which lets the owner pass its own mutable state in at
//! tick time instead of capturing it.

use crate::time::FRAME_RATE;

/// Real-time length of one half of the fade (black-in or black-out).
pub const FADE_DURATION_SECONDS: f32 = 0.3;

pub const ALPHA_OPAQUE: f32 = 255.0;

// Accumulated float steps may land a hair short of either end.
const ALPHA_SNAP: f32 = 1e-3;

pub type FadeCallback<C> = Box<dyn FnOnce(&mut C)>;

/// Milestones reported by [`FadeController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEvent {
    /// Alpha reached 255 and the pending callback (if any) ran.
    Opaque,
    /// Alpha returned to 0; the controller is idle again.
    Cleared,
}

pub struct FadeController<C> {
    alpha: f32,
    direction: f32,
    active: bool,
    rate: f32,
    pending_callback: Option<FadeCallback<C>>,
}

impl<C> FadeController<C> {
    pub fn new() -> Self {
        Self::with_duration(FADE_DURATION_SECONDS, FRAME_RATE)
    }

    /// Alpha step per frame is `255 / (duration_seconds * frame_rate)`.
    pub fn with_duration(duration_seconds: f32, frame_rate: u32) -> Self {
        let frames = (duration_seconds * frame_rate as f32).round().max(1.0);
        Self {
            alpha: 0.0,
            direction: 1.0,
            active: false,
            rate: ALPHA_OPAQUE / frames,
            pending_callback: None,
        }
    }

    /// Start a fade that runs `callback` at full opacity.
    ///
    /// Returns `false` and leaves everything untouched when a fade is already
    /// in progress. Requests are never queued.
    pub fn trigger<F>(&mut self, callback: F) -> bool
    where
        F: FnOnce(&mut C) + 'static,
    {
        if self.active {
            log::trace!("Fade already active at alpha {:.1}; trigger ignored", self.alpha);
            return false;
        }
        self.active = true;
        self.alpha = 0.0;
        self.direction = 1.0;
        self.pending_callback = Some(Box::new(callback));
        log::debug!("Fade started");
        true
    }

    /// Advance one frame. Call unconditionally once per frame.
    pub fn tick(&mut self, ctx: &mut C) -> Option<FadeEvent> {
        if !self.active {
            return None;
        }

        self.alpha += self.rate * self.direction;

        if self.direction > 0.0 && self.alpha >= ALPHA_OPAQUE - ALPHA_SNAP {
            self.alpha = ALPHA_OPAQUE;
            self.direction = -1.0;
            if let Some(callback) = self.pending_callback.take() {
                callback(ctx);
            }
            log::debug!("Fade opaque");
            return Some(FadeEvent::Opaque);
        }

        if self.direction < 0.0 && self.alpha <= ALPHA_SNAP {
            self.alpha = 0.0;
            self.active = false;
            self.direction = 1.0;
            log::debug!("Fade cleared");
            return Some(FadeEvent::Cleared);
        }

        None
    }

    /// Overlay opacity for the renderer, in `[0, 255]`.
    pub fn current_alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl<C> Default for FadeController<C> {
    fn default() -> Self {
        Self::new()
    }
}
