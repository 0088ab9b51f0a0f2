//! Top-level session state machine.
//!
//! Exactly one [`SessionState`] is active. Pausing snapshots the suspended
//! state into `previous_state`; resuming restores it verbatim. Help and
//! Settings can be opened from the pause menu. While one of them is showing,
//! the suspended gameplay state moves to `paused_from_subscreen`, so resuming
//! from the subscreen returns to gameplay and not to the subscreen.
//!
//! Only the edges listed in [`SessionStateMachine::can_transition`] are
//! accepted; everything else is `InvalidTransition` and leaves the machine
//! untouched.
//!
//! The machine does not fade. Callers wrap player-visible scene changes in a
//! [`FadeController`](crate::fade::FadeController) trigger and commit the
//! transition from its callback.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::survival::FailReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Loading,
    Splash,
    Menu,
    LevelSelect,
    Settings,
    Help,
    Room,
    Paused,
    Running,
    Fail(FailReason),
    Win,
    Inventory,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Splash => "Splash",
            Self::Menu => "Menu",
            Self::LevelSelect => "LevelSelect",
            Self::Settings => "Settings",
            Self::Help => "Help",
            Self::Room => "Room",
            Self::Paused => "Paused",
            Self::Running => "Running",
            Self::Fail(_) => "Fail",
            Self::Win => "Win",
            Self::Inventory => "Inventory",
        }
    }

    /// Gameplay states that may be suspended by a pause.
    pub fn is_pausable(self) -> bool {
        matches!(self, Self::Running | Self::Room | Self::Inventory)
    }

    /// Screens reachable from the pause menu.
    pub fn is_pause_subscreen(self) -> bool {
        matches!(self, Self::Help | Self::Settings)
    }

    pub fn is_run_end(self) -> bool {
        matches!(self, Self::Fail(_) | Self::Win)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail(reason) => write!(f, "Fail({reason})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Symbolic requests produced by input routing and menu UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    RequestPause,
    RequestResume,
    RequestState(SessionState),
    RequestRunStart(u32),
}

pub struct SessionStateMachine {
    current: SessionState,
    previous_state: Option<SessionState>,
    paused_from_subscreen: Option<SessionState>,
    frames_in_state: u64,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::with_state(SessionState::Loading)
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            current: state,
            previous_state: None,
            paused_from_subscreen: None,
            frames_in_state: 0,
        }
    }

    pub fn current(&self) -> SessionState {
        self.current
    }

    pub fn previous_state(&self) -> Option<SessionState> {
        self.previous_state
    }

    pub fn paused_from_subscreen(&self) -> Option<SessionState> {
        self.paused_from_subscreen
    }

    /// True on the pause menu and on any subscreen opened from it.
    pub fn is_paused(&self) -> bool {
        self.current == SessionState::Paused || self.paused_from_subscreen.is_some()
    }

    /// Gameplay state a resume would return to.
    pub fn suspended_state(&self) -> Option<SessionState> {
        if self.current == SessionState::Paused {
            self.previous_state
        } else {
            self.paused_from_subscreen
        }
    }

    pub fn frames_in_state(&self) -> u64 {
        self.frames_in_state
    }

    /// Count one frame spent in the current state.
    pub fn tick(&mut self) {
        self.frames_in_state += 1;
    }

    /// Whether `request_transition(to)` would be accepted from here.
    pub fn can_transition(&self, to: SessionState) -> bool {
        use SessionState::*;

        let from = self.current;
        if to == from {
            return false;
        }
        if self.is_paused() {
            // Pause menu overlays, or quitting the suspended run.
            return matches!(to, Paused | Help | Settings | Menu | LevelSelect);
        }
        match (from, to) {
            (_, Paused) => from.is_pausable(),
            (Loading, Splash) | (Splash, Menu) => true,
            (Menu, LevelSelect | Settings | Help | Room | Running) => true,
            (LevelSelect, Menu | Room | Running) => true,
            (Settings, Menu | Help) | (Help, Menu | Settings) => true,
            (Room, Inventory | Running | LevelSelect | Menu) => true,
            (Inventory, Room) => true,
            (Running, Fail(_) | Win | Menu | LevelSelect) => true,
            (Fail(_) | Win, Running | Menu | LevelSelect) => true,
            _ => false,
        }
    }

    pub fn request_transition(&mut self, new_state: SessionState) -> CoreResult<SessionState> {
        let from = self.current;
        if new_state == from {
            return Err(self.invalid(format!("already in {new_state}")));
        }
        if !self.can_transition(new_state) {
            return Err(self.invalid(format!("enter {new_state}")));
        }

        match new_state {
            SessionState::Paused => {
                // Back from Help/Settings to the pause menu, or a fresh pause.
                self.previous_state = Some(self.paused_from_subscreen.take().unwrap_or(from));
            }
            s if s.is_pause_subscreen() && from == SessionState::Paused => {
                self.paused_from_subscreen = self.previous_state.take();
            }
            s if s.is_pause_subscreen() && self.paused_from_subscreen.is_some() => {}
            _ => {
                self.previous_state = None;
                self.paused_from_subscreen = None;
            }
        }

        Ok(self.enter(new_state))
    }

    /// Return to the gameplay state suspended by the last pause.
    pub fn resume(&mut self) -> CoreResult<SessionState> {
        let Some(target) = self.suspended_state() else {
            return Err(self.invalid("resume".to_string()));
        };
        self.previous_state = None;
        self.paused_from_subscreen = None;
        Ok(self.enter(target))
    }

    pub fn toggle_pause(&mut self) -> CoreResult<SessionState> {
        if self.is_paused() {
            self.resume()
        } else {
            self.request_transition(SessionState::Paused)
        }
    }

    fn enter(&mut self, new_state: SessionState) -> SessionState {
        log::info!("Session: {} -> {}", self.current, new_state);
        self.current = new_state;
        self.frames_in_state = 0;
        new_state
    }

    fn invalid(&self, request: String) -> CoreError {
        CoreError::InvalidTransition {
            from: self.current,
            request,
        }
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
