pub mod config;
pub mod driver;
pub mod error;
pub mod fade;
pub mod input;
pub mod level;
pub mod session;
pub mod survival;
pub mod time;
pub mod victory;
pub mod vitals;
pub mod world;

pub use config::{load_catalog_from_path, LevelCatalog, LevelConfig};
pub use driver::{FrameReport, SceneChange, SessionDriver};
pub use error::{CoreError, CoreResult};
pub use fade::{FadeController, FadeEvent};
pub use level::{LevelLifecycle, LevelView};
pub use session::{SessionEvent, SessionState, SessionStateMachine};
pub use survival::{FailReason, SurvivalMonitor, SurvivalOutcome};
pub use time::TimeState;
pub use victory::{LevelPhase, VictorySequencer};
pub use vitals::PlayerVitals;
pub use world::{ObstacleGate, ScrollSource, World};
