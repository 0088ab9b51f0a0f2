//! Dayrun -- headless session host.
//!
//! Loads the level catalog and a scripted input replay, then drives the
//! session core one logical frame at a time:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- apply the next replay input and step the driver
//!   3. `end_frame()`, then sleep until the next slice is due
//!
//! With `--fast` the pacing is skipped and the replay runs as fast as the
//! simulation allows. Either way the result is identical, because every timer
//! in the core counts logical frames.
//!
//! Usage: `dayrun_game [levels.json] [replay.json] [--fast]`

mod replay;
mod world;

use std::path::PathBuf;
use std::time::Duration;

use dayrun_core::config::load_catalog_from_path;
use dayrun_core::driver::{FrameReport, SessionDriver};
use dayrun_core::time::TimeState;
use replay::{apply_input, load_replay_from_path, ReplayInput, RunSummary};
use world::HeadlessWorld;

const LEVELS_PATH: &str = "assets/levels/days.json";
const REPLAY_PATH: &str = "assets/replays/demo_run.json";

struct HostArgs {
    levels_path: PathBuf,
    replay_path: PathBuf,
    fast: bool,
}

impl HostArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut fast = false;
        let mut positional = Vec::new();
        for arg in args {
            if arg == "--fast" {
                fast = true;
            } else {
                positional.push(PathBuf::from(arg));
            }
        }
        let mut positional = positional.into_iter();
        Self {
            levels_path: positional
                .next()
                .unwrap_or_else(|| PathBuf::from(LEVELS_PATH)),
            replay_path: positional
                .next()
                .unwrap_or_else(|| PathBuf::from(REPLAY_PATH)),
            fast,
        }
    }
}

fn log_frame(report: &FrameReport) {
    if let Some(outcome) = report.outcome {
        log::info!("Frame {}: survival outcome {:?}", report.frame, outcome);
    }
    if let Some(event) = report.phase_event {
        log::info!("Frame {}: level {:?}", report.frame, event);
    }
    if let Some(fade) = report.fade {
        log::debug!("Frame {}: fade {:?}", report.frame, fade);
    }
}

fn run_fast(driver: &mut SessionDriver<HeadlessWorld>, inputs: &[ReplayInput]) -> RunSummary {
    let mut summary = RunSummary::default();
    for input in inputs {
        let report = apply_input(driver, input);
        log_frame(&report);
        summary.record(&report);
    }
    summary
}

fn run_paced(driver: &mut SessionDriver<HeadlessWorld>, inputs: &[ReplayInput]) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut time = TimeState::new();
    let mut next = 0;
    while next < inputs.len() {
        time.begin_frame();
        while next < inputs.len() && time.should_step() {
            let report = apply_input(driver, &inputs[next]);
            log_frame(&report);
            summary.record(&report);
            next += 1;
        }
        time.end_frame();
        let remaining = (1.0 - time.interpolation_alpha).max(0.0) * time.fixed_dt;
        std::thread::sleep(Duration::from_secs_f64(remaining));
    }
    summary
}

fn run(args: &HostArgs) -> Result<RunSummary, String> {
    let catalog = load_catalog_from_path(&args.levels_path)?;
    log::info!(
        "Loaded {} level(s) from {}: days {:?}",
        catalog.len(),
        args.levels_path.display(),
        catalog.day_ids()
    );
    let replay = load_replay_from_path(&args.replay_path)?;
    let inputs = replay.expanded_frames();
    log::info!(
        "Loaded replay {} ({} frames)",
        args.replay_path.display(),
        inputs.len()
    );

    let mut driver = SessionDriver::new(catalog, HeadlessWorld::new());
    let mut summary = if args.fast {
        run_fast(&mut driver, &inputs)
    } else {
        run_paced(&mut driver, &inputs)
    };
    summary.finish(&driver);
    Ok(summary)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Dayrun session host starting...");

    let args = HostArgs::parse(std::env::args().skip(1));
    match run(&args) {
        Ok(summary) => {
            let state = summary
                .final_state
                .map(|state| state.to_string())
                .unwrap_or_else(|| "none".to_string());
            log::info!(
                "Replay finished after {} frames in {}: distance {:.1}, health {:.1}, {} obstacle(s) spawned, {} dodged, outcomes {:?}",
                summary.frames,
                state,
                summary.distance_run,
                summary.health,
                summary.obstacles_spawned,
                summary.obstacles_passed,
                summary.outcomes
            );
        }
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> HostArgs {
        HostArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_when_no_arguments() {
        let parsed = args(&[]);
        assert_eq!(parsed.levels_path, PathBuf::from(LEVELS_PATH));
        assert_eq!(parsed.replay_path, PathBuf::from(REPLAY_PATH));
        assert!(!parsed.fast);
    }

    #[test]
    fn positional_paths_and_fast_flag() {
        let parsed = args(&["--fast", "a.json", "b.json"]);
        assert_eq!(parsed.levels_path, PathBuf::from("a.json"));
        assert_eq!(parsed.replay_path, PathBuf::from("b.json"));
        assert!(parsed.fast);
    }

    #[test]
    fn missing_catalog_is_reported_with_path() {
        let parsed = args(&["/nonexistent/dayrun/levels.json", "--fast"]);
        let err = run(&parsed).expect_err("missing catalog should fail");
        assert!(err.contains("/nonexistent/dayrun/levels.json"));
    }
}
