//! Per-day level configuration loaded from a JSON catalog.

use serde::Deserialize;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::time::seconds_to_frames;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelKindConfig {
    Tutorial,
    #[default]
    Procedural,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TutorialHint {
    pub at_distance: f32,
    pub text: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LevelConfig {
    pub day_id: u32,
    #[serde(default)]
    pub kind: LevelKindConfig,
    pub target_distance: f32,
    pub time_limit_seconds: f32,
    pub scroll_speed: f32,
    pub spawn_interval_frames: u32,
    #[serde(default)]
    pub health_decay: f32,
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default = "default_backdrop_height")]
    pub victory_backdrop_height: f32,
    #[serde(default = "default_lanes")]
    pub lanes: u8,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub hints: Vec<TutorialHint>,
}

impl LevelConfig {
    pub fn time_limit_frames(&self) -> u64 {
        seconds_to_frames(self.time_limit_seconds)
    }

    /// Seed for procedural spawns; falls back to the day id so every day
    /// has a stable schedule.
    pub fn spawn_seed(&self) -> u64 {
        self.seed.unwrap_or(self.day_id as u64)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelCatalogFile {
    pub version: String,
    pub levels: Vec<LevelConfig>,
}

/// Read-only lookup of level configuration by day id.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: HashMap<u32, LevelConfig>,
}

impl LevelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_levels(levels: impl IntoIterator<Item = LevelConfig>) -> Self {
        Self {
            levels: levels.into_iter().map(|l| (l.day_id, l)).collect(),
        }
    }

    pub fn get(&self, day_id: u32) -> CoreResult<&LevelConfig> {
        self.levels
            .get(&day_id)
            .ok_or(CoreError::ConfigNotFound { day_id })
    }

    pub fn contains(&self, day_id: u32) -> bool {
        self.levels.contains_key(&day_id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Day ids in ascending order.
    pub fn day_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.levels.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

pub fn load_catalog_from_path(path: &Path) -> Result<LevelCatalog, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level catalog {}: {e}", path.display()))?;
    let file: LevelCatalogFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level catalog {}: {e}", path.display()))?;
    validate_catalog(&file)?;
    log::info!(
        "Loaded level catalog {} ({} levels, version {})",
        path.display(),
        file.levels.len(),
        file.version
    );
    Ok(LevelCatalog::from_levels(file.levels))
}

fn validate_catalog(file: &LevelCatalogFile) -> Result<(), String> {
    if file.levels.is_empty() {
        return Err("Level catalog validation failed: levels array is empty".to_string());
    }

    let mut day_ids = HashSet::new();
    for level in &file.levels {
        if !day_ids.insert(level.day_id) {
            return Err(format!(
                "Level catalog validation failed: duplicate day id {}",
                level.day_id
            ));
        }
        validate_level(level)?;
    }
    Ok(())
}

fn validate_level(level: &LevelConfig) -> Result<(), String> {
    let day = level.day_id;
    let positive = [
        ("target_distance", level.target_distance),
        ("time_limit_seconds", level.time_limit_seconds),
        ("scroll_speed", level.scroll_speed),
        ("max_health", level.max_health),
        ("victory_backdrop_height", level.victory_backdrop_height),
    ];
    for (field, value) in positive {
        if !(value > 0.0) {
            return Err(format!(
                "Level catalog validation failed: day {day} {field} must be > 0"
            ));
        }
    }
    if level.health_decay < 0.0 {
        return Err(format!(
            "Level catalog validation failed: day {day} health_decay must be >= 0"
        ));
    }
    if level.spawn_interval_frames == 0 {
        return Err(format!(
            "Level catalog validation failed: day {day} spawn_interval_frames must be > 0"
        ));
    }
    if level.lanes == 0 {
        return Err(format!(
            "Level catalog validation failed: day {day} lanes must be > 0"
        ));
    }
    if level.kind == LevelKindConfig::Procedural && !level.hints.is_empty() {
        log::warn!("Day {day} is procedural; its tutorial hints will be ignored.");
    }
    Ok(())
}

const fn default_max_health() -> f32 {
    100.0
}

const fn default_backdrop_height() -> f32 {
    720.0
}

const fn default_lanes() -> u8 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dayrun_catalog_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn load_catalog_parses_levels_with_defaults() {
        let path = temp_file_path("valid");
        let json = r#"
        {
          "version": "0.1",
          "levels": [
            {
              "day_id": 1,
              "kind": "tutorial",
              "target_distance": 600.0,
              "time_limit_seconds": 60.0,
              "scroll_speed": 2.0,
              "spawn_interval_frames": 90,
              "hints": [{ "at_distance": 0.0, "text": "Jump!" }]
            },
            {
              "day_id": 2,
              "target_distance": 5000.0,
              "time_limit_seconds": 1800.0,
              "scroll_speed": 0.5,
              "spawn_interval_frames": 45,
              "health_decay": 0.05,
              "seed": 7
            }
          ]
        }
        "#;
        fs::write(&path, json).expect("write catalog");

        let catalog = load_catalog_from_path(&path).expect("valid catalog should load");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.day_ids(), vec![1, 2]);

        let tutorial = catalog.get(1).expect("day 1");
        assert_eq!(tutorial.kind, LevelKindConfig::Tutorial);
        assert_eq!(tutorial.max_health, 100.0);
        assert_eq!(tutorial.lanes, 3);
        assert_eq!(tutorial.hints.len(), 1);
        assert_eq!(tutorial.spawn_seed(), 1);

        let procedural = catalog.get(2).expect("day 2");
        assert_eq!(procedural.kind, LevelKindConfig::Procedural);
        assert_eq!(procedural.time_limit_frames(), 108_000);
        assert_eq!(procedural.spawn_seed(), 7);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_day_is_config_not_found() {
        let catalog = LevelCatalog::new();
        assert_eq!(
            catalog.get(9).expect_err("empty catalog"),
            CoreError::ConfigNotFound { day_id: 9 }
        );
    }

    #[test]
    fn load_catalog_rejects_duplicate_day_ids() {
        let path = temp_file_path("dup_day");
        let json = r#"
        {
          "version": "0.1",
          "levels": [
            { "day_id": 3, "target_distance": 10.0, "time_limit_seconds": 5.0, "scroll_speed": 1.0, "spawn_interval_frames": 10 },
            { "day_id": 3, "target_distance": 20.0, "time_limit_seconds": 5.0, "scroll_speed": 1.0, "spawn_interval_frames": 10 }
          ]
        }
        "#;
        fs::write(&path, json).expect("write catalog");
        let err = load_catalog_from_path(&path).expect_err("duplicate day ids should fail");
        assert!(err.contains("duplicate day id 3"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_catalog_rejects_empty_levels() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "version": "0.1", "levels": [] }"#).expect("write catalog");
        let err = load_catalog_from_path(&path).expect_err("empty catalog should fail");
        assert!(err.contains("levels array is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_catalog_rejects_non_positive_target() {
        let path = temp_file_path("zero_target");
        let json = r#"
        {
          "version": "0.1",
          "levels": [
            { "day_id": 1, "target_distance": 0.0, "time_limit_seconds": 5.0, "scroll_speed": 1.0, "spawn_interval_frames": 10 }
          ]
        }
        "#;
        fs::write(&path, json).expect("write catalog");
        let err = load_catalog_from_path(&path).expect_err("zero target should fail");
        assert!(err.contains("target_distance must be > 0"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_catalog_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read level catalog"));
    }
}
