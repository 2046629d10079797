//! Game configuration loaded from `assets/config/game.json`.
//!
//! Every section falls back to built-in defaults, so an empty `{}` is a
//! playable configuration as long as the referenced assets exist. Paths are
//! relative to the asset root.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use hop_core::error::read_text;
use hop_core::shell::LoopConfig;
use hop_core::ResourceError;
use hop_platform::window::PlatformConfig;
use serde::Deserialize;

use crate::collision::BoxTest;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub display: DisplayConfig,
    #[serde(rename = "loop")]
    pub game_loop: LoopConfig,
    pub physics: PhysicsConfig,
    pub collision: CollisionConfig,
    pub camera: CameraConfig,
    /// Clear colour, RGB 0-255.
    pub background: [u8; 3],
    pub spawn: SpawnPoint,
    pub levels: Vec<LevelConfig>,
    pub animations: String,
    /// Map character to tile image path.
    pub tiles: BTreeMap<char, String>,
    pub sounds: SoundConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            game_loop: LoopConfig::default(),
            physics: PhysicsConfig::default(),
            collision: CollisionConfig::default(),
            camera: CameraConfig::default(),
            background: [255, 255, 255],
            spawn: SpawnPoint::default(),
            levels: vec![
                LevelConfig::with_map("1", "maps/level1.txt"),
                LevelConfig::with_map("2", "maps/level2.txt"),
            ],
            animations: "animations/player.json".to_string(),
            tiles: BTreeMap::from([
                ('b', "images/tiles/dirt.png".to_string()),
                ('f', "images/tiles/flag.png".to_string()),
                ('p', "images/tiles/grass.png".to_string()),
                ('t', "images/tiles/lava.png".to_string()),
            ]),
            sounds: SoundConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let platform = PlatformConfig::default();
        Self {
            title: platform.title,
            width: platform.width,
            height: platform.height,
            fullscreen: platform.fullscreen,
        }
    }
}

impl DisplayConfig {
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            fullscreen: self.fullscreen,
        }
    }
}

/// How vertical velocity is treated while standing on ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundPolicy {
    /// Gravity only accrues while falling; the landing snap zeroes `vy`.
    #[default]
    ClampOnLanding,
    /// Force `vy = 0` on every tick the body is not falling.
    ZeroWhenGrounded,
}

/// Units are pixels and milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_speed: f32,
    /// Upward nudge applied on take-off so the foot leaves the tile row.
    pub jump_detach: f32,
    pub run_step: f32,
    pub max_jumps: u32,
    pub ground_policy: GroundPolicy,
    pub clear_jump_on_release: bool,
    /// Tiles the body is lifted by when it dies.
    pub death_lift_tiles: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.0005,
            jump_speed: 0.20,
            jump_detach: 0.01,
            run_step: 0.04,
            max_jumps: 2,
            ground_policy: GroundPolicy::default(),
            clear_jump_on_release: false,
            death_lift_tiles: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub box_test: BoxTest,
    /// Also sample the tile under the body's right edge.
    pub sample_right_edge: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            box_test: BoxTest::default(),
            sample_right_edge: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Screen x the player is kept at.
    pub margin: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { margin: 200.0 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self { x: 20.0, y: 100.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelConfig {
    pub id: String,
    pub map: String,
    #[serde(default = "default_tile_size")]
    pub tile_width: u32,
    #[serde(default = "default_tile_size")]
    pub tile_height: u32,
    #[serde(default)]
    pub enemies: Vec<EnemyConfig>,
}

impl LevelConfig {
    pub fn with_map(id: &str, map: &str) -> Self {
        Self {
            id: id.to_string(),
            map: map.to_string(),
            tile_width: default_tile_size(),
            tile_height: default_tile_size(),
            enemies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnemyConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_patrol_min")]
    pub patrol_min: f32,
    #[serde(default = "default_patrol_max")]
    pub patrol_max: f32,
    #[serde(default = "default_patrol_speed")]
    pub speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub jump: String,
    pub death: String,
    pub music: Option<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            jump: "sounds/jump.wav".to_string(),
            death: "sounds/death.wav".to_string(),
            music: None,
        }
    }
}

/// Upper bound for `physics.death_lift_tiles`.
pub const MAX_DEATH_LIFT_TILES: u32 = 64;

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, ResourceError> {
    let raw = read_text(path)?;
    let config: GameConfig =
        serde_json::from_str(&raw).map_err(|e| ResourceError::parse(path, e))?;
    validate_config(&config).map_err(|message| ResourceError::invalid(path, message))?;
    Ok(config)
}

/// Resolve a config-relative asset path against the asset root.
pub fn asset_path(root: &Path, relative: &str) -> PathBuf {
    root.join(relative)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.display.width == 0 || config.display.height == 0 {
        return Err("display width and height must be > 0".to_string());
    }

    let physics = &config.physics;
    let rates = [
        ("gravity", physics.gravity),
        ("jump_speed", physics.jump_speed),
        ("jump_detach", physics.jump_detach),
        ("run_step", physics.run_step),
    ];
    for (name, value) in rates {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("physics.{name} must be finite and >= 0"));
        }
    }
    if physics.max_jumps == 0 {
        return Err("physics.max_jumps must be at least 1".to_string());
    }
    if physics.death_lift_tiles > MAX_DEATH_LIFT_TILES {
        return Err(format!(
            "physics.death_lift_tiles must be at most {MAX_DEATH_LIFT_TILES}"
        ));
    }

    if !config.spawn.x.is_finite() || !config.spawn.y.is_finite() {
        return Err("spawn position must be finite".to_string());
    }

    if config.levels.is_empty() {
        return Err("levels array is empty".to_string());
    }
    let mut level_ids = HashSet::new();
    for level in &config.levels {
        if !level_ids.insert(level.id.as_str()) {
            return Err(format!("duplicate level id '{}'", level.id));
        }
        if level.tile_width == 0 || level.tile_height == 0 {
            return Err(format!("level '{}' has a zero tile size", level.id));
        }
        for (i, enemy) in level.enemies.iter().enumerate() {
            if enemy.patrol_min >= enemy.patrol_max {
                return Err(format!(
                    "level '{}' enemy {i}: patrol_min must be below patrol_max",
                    level.id
                ));
            }
            if !enemy.speed.is_finite() || enemy.speed < 0.0 {
                return Err(format!(
                    "level '{}' enemy {i}: speed must be finite and >= 0",
                    level.id
                ));
            }
        }
    }

    if config.animations.is_empty() {
        return Err("animations path is empty".to_string());
    }
    if config.tiles.is_empty() {
        log::warn!("No tile images configured; maps will draw nothing");
    }

    Ok(())
}

const fn default_tile_size() -> u32 {
    32
}

const fn default_patrol_min() -> f32 {
    250.0
}

const fn default_patrol_max() -> f32 {
    850.0
}

const fn default_patrol_speed() -> f32 {
    0.04
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn empty_object_yields_defaults() {
        let path = temp_file_path("empty");
        fs::write(&path, "{}").expect("write config");

        let config = load_config_from_path(&path).expect("defaults should validate");
        assert_eq!(config.display.width, 1024);
        assert_eq!(config.display.height, 384);
        assert_eq!(config.game_loop.nap_ms, 20);
        assert_eq!(config.physics.max_jumps, 2);
        assert_eq!(config.physics.gravity, 0.0005);
        assert_eq!(config.physics.ground_policy, GroundPolicy::ClampOnLanding);
        assert_eq!(config.collision.box_test, BoxTest::Symmetric);
        assert!(config.collision.sample_right_edge);
        assert_eq!(config.camera.margin, 200.0);
        assert_eq!(config.levels.len(), 2);
        assert_eq!(config.tiles.get(&'t').map(String::as_str), Some("images/tiles/lava.png"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn sections_override_defaults() {
        let path = temp_file_path("override");
        fs::write(
            &path,
            r#"{
              "loop": { "nap_ms": 5, "max_elapsed_ms": null },
              "physics": { "ground_policy": "zero_when_grounded", "clear_jump_on_release": true },
              "collision": { "box_test": "legacy" },
              "levels": [
                { "id": "a", "map": "maps/a.txt", "tile_height": 16,
                  "enemies": [ { "x": 300.0, "y": 96.0 } ] }
              ],
              "tiles": { "p": "images/tiles/grass.png" }
            }"#,
        )
        .expect("write config");

        let config = load_config_from_path(&path).expect("config should load");
        assert_eq!(config.game_loop.nap_ms, 5);
        assert_eq!(config.game_loop.max_elapsed_ms, None);
        assert_eq!(config.physics.ground_policy, GroundPolicy::ZeroWhenGrounded);
        assert!(config.physics.clear_jump_on_release);
        assert_eq!(config.collision.box_test, BoxTest::Legacy);
        let level = &config.levels[0];
        assert_eq!((level.tile_width, level.tile_height), (32, 16));
        assert_eq!(level.enemies[0].patrol_min, 250.0);
        assert_eq!(level.enemies[0].patrol_max, 850.0);
        assert_eq!(level.enemies[0].speed, 0.04);
        assert_eq!(config.tiles.len(), 1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn duplicate_level_ids_fail_validation() {
        let path = temp_file_path("dup_level");
        fs::write(
            &path,
            r#"{ "levels": [ { "id": "1", "map": "a.txt" }, { "id": "1", "map": "b.txt" } ] }"#,
        )
        .expect("write config");

        let err = load_config_from_path(&path).expect_err("duplicate ids must fail");
        assert!(matches!(err, ResourceError::Invalid { .. }));
        assert!(err.to_string().contains("duplicate level id '1'"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn inverted_patrol_bounds_fail_validation() {
        let path = temp_file_path("patrol");
        fs::write(
            &path,
            r#"{ "levels": [ { "id": "1", "map": "a.txt",
                 "enemies": [ { "x": 0.0, "y": 0.0, "patrol_min": 900.0, "patrol_max": 100.0 } ] } ] }"#,
        )
        .expect("write config");

        let err = load_config_from_path(&path).expect_err("bad patrol must fail");
        assert!(err.to_string().contains("patrol_min must be below patrol_max"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn oversized_death_lift_fails_validation() {
        let path = temp_file_path("death_lift");
        fs::write(&path, r#"{ "physics": { "death_lift_tiles": 4000000000 } }"#)
            .expect("write config");

        let err = load_config_from_path(&path).expect_err("huge lift must fail");
        assert!(matches!(err, ResourceError::Invalid { .. }));
        assert!(err.to_string().contains("death_lift_tiles must be at most 64"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ \"physics\": ").expect("write config");
        let err = load_config_from_path(&path).expect_err("malformed json must fail");
        assert!(matches!(err, ResourceError::Parse { .. }));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_max_jumps_is_rejected() {
        let mut config = GameConfig::default();
        config.physics.max_jumps = 0;
        assert!(validate_config(&config).is_err());
    }
}
