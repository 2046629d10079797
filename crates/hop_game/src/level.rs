//! Levels: the preloaded catalog and the live state of the current level.
//!
//! Every map is loaded and validated before the loop starts, so changing
//! level at runtime cannot fail. A level change or reset throws the old
//! [`LevelState`] away and builds a new one from its definition.

use std::path::Path;
use std::sync::Arc;

use hop_core::ResourceError;

use crate::assets::TileImages;
use crate::body::Body;
use crate::config::{asset_path, LevelConfig, SpawnPoint};
use crate::patrol::Patrol;
use crate::physics::PlayerMotion;
use crate::player::{AnimationTable, PlayerAnim};
use crate::tilemap::{load_tile_grid_from_path, TileGrid, EMPTY_TILE};

#[derive(Debug, Clone)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub patrol: Patrol,
}

#[derive(Debug, Clone)]
pub struct LevelDefinition {
    pub id: String,
    pub grid: Arc<TileGrid>,
    pub enemies: Vec<EnemySpawn>,
}

#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    pub fn load(levels: &[LevelConfig], root: &Path) -> Result<Self, ResourceError> {
        let mut definitions = Vec::with_capacity(levels.len());
        for level in levels {
            let path = asset_path(root, &level.map);
            let grid = load_tile_grid_from_path(&path, level.tile_width, level.tile_height)?;
            log::info!(
                "Level '{}': {} px wide, {} enemies",
                level.id,
                grid.pixel_width(),
                level.enemies.len()
            );
            let enemies = level
                .enemies
                .iter()
                .map(|enemy| EnemySpawn {
                    x: enemy.x,
                    y: enemy.y,
                    patrol: Patrol::new(enemy.patrol_min, enemy.patrol_max, enemy.speed),
                })
                .collect();
            definitions.push(LevelDefinition {
                id: level.id.clone(),
                grid: Arc::new(grid),
                enemies,
            });
        }
        Self::from_definitions(definitions).ok_or_else(|| {
            ResourceError::invalid(root, "no levels configured")
        })
    }

    /// `None` when `levels` is empty.
    pub fn from_definitions(levels: Vec<LevelDefinition>) -> Option<Self> {
        if levels.is_empty() {
            None
        } else {
            Some(Self { levels })
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn first(&self) -> &LevelDefinition {
        &self.levels[0]
    }

    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    /// The level after `index`, wrapping to the first.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    /// Log map symbols that have no tile image and so will not be drawn.
    pub fn warn_undrawable_tiles(&self, tiles: &TileImages) {
        for level in &self.levels {
            let mut missing: Vec<char> = level
                .grid
                .occupied()
                .map(|(_, _, symbol)| symbol)
                .filter(|&symbol| symbol != EMPTY_TILE && !tiles.contains(symbol))
                .collect();
            missing.sort_unstable();
            missing.dedup();
            if !missing.is_empty() {
                log::warn!(
                    "Level '{}' uses tile symbols with no image: {:?}",
                    level.id,
                    missing
                );
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    pub patrol: Patrol,
}

/// Everything that is rebuilt on level change or reset.
#[derive(Debug, Clone)]
pub struct LevelState {
    pub index: usize,
    pub id: String,
    pub grid: Arc<TileGrid>,
    pub player: Body,
    pub player_anim: PlayerAnim,
    pub enemies: Vec<Enemy>,
    pub motion: PlayerMotion,
    pub game_over: bool,
    /// Milliseconds survived on this level.
    pub score_ms: u64,
}

impl LevelState {
    pub fn build(
        definition: &LevelDefinition,
        index: usize,
        spawn: SpawnPoint,
        animations: &AnimationTable,
    ) -> Self {
        let player = Body::new(animations.player(PlayerAnim::Idle), spawn.x, spawn.y);
        let enemies = definition
            .enemies
            .iter()
            .map(|spawn| Enemy {
                body: Body::new(animations.enemy(), spawn.x, spawn.y),
                patrol: spawn.patrol,
            })
            .collect();

        Self {
            index,
            id: definition.id.clone(),
            grid: Arc::clone(&definition.grid),
            player,
            player_anim: PlayerAnim::Idle,
            enemies,
            motion: PlayerMotion::default(),
            game_over: false,
            score_ms: 0,
        }
    }
}
