//! The running game: one level at a time, advanced by `tick`.
//!
//! Order within a tick: reset and level select, then (while alive) gravity,
//! jump, horizontal input, player integration, tile contacts, enemy patrol,
//! and finally player/enemy overlap. Tile priority is hazard, then finish,
//! then solid ground. While the player is dead nothing moves until reset.

use hop_core::input::{InputState, Key};

use crate::audio::SoundCue;
use crate::body::Body;
use crate::collision::handle_sprite_collisions;
use crate::config::{CollisionConfig, GameConfig, PhysicsConfig, SpawnPoint};
use crate::level::{Enemy, LevelCatalog, LevelState};
use crate::physics::{apply_gravity, resolve_tile_contacts, steer_horizontal, try_jump};
use crate::player::{AnimationTable, PlayerAnim};
use crate::tilemap::TileGrid;

pub const DEAD_STATUS: &str = "Game over! Press F5 to restart";

/// Input for one tick, sampled from the keyboard state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub up_released: bool,
    pub left: bool,
    pub right: bool,
    pub reset: bool,
    /// 1-based level number from the digit keys.
    pub level_select: Option<u8>,
}

impl TickInput {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            up: input.is_just_pressed(Key::Up),
            up_released: input.is_just_released(Key::Up),
            left: input.is_just_pressed(Key::Left),
            right: input.is_just_pressed(Key::Right),
            reset: input.is_just_pressed(Key::F5),
            level_select: input.just_pressed_digit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundCue),
    Died,
    LevelChanged(String),
    Respawned,
}

pub struct GameSession {
    catalog: LevelCatalog,
    animations: AnimationTable,
    physics: PhysicsConfig,
    collision: CollisionConfig,
    spawn: SpawnPoint,
    state: LevelState,
}

impl GameSession {
    pub fn new(catalog: LevelCatalog, animations: AnimationTable, config: &GameConfig) -> Self {
        let spawn = config.spawn;
        let state = LevelState::build(catalog.first(), 0, spawn, &animations);
        log::info!(
            "Session started on level '{}' ({} levels)",
            state.id,
            catalog.len()
        );
        Self {
            catalog,
            animations,
            physics: config.physics.clone(),
            collision: config.collision.clone(),
            spawn,
            state,
        }
    }

    pub fn tick(&mut self, input: &TickInput, elapsed_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if input.reset {
            self.reset();
            events.push(GameEvent::Respawned);
        }
        if let Some(number) = input.level_select {
            let index = usize::from(number.saturating_sub(1));
            if number > 0 && self.load_level(index) {
                events.push(GameEvent::LevelChanged(self.state.id.clone()));
            } else {
                log::warn!("No level {} to select", number);
            }
        }

        if self.state.game_over {
            return events;
        }

        if input.up {
            self.state.motion.jump_armed = true;
        }
        if input.up_released && self.physics.clear_jump_on_release {
            self.state.motion.jump_armed = false;
        }

        self.state.score_ms += elapsed_ms;

        apply_gravity(
            &mut self.state.player,
            &self.state.motion,
            &self.physics,
            elapsed_ms,
        );
        if try_jump(&mut self.state.player, &mut self.state.motion, &self.physics) {
            self.set_player_anim(PlayerAnim::Up);
            events.push(GameEvent::Sound(SoundCue::Jump));
        }
        if let Some(anim) =
            steer_horizontal(&mut self.state.player, input.left, input.right, &self.physics)
        {
            self.set_player_anim(anim);
        }

        self.state.player.update(elapsed_ms);

        let contact = resolve_tile_contacts(
            &mut self.state.player,
            &mut self.state.motion,
            &self.state.grid,
            &self.collision,
        );
        if contact.hazard {
            self.die(&mut events);
            return events;
        }
        if contact.finish {
            let next = self.catalog.next_index(self.state.index);
            self.load_level(next);
            events.push(GameEvent::LevelChanged(self.state.id.clone()));
            return events;
        }

        for enemy in &mut self.state.enemies {
            enemy.patrol.steer(&mut enemy.body);
            enemy.body.update(elapsed_ms);
        }

        let hit = handle_sprite_collisions(
            &self.state.player,
            self.state.enemies.iter().map(|enemy| &enemy.body),
            self.collision.box_test,
        );
        if hit {
            self.die(&mut events);
        }

        events
    }

    /// Rebuild the current level from scratch. Allowed alive or dead.
    pub fn reset(&mut self) {
        self.load_level(self.state.index);
        log::info!("Player respawned on level '{}'", self.state.id);
    }

    /// Replace the level state with a fresh build of level `index`.
    /// Returns false, changing nothing, when there is no such level.
    pub fn load_level(&mut self, index: usize) -> bool {
        let Some(definition) = self.catalog.get(index) else {
            return false;
        };
        if index != self.state.index {
            log::info!("Level '{}' -> '{}'", self.state.id, definition.id);
        }
        self.state = LevelState::build(definition, index, self.spawn, &self.animations);
        true
    }

    fn die(&mut self, events: &mut Vec<GameEvent>) {
        let state = &mut self.state;
        state.game_over = true;
        state.player.stop();
        let lift = self
            .physics
            .death_lift_tiles
            .saturating_mul(state.grid.tile_height()) as f32;
        state.player.shift_y(-lift);
        self.set_player_anim(PlayerAnim::Dead);
        log::info!(
            "Player died on level '{}' with score {}",
            self.state.id,
            self.score()
        );
        events.push(GameEvent::Sound(SoundCue::Death));
        events.push(GameEvent::Died);
    }

    fn set_player_anim(&mut self, anim: PlayerAnim) {
        if self.state.player_anim != anim {
            self.state.player_anim = anim;
            self.state
                .player
                .set_animation(self.animations.player(anim));
        }
    }

    pub fn score(&self) -> u64 {
        self.state.score_ms / 100
    }

    pub fn status_text(&self) -> String {
        if self.state.game_over {
            DEAD_STATUS.to_string()
        } else {
            format!("Score: {}", self.score())
        }
    }

    pub fn level_id(&self) -> &str {
        &self.state.id
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn player(&self) -> &Body {
        &self.state.player
    }

    pub fn player_anim(&self) -> PlayerAnim {
        self.state.player_anim
    }

    pub fn jumps_done(&self) -> u32 {
        self.state.motion.jumps_done
    }

    pub fn is_falling(&self) -> bool {
        self.state.motion.falling
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.state.enemies
    }

    pub fn grid(&self) -> &TileGrid {
        &self.state.grid
    }

    /// Horizontal screen offset that keeps the player `margin` px from the left edge.
    pub fn view_offset_x(&self, margin: f32) -> f32 {
        margin - self.state.player.x
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut LevelState {
        &mut self.state
    }
}
