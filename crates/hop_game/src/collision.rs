//! Body-to-body overlap tests.

use serde::Deserialize;

use crate::body::Body;

/// Axis-aligned box, top-left anchored, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Open-interval overlap; boxes that only share an edge do not touch.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Which overlap formula decides a player/enemy hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxTest {
    #[default]
    Symmetric,
    /// Only reports hits where the player's top-left is left of and above
    /// the enemy's. Kept for replaying old level tuning.
    Legacy,
}

impl BoxTest {
    pub fn collides(self, player: &Aabb, enemy: &Aabb) -> bool {
        match self {
            Self::Symmetric => player.overlaps(enemy),
            Self::Legacy => {
                player.right() > enemy.x
                    && player.x <= enemy.x
                    && player.bottom() > enemy.y
                    && player.y < enemy.y
            }
        }
    }
}

/// True when the player touches any visible enemy.
pub fn handle_sprite_collisions<'a>(
    player: &Body,
    enemies: impl IntoIterator<Item = &'a Body>,
    test: BoxTest,
) -> bool {
    let player_box = player.bounds();
    enemies
        .into_iter()
        .filter(|enemy| enemy.visible)
        .any(|enemy| test.collides(&player_box, &enemy.bounds()))
}
