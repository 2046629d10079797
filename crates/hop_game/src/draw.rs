//! Scene to quads. Everything is emitted in world pixels; the camera applies
//! the horizontal view offset.

use hop_core::animation::FrameImage;
use hop_render::{QuadSpec, SpriteBatch};

use crate::assets::TileImages;
use crate::body::{Body, Facing};
use crate::session::GameSession;

/// Tiles first, then enemies, then the player on top.
pub fn build_scene(batch: &mut SpriteBatch, session: &GameSession, tiles: &TileImages) {
    batch.clear();

    let grid = session.grid();
    let tile_w = grid.tile_width() as f32;
    let tile_h = grid.tile_height() as f32;
    for (column, row, symbol) in grid.occupied() {
        if let Some(image) = tiles.get(symbol) {
            batch.push_quad(QuadSpec::textured(
                texture_key(image),
                column as f32 * tile_w,
                row as f32 * tile_h,
                tile_w,
                tile_h,
            ));
        }
    }

    for enemy in session.enemies() {
        push_body(batch, &enemy.body, enemy.body.facing == Facing::Backward);
    }
    push_body(batch, session.player(), false);
}

fn push_body(batch: &mut SpriteBatch, body: &Body, mirrored: bool) {
    if !body.visible {
        return;
    }
    let image = body.image();
    batch.push_quad(
        QuadSpec::textured(
            texture_key(image),
            body.x,
            body.y,
            image.width as f32,
            image.height as f32,
        )
        .mirrored(mirrored),
    );
}

fn texture_key(image: FrameImage) -> u32 {
    image.handle.0
}
