//! Player physics against the tile map.
//!
//! A tick runs these in order: [`apply_gravity`], [`try_jump`],
//! [`steer_horizontal`], body integration, then [`resolve_tile_contacts`].
//! Hazard and finish outcomes are only reported here; the session decides
//! what they do.

use crate::body::{Body, Facing};
use crate::config::{CollisionConfig, GroundPolicy, PhysicsConfig};
use crate::player::PlayerAnim;
use crate::tilemap::{TileGrid, TileKind};

/// Keeps the right-edge sample inside the body when it ends exactly on a tile boundary.
const EDGE_EPSILON: f32 = 0.001;

/// Airborne bookkeeping for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMotion {
    pub falling: bool,
    pub jumps_done: u32,
    /// Up was pressed and the jump has not been taken yet.
    pub jump_armed: bool,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            falling: true,
            jumps_done: 0,
            jump_armed: false,
        }
    }
}

/// What the foot samples found this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileContact {
    pub landed: bool,
    pub hazard: bool,
    pub finish: bool,
}

pub fn apply_gravity(
    body: &mut Body,
    motion: &PlayerMotion,
    physics: &PhysicsConfig,
    elapsed_ms: u64,
) {
    if motion.falling {
        body.vy += physics.gravity * elapsed_ms as f32;
    } else if physics.ground_policy == GroundPolicy::ZeroWhenGrounded {
        body.vy = 0.0;
    }
}

/// Take an armed jump if the jump budget allows it and the body is not
/// already rising. A refused jump stays armed.
pub fn try_jump(body: &mut Body, motion: &mut PlayerMotion, physics: &PhysicsConfig) -> bool {
    if !motion.jump_armed {
        return false;
    }
    if motion.jumps_done >= physics.max_jumps || body.vy < 0.0 {
        return false;
    }
    body.vy = -physics.jump_speed;
    body.shift_y(-physics.jump_detach);
    motion.jumps_done += 1;
    motion.jump_armed = false;
    true
}

/// Apply one left and/or right press. Pressing against fast motion snaps the
/// speed down to `run_step` without changing animation; otherwise the speed
/// grows by `run_step` and the returned animation should be shown.
pub fn steer_horizontal(
    body: &mut Body,
    left: bool,
    right: bool,
    physics: &PhysicsConfig,
) -> Option<PlayerAnim> {
    let step = physics.run_step;
    let mut anim = None;

    if left {
        if body.vx > step {
            body.vx = step;
        } else {
            body.vx -= step;
            body.facing = Facing::Backward;
            anim = Some(PlayerAnim::Left);
        }
    }

    if right {
        if body.vx < -step {
            body.vx = -step;
        } else {
            body.vx += step;
            body.facing = Facing::Forward;
            anim = Some(PlayerAnim::Right);
        }
    }

    anim
}

/// Clamp to the map floor, then sample the tile row under the feet.
pub fn resolve_tile_contacts(
    body: &mut Body,
    motion: &mut PlayerMotion,
    grid: &TileGrid,
    collision: &CollisionConfig,
) -> TileContact {
    let height = body.height();
    let floor = grid.pixel_height();
    if body.y + height > floor {
        body.y = floor - height;
        if body.vy > 0.0 {
            body.vy = 0.0;
        }
    }

    let row = grid.row_at(body.y + height);
    let column = grid.column_at(body.x);
    let mut kinds = [grid.tile_kind(column, row), TileKind::Empty];
    if collision.sample_right_edge {
        let right_column = grid.column_at(body.x + body.width() - EDGE_EPSILON);
        if right_column != column {
            kinds[1] = grid.tile_kind(right_column, row);
        }
    }

    let solid = kinds.contains(&TileKind::Solid);
    let mut contact = TileContact {
        landed: false,
        hazard: kinds.contains(&TileKind::Hazard),
        finish: kinds.contains(&TileKind::Finish),
    };

    if solid && body.vy >= 0.0 {
        body.vy = 0.0;
        body.y = (row * grid.tile_height() as i32) as f32 - height;
        motion.falling = false;
        motion.jumps_done = 0;
        contact.landed = true;
    } else {
        motion.falling = true;
    }

    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use hop_core::animation::{Animation, AnimationFrame, FrameImage, ImageHandle};

    // 8 columns x 6 rows of 32 px. Ground on row 4 except a pit at column 3,
    // lava at column 5 and the flag at column 7.
    const MAP: &str = "\
........
........
........
........
ppp.ptpf
bbbbbbbb
";

    fn grid() -> TileGrid {
        TileGrid::parse(MAP, 32, 32).expect("test map parses")
    }

    fn player_at(x: f32, y: f32) -> Body {
        let frame = AnimationFrame {
            image: FrameImage {
                handle: ImageHandle(0),
                width: 20,
                height: 28,
            },
            duration_ms: 100,
        };
        Body::new(Animation::new(frame, true), x, y)
    }

    #[test]
    fn gravity_accrues_only_while_falling() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 0.0);
        let mut motion = PlayerMotion::default();

        apply_gravity(&mut body, &motion, &physics, 16);
        apply_gravity(&mut body, &motion, &physics, 16);
        assert!((body.vy - 2.0 * 0.0005 * 16.0).abs() < 1e-7);

        motion.falling = false;
        let before = body.vy;
        apply_gravity(&mut body, &motion, &physics, 16);
        assert_eq!(body.vy, before);
    }

    #[test]
    fn zero_when_grounded_policy_stops_vertical_motion() {
        let physics = PhysicsConfig {
            ground_policy: GroundPolicy::ZeroWhenGrounded,
            ..PhysicsConfig::default()
        };
        let mut body = player_at(0.0, 0.0);
        body.vy = 0.3;
        let motion = PlayerMotion {
            falling: false,
            ..PlayerMotion::default()
        };
        apply_gravity(&mut body, &motion, &physics, 16);
        assert_eq!(body.vy, 0.0);
    }

    #[test]
    fn accepted_jump_sets_ascent_and_counts() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 100.0);
        let mut motion = PlayerMotion {
            jump_armed: true,
            ..PlayerMotion::default()
        };

        assert!(try_jump(&mut body, &mut motion, &physics));
        assert_eq!(body.vy, -0.20);
        assert!((body.y - 99.99).abs() < 1e-4);
        assert_eq!(motion.jumps_done, 1);
        assert!(!motion.jump_armed);
    }

    #[test]
    fn jump_refused_while_ascending_and_stays_armed() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 100.0);
        body.vy = -0.05;
        let mut motion = PlayerMotion {
            jump_armed: true,
            jumps_done: 1,
            ..PlayerMotion::default()
        };

        assert!(!try_jump(&mut body, &mut motion, &physics));
        assert_eq!(body.vy, -0.05);
        assert_eq!(motion.jumps_done, 1);
        assert!(motion.jump_armed);

        body.vy = 0.0;
        assert!(try_jump(&mut body, &mut motion, &physics));
        assert_eq!(motion.jumps_done, 2);
    }

    #[test]
    fn third_jump_before_landing_is_refused() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 100.0);
        let mut motion = PlayerMotion {
            jump_armed: true,
            jumps_done: 2,
            ..PlayerMotion::default()
        };
        body.vy = 0.1;
        assert!(!try_jump(&mut body, &mut motion, &physics));
        assert_eq!(body.vy, 0.1);
    }

    #[test]
    fn horizontal_steps_accumulate_and_snap_on_reversal() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 0.0);

        assert_eq!(
            steer_horizontal(&mut body, false, true, &physics),
            Some(PlayerAnim::Right)
        );
        steer_horizontal(&mut body, false, true, &physics);
        assert!((body.vx - 0.08).abs() < 1e-6);
        assert_eq!(body.facing, Facing::Forward);

        // Reversing from 0.08 snaps to 0.04 with no animation change.
        assert_eq!(steer_horizontal(&mut body, true, false, &physics), None);
        assert!((body.vx - 0.04).abs() < 1e-6);
        assert_eq!(body.facing, Facing::Forward);

        // At exactly run_step the next left press accumulates.
        assert_eq!(
            steer_horizontal(&mut body, true, false, &physics),
            Some(PlayerAnim::Left)
        );
        assert!(body.vx.abs() < 1e-6);
        assert_eq!(body.facing, Facing::Backward);
    }

    #[test]
    fn no_input_leaves_velocity_alone() {
        let physics = PhysicsConfig::default();
        let mut body = player_at(0.0, 0.0);
        body.vx = 0.12;
        assert_eq!(steer_horizontal(&mut body, false, false, &physics), None);
        assert_eq!(body.vx, 0.12);
    }

    #[test]
    fn landing_snaps_foot_to_tile_row() {
        let grid = grid();
        let collision = CollisionConfig::default();
        for y in [100.5_f32, 103.0, 110.9, 131.0] {
            let mut body = player_at(10.0, y);
            body.vy = 0.2;
            let mut motion = PlayerMotion {
                jumps_done: 2,
                ..PlayerMotion::default()
            };

            let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &collision);

            assert!(contact.landed, "y={y} should land");
            assert_eq!(body.y + body.height(), 128.0);
            assert_eq!(body.vy, 0.0);
            assert!(!motion.falling);
            assert_eq!(motion.jumps_done, 0);
        }
    }

    #[test]
    fn solid_while_ascending_keeps_falling() {
        let grid = grid();
        let mut body = player_at(10.0, 105.0);
        body.vy = -0.1;
        let mut motion = PlayerMotion {
            falling: false,
            jumps_done: 1,
            jump_armed: false,
        };
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &CollisionConfig::default());
        assert!(!contact.landed);
        assert!(motion.falling);
        assert_eq!(motion.jumps_done, 1);
        assert_eq!(body.y, 105.0);
    }

    #[test]
    fn empty_row_sets_falling() {
        let grid = grid();
        let mut body = player_at(10.0, 20.0);
        let mut motion = PlayerMotion {
            falling: false,
            ..PlayerMotion::default()
        };
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &CollisionConfig::default());
        assert_eq!(contact, TileContact::default());
        assert!(motion.falling);
    }

    #[test]
    fn right_edge_sample_lands_body_straddling_a_pit() {
        let grid = grid();
        // Left edge over the pit (column 3), right edge over ground (column 4).
        let mut body = player_at(120.0, 101.0);
        body.vy = 0.1;
        let mut motion = PlayerMotion::default();

        let robust = CollisionConfig::default();
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &robust);
        assert!(contact.landed);

        let single = CollisionConfig {
            sample_right_edge: false,
            ..CollisionConfig::default()
        };
        let mut body = player_at(120.0, 101.0);
        body.vy = 0.1;
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &single);
        assert!(!contact.landed);
        assert!(motion.falling);
    }

    #[test]
    fn right_edge_on_exact_boundary_does_not_sample_next_column() {
        let grid = grid();
        // Spans x 76..96, so its right edge sits exactly on column 3's left edge.
        let mut body = player_at(76.0, 101.0);
        body.vy = 0.1;
        let mut motion = PlayerMotion::default();
        let contact =
            resolve_tile_contacts(&mut body, &mut motion, &grid, &CollisionConfig::default());
        assert!(contact.landed);
        assert_eq!(grid.column_at(76.0 + 20.0 - EDGE_EPSILON), 2);
    }

    #[test]
    fn hazard_and_finish_are_reported() {
        let grid = grid();
        let collision = CollisionConfig::default();

        let mut body = player_at(166.0, 101.0);
        let mut motion = PlayerMotion::default();
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &collision);
        assert!(contact.hazard);
        assert!(!contact.finish);

        let mut body = player_at(230.0, 101.0);
        let contact = resolve_tile_contacts(&mut body, &mut motion, &grid, &collision);
        assert!(contact.finish);
    }

    #[test]
    fn hazard_under_either_sample_is_reported_alongside_solid() {
        let grid = grid();
        // Straddles ground at column 4 and lava at column 5.
        let mut body = player_at(150.0, 101.0);
        body.vy = 0.1;
        let mut motion = PlayerMotion::default();
        let contact =
            resolve_tile_contacts(&mut body, &mut motion, &grid, &CollisionConfig::default());
        assert!(contact.landed);
        assert!(contact.hazard);
    }

    #[test]
    fn bottom_clamp_keeps_body_on_map_and_stops_descent() {
        let grid = TileGrid::parse("....\n....\n", 32, 32).expect("open map parses");
        let mut body = player_at(10.0, 90.0);
        body.vy = 0.5;
        let mut motion = PlayerMotion::default();

        let contact =
            resolve_tile_contacts(&mut body, &mut motion, &grid, &CollisionConfig::default());

        assert_eq!(body.y + body.height(), 64.0);
        assert_eq!(body.vy, 0.0);
        assert!(!contact.landed);
        assert!(motion.falling);
    }
}
