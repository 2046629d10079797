use crate::body::{Body, Facing};

/// Horizontal patrol between two world x bounds. Enemies ignore gravity and tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    pub min_x: f32,
    pub max_x: f32,
    pub speed: f32,
}

impl Patrol {
    pub fn new(min_x: f32, max_x: f32, speed: f32) -> Self {
        Self { min_x, max_x, speed }
    }

    /// Turn around once past a bound in the direction of travel, then set
    /// the horizontal velocity for this tick.
    pub fn steer(&self, body: &mut Body) {
        let past_bound = match body.facing {
            Facing::Forward => body.x > self.max_x,
            Facing::Backward => body.x < self.min_x,
        };
        if past_bound {
            body.facing = body.facing.flipped();
            log::trace!("Enemy turned at x={:.1}", body.x);
        }
        body.vx = self.speed * body.facing.sign();
    }
}
