use hop_core::animation::{Animation, FrameImage};

use crate::collision::Aabb;

/// Facing for the player, travel direction for a patrolling enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Toward +x.
    #[default]
    Forward,
    Backward,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// A moving sprite: position and velocity in pixels and px/ms, y down.
///
/// Size is never stored; it is read from the current animation frame, so
/// switching animation can change the collision bounds.
#[derive(Debug, Clone)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub visible: bool,
    pub facing: Facing,
    animation: Animation,
}

impl Body {
    pub fn new(animation: Animation, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            visible: true,
            facing: Facing::default(),
            animation,
        }
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn set_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    pub fn image(&self) -> FrameImage {
        self.animation.current_image()
    }

    pub fn width(&self) -> f32 {
        self.image().width as f32
    }

    pub fn height(&self) -> f32 {
        self.image().height as f32
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width(), self.height())
    }

    /// Integrate velocity over `elapsed_ms` and advance the animation clock.
    pub fn update(&mut self, elapsed_ms: u64) {
        let dt = elapsed_ms as f32;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.animation.update(elapsed_ms);
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }

    pub fn shift_y(&mut self, dy: f32) {
        self.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hop_core::animation::{AnimationFrame, ImageHandle};

    fn frame(handle: u32, width: u32, height: u32, duration_ms: u64) -> AnimationFrame {
        AnimationFrame {
            image: FrameImage {
                handle: ImageHandle(handle),
                width,
                height,
            },
            duration_ms,
        }
    }

    #[test]
    fn update_integrates_velocity_and_animation() {
        let mut anim = Animation::new(frame(0, 20, 28, 100), true);
        anim.add_frame(frame(1, 20, 28, 100).image, 100);
        let mut body = Body::new(anim, 10.0, 50.0);
        body.vx = 0.04;
        body.vy = -0.2;

        body.update(100);

        assert!((body.x - 14.0).abs() < 1e-4);
        assert!((body.y - 30.0).abs() < 1e-4);
        assert_eq!(body.animation().frame_index(), 1);
    }

    #[test]
    fn size_follows_current_animation_frame() {
        let mut body = Body::new(Animation::new(frame(0, 20, 28, 50), true), 0.0, 0.0);
        assert_eq!((body.width(), body.height()), (20.0, 28.0));

        body.set_animation(Animation::new(frame(5, 32, 16, 50), false));
        assert_eq!(body.bounds(), Aabb::new(0.0, 0.0, 32.0, 16.0));
    }

    #[test]
    fn zero_elapsed_changes_nothing() {
        let mut body = Body::new(Animation::new(frame(0, 8, 8, 10), true), 3.0, 4.0);
        body.vx = 1.0;
        body.vy = 1.0;
        body.update(0);
        assert_eq!((body.x, body.y), (3.0, 4.0));
        assert_eq!(body.animation().elapsed_in_frame_ms(), 0);
    }

    #[test]
    fn facing_flips_and_signs() {
        assert_eq!(Facing::Forward.flipped(), Facing::Backward);
        assert_eq!(Facing::Backward.sign(), -1.0);
    }
}
