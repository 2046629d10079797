//! Player visual states and the frame sequences behind them.

use std::path::Path;

use hop_core::animation::{Animation, AnimationFile, AnimationFrame};
use hop_core::ResourceError;

use crate::assets::ImageRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAnim {
    Idle,
    Left,
    Right,
    Up,
    Dead,
}

impl PlayerAnim {
    pub const ALL: [PlayerAnim; 5] = [Self::Idle, Self::Left, Self::Right, Self::Up, Self::Dead];

    /// Clip name in the animation definition file.
    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Dead => "dead",
        }
    }
}

pub const ENEMY_CLIP: &str = "enemy";

/// A resolved, non-empty frame sequence.
#[derive(Debug, Clone)]
pub struct Clip {
    first: AnimationFrame,
    rest: Vec<AnimationFrame>,
    looping: bool,
}

impl Clip {
    pub fn new(frames: Vec<AnimationFrame>, looping: bool) -> Option<Self> {
        let mut frames = frames.into_iter();
        let first = frames.next()?;
        Some(Self {
            first,
            rest: frames.collect(),
            looping,
        })
    }

    /// A fresh animation at frame 0.
    pub fn build(&self) -> Animation {
        let mut animation = Animation::new(self.first, self.looping);
        for frame in &self.rest {
            animation.add_frame(frame.image, frame.duration_ms);
        }
        animation
    }
}

#[derive(Debug, Clone)]
pub struct AnimationTable {
    pub idle: Clip,
    pub left: Clip,
    pub right: Clip,
    pub up: Clip,
    pub dead: Clip,
    pub enemy: Clip,
}

impl AnimationTable {
    /// Resolve every clip the game needs, decoding the frame images into
    /// `registry`. A missing clip is an error.
    pub fn load(
        file: &AnimationFile,
        file_path: &Path,
        root: &Path,
        registry: &mut ImageRegistry,
    ) -> Result<Self, ResourceError> {
        let mut resolve = |name: &str| -> Result<Clip, ResourceError> {
            let definition = file
                .clip(name)
                .ok_or_else(|| ResourceError::missing("animation clip", name, file_path))?;
            let mut frames = Vec::with_capacity(definition.frames.len());
            for frame in &definition.frames {
                frames.push(AnimationFrame {
                    image: registry.load(root, &frame.image)?,
                    duration_ms: frame.duration_ms,
                });
            }
            Clip::new(frames, definition.looping).ok_or_else(|| {
                ResourceError::invalid(file_path, format!("clip '{name}' has no frames"))
            })
        };

        Ok(Self {
            idle: resolve(PlayerAnim::Idle.clip_name())?,
            left: resolve(PlayerAnim::Left.clip_name())?,
            right: resolve(PlayerAnim::Right.clip_name())?,
            up: resolve(PlayerAnim::Up.clip_name())?,
            dead: resolve(PlayerAnim::Dead.clip_name())?,
            enemy: resolve(ENEMY_CLIP)?,
        })
    }

    pub fn player_clip(&self, anim: PlayerAnim) -> &Clip {
        match anim {
            PlayerAnim::Idle => &self.idle,
            PlayerAnim::Left => &self.left,
            PlayerAnim::Right => &self.right,
            PlayerAnim::Up => &self.up,
            PlayerAnim::Dead => &self.dead,
        }
    }

    pub fn player(&self, anim: PlayerAnim) -> Animation {
        self.player_clip(anim).build()
    }

    pub fn enemy(&self) -> Animation {
        self.enemy.build()
    }
}
