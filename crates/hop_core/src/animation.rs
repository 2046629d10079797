//! Frame-based sprite animation: definition files and runtime playback.
//!
//! A definition file names clips, each a list of image paths with per-frame
//! durations in milliseconds. The game resolves those paths into loaded
//! images and builds an [`Animation`] per body. Animations are cheap to
//! rebuild; the player gets a fresh one every time its visual state changes.
//!
//! Timing is integer milliseconds, matching the elapsed time fed in by the
//! loop shell, so two runs with the same elapsed sequence land on the same
//! frame.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{read_text, ResourceError};

/// Opaque handle to an image owned by the host's image registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// A loaded image as seen by the simulation: a handle plus pixel size.
/// Body collision bounds come from this size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameImage {
    pub handle: ImageHandle,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub image: FrameImage,
    pub duration_ms: u64,
}

/// Runtime animation: an ordered, never-empty frame list with a cursor.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<AnimationFrame>,
    looping: bool,
    frame_index: usize,
    elapsed_ms: u64,
    playing: bool,
    finished: bool,
}

impl Animation {
    pub fn new(first: AnimationFrame, looping: bool) -> Self {
        Self {
            frames: vec![first],
            looping,
            frame_index: 0,
            elapsed_ms: 0,
            playing: true,
            finished: false,
        }
    }

    pub fn add_frame(&mut self, image: FrameImage, duration_ms: u64) {
        self.frames.push(AnimationFrame { image, duration_ms });
    }

    /// Swap in a new frame list and rewind. An empty list is refused and the
    /// current frames are kept.
    pub fn replace_frames(&mut self, frames: Vec<AnimationFrame>) -> bool {
        if frames.is_empty() {
            log::warn!("Refusing to replace animation frames with an empty list");
            return false;
        }
        self.frames = frames;
        self.frame_index = 0;
        self.elapsed_ms = 0;
        self.finished = false;
        true
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn elapsed_in_frame_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }

    pub fn current_frame(&self) -> &AnimationFrame {
        &self.frames[self.frame_index]
    }

    pub fn current_image(&self) -> FrameImage {
        self.current_frame().image
    }

    /// Advance by `dt_ms`, stepping over as many frames as the time covers.
    pub fn update(&mut self, dt_ms: u64) {
        if !self.playing || self.finished || self.total_duration_ms() == 0 {
            return;
        }

        self.elapsed_ms += dt_ms;

        loop {
            let duration = self.frames[self.frame_index].duration_ms;
            if self.elapsed_ms < duration {
                break;
            }

            self.elapsed_ms -= duration;
            self.frame_index += 1;

            if self.frame_index >= self.frames.len() {
                if self.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = self.frames.len() - 1;
                    self.elapsed_ms = 0;
                    self.finished = true;
                    break;
                }
            }
        }
    }
}

/// One frame of a clip as written in the definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameDefinition {
    pub image: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipDefinition {
    pub frames: Vec<FrameDefinition>,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

impl ClipDefinition {
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}

/// Top-level animation definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    #[serde(rename = "animations")]
    pub clips: HashMap<String, ClipDefinition>,
}

impl AnimationFile {
    pub fn clip(&self, name: &str) -> Option<&ClipDefinition> {
        self.clips.get(name)
    }

    /// Every distinct image path referenced by any clip.
    pub fn image_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .clips
            .values()
            .flat_map(|clip| clip.frames.iter().map(|f| f.image.as_str()))
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

pub fn load_animation_file(path: &Path) -> Result<AnimationFile, ResourceError> {
    let raw = read_text(path)?;
    let file: AnimationFile =
        serde_json::from_str(&raw).map_err(|e| ResourceError::parse(path, e))?;
    validate_animation_file(path, &file)?;
    Ok(file)
}

fn validate_animation_file(path: &Path, file: &AnimationFile) -> Result<(), ResourceError> {
    if file.version != "0.1" {
        return Err(ResourceError::invalid(
            path,
            format!("unsupported version '{}'", file.version),
        ));
    }
    if file.animation_id.is_empty() {
        return Err(ResourceError::invalid(path, "animation_id is empty"));
    }
    for (name, clip) in &file.clips {
        if clip.frames.is_empty() {
            return Err(ResourceError::invalid(
                path,
                format!("clip '{}' has no frames", name),
            ));
        }
        for (i, frame) in clip.frames.iter().enumerate() {
            if frame.image.is_empty() {
                return Err(ResourceError::invalid(
                    path,
                    format!("clip '{}' frame {} has empty image path", name, i),
                ));
            }
            if frame.duration_ms == 0 {
                return Err(ResourceError::invalid(
                    path,
                    format!("clip '{}' frame {} has zero duration", name, i),
                ));
            }
        }
    }
    Ok(())
}

const fn default_looping() -> bool {
    true
}
