//! Game loop shell: measure elapsed time, update, draw, present, nap.
//!
//! This is cooperative pacing, not a fixed timestep. Each iteration hands the
//! simulation whatever wall-clock delta actually passed (optionally capped),
//! then sleeps for a short fixed nap to bound CPU use.
//!
//! Hosts that own their own event loop (winit) call [`LoopShell::start`] once
//! and [`LoopShell::run_frame`] per redraw, pacing with the event loop
//! instead of `thread::sleep`. Blocking hosts call [`LoopShell::run`].

use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::time::GameClock;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub nap_ms: u64,
    pub max_elapsed_ms: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            nap_ms: 20,
            max_elapsed_ms: Some(250),
        }
    }
}

impl LoopConfig {
    pub fn nap(&self) -> Duration {
        Duration::from_millis(self.nap_ms)
    }
}

/// Handed to `update` so game code can end the loop.
#[derive(Debug, Default)]
pub struct LoopControl {
    stop_requested: bool,
}

impl LoopControl {
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// Callbacks the shell drives each iteration.
pub trait FrameHooks {
    type Surface;

    /// One-time setup before the first frame.
    fn setup(&mut self) {}

    fn update(&mut self, elapsed_ms: u64, control: &mut LoopControl);

    /// `None` skips drawing for this frame (e.g. a lost surface).
    fn acquire_surface(&mut self) -> Option<Self::Surface>;

    fn draw(&mut self, surface: &mut Self::Surface, clock: &GameClock);

    fn present(&mut self, surface: Self::Surface);
}

pub struct LoopShell {
    config: LoopConfig,
    clock: GameClock,
    running: bool,
}

impl LoopShell {
    pub fn new(config: LoopConfig) -> Self {
        let clock = GameClock::new().with_max_elapsed(config.max_elapsed_ms);
        Self {
            config,
            clock,
            running: true,
        }
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn nap(&self) -> Duration {
        self.config.nap()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Signal the loop to finish after the current iteration.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Game loop stop requested");
        }
        self.running = false;
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    pub fn start<H: FrameHooks>(&mut self, hooks: &mut H) {
        self.start_at(hooks, Instant::now());
    }

    pub fn start_at<H: FrameHooks>(&mut self, hooks: &mut H, now: Instant) {
        hooks.setup();
        self.clock.restart_at(now);
        self.running = true;
        log::info!(
            "Game loop started (nap {} ms, elapsed cap {:?} ms)",
            self.config.nap_ms,
            self.config.max_elapsed_ms
        );
    }

    /// One iteration without the nap. Returns whether the loop should go on.
    pub fn run_frame<H: FrameHooks>(&mut self, hooks: &mut H) -> bool {
        self.run_frame_at(hooks, Instant::now())
    }

    pub fn run_frame_at<H: FrameHooks>(&mut self, hooks: &mut H, now: Instant) -> bool {
        if !self.running {
            return false;
        }

        let elapsed_ms = self.clock.begin_frame_at(now);
        let mut control = LoopControl::default();
        hooks.update(elapsed_ms, &mut control);
        if control.stop_requested() {
            self.stop();
        }

        match hooks.acquire_surface() {
            Some(mut surface) => {
                hooks.draw(&mut surface, &self.clock);
                hooks.present(surface);
            }
            None => log::trace!("No drawing surface this frame"),
        }
        self.clock.end_frame();

        self.running
    }

    /// Blocking loop: setup, then iterate with a nap until stopped.
    pub fn run<H: FrameHooks>(&mut self, hooks: &mut H) {
        self.start(hooks);
        while self.run_frame(hooks) {
            thread::sleep(self.config.nap());
        }
        log::info!(
            "Game loop finished after {} frames ({:.1} fps)",
            self.clock.frame_count,
            self.fps()
        );
    }
}
