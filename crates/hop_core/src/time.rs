use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

/// Wall-clock bookkeeping for the loop shell.
///
/// Elapsed time is measured in whole milliseconds. The clock advances by the
/// whole milliseconds it reported, so sub-millisecond remainders carry into
/// the next frame instead of being dropped.
pub struct GameClock {
    start: Instant,
    current: Instant,
    /// Upper bound on the elapsed time handed to the simulation.
    pub max_elapsed_ms: Option<u64>,
    pub elapsed_ms: u64,
    pub total_elapsed_ms: u64,
    pub frame_count: u64,

    frame_samples: [u64; FPS_SAMPLE_COUNT],
    frame_sample_index: usize,
    pub smoothed_frame_time_ms: f64,
    pub smoothed_fps: f64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            current: start,
            max_elapsed_ms: None,
            elapsed_ms: 0,
            total_elapsed_ms: 0,
            frame_count: 0,
            frame_samples: [0; FPS_SAMPLE_COUNT],
            frame_sample_index: 0,
            smoothed_frame_time_ms: 0.0,
            smoothed_fps: 0.0,
        }
    }

    pub fn with_max_elapsed(mut self, max_elapsed_ms: Option<u64>) -> Self {
        self.max_elapsed_ms = max_elapsed_ms;
        self
    }

    /// Restart measurement from `now`, as the loop does right before its
    /// first iteration.
    pub fn restart_at(&mut self, now: Instant) {
        *self = Self::starting_at(now).with_max_elapsed(self.max_elapsed_ms);
    }

    pub fn begin_frame(&mut self) -> u64 {
        self.begin_frame_at(Instant::now())
    }

    /// Measure the delta since the previous frame and return the elapsed
    /// milliseconds the simulation should consume.
    pub fn begin_frame_at(&mut self, now: Instant) -> u64 {
        let raw_ms = now.saturating_duration_since(self.current).as_millis() as u64;
        self.current += Duration::from_millis(raw_ms);

        let mut elapsed = raw_ms;
        if let Some(cap) = self.max_elapsed_ms {
            if elapsed > cap {
                log::warn!("Frame took {}ms, capping elapsed time to {}ms", raw_ms, cap);
                elapsed = cap;
            }
        }

        self.elapsed_ms = elapsed;
        self.total_elapsed_ms += elapsed;

        self.frame_samples[self.frame_sample_index] = raw_ms;
        self.frame_sample_index = (self.frame_sample_index + 1) % FPS_SAMPLE_COUNT;
        let sampled = (self.frame_count as usize + 1).min(FPS_SAMPLE_COUNT);
        let sum: u64 = self.frame_samples.iter().sum();
        self.smoothed_frame_time_ms = sum as f64 / sampled as f64;
        self.smoothed_fps = if self.smoothed_frame_time_ms > 0.0 {
            1000.0 / self.smoothed_frame_time_ms
        } else {
            0.0
        };

        elapsed
    }

    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    /// Wall-clock milliseconds between the start and the latest frame.
    pub fn wall_elapsed_ms(&self) -> u64 {
        self.current.duration_since(self.start).as_millis() as u64
    }

    /// Frames per second since the clock started; 0 until time has passed.
    pub fn fps(&self) -> f32 {
        let wall_ms = self.wall_elapsed_ms();
        if wall_ms == 0 {
            return 0.0;
        }
        self.frame_count as f32 / (wall_ms as f32 / 1000.0)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}
