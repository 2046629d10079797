//! Recorded input sequences for deterministic session runs.

use std::path::Path;

use hop_core::error::read_text;
use hop_core::ResourceError;
use serde::Deserialize;

use crate::session::TickInput;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default = "default_elapsed_ms")]
    pub elapsed_ms: u64,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub reset: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<(TickInput, u64)> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let input = TickInput {
                up: frame.up,
                left: frame.left,
                right: frame.right,
                reset: frame.reset,
                ..TickInput::default()
            };
            for _ in 0..frame.repeat.max(1) {
                out.push((input, frame.elapsed_ms));
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, ResourceError> {
    let raw = read_text(path)?;
    let replay: ReplaySequence =
        serde_json::from_str(&raw).map_err(|e| ResourceError::parse(path, e))?;
    if replay.frames.is_empty() {
        return Err(ResourceError::invalid(path, "frames list is empty"));
    }
    Ok(replay)
}

const fn default_elapsed_ms() -> u64 {
    16
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::two_level_session;
    use crate::session::GameEvent;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "right": true, "repeat": 3 },
                { "up": true, "elapsed_ms": 20 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 4);
        assert!(expanded[0].0.right);
        assert_eq!(expanded[0].1, 16);
        assert!(expanded[3].0.up);
        assert_eq!(expanded[3].1, 20);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(matches!(err, ResourceError::Invalid { .. }));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "repeat": 10 },
                { "right": true, "repeat": 1 },
                { "repeat": 30 },
                { "up": true, "right": true },
                { "repeat": 15, "elapsed_ms": 17 },
                { "up": true },
                { "repeat": 60, "elapsed_ms": 20 },
                { "left": true, "repeat": 3 },
                { "repeat": 120 },
                { "reset": true, "elapsed_ms": 0 },
                { "repeat": 5 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();

        let mut run_a = two_level_session();
        let mut run_b = two_level_session();
        let mut events_a: Vec<GameEvent> = Vec::new();
        let mut events_b: Vec<GameEvent> = Vec::new();
        for (input, elapsed) in &inputs {
            events_a.extend(run_a.tick(input, *elapsed));
        }
        for (input, elapsed) in &inputs {
            events_b.extend(run_b.tick(input, *elapsed));
        }

        assert_eq!(events_a, events_b);
        assert!(events_a.contains(&GameEvent::Respawned));
        assert_eq!(run_a.player().x, run_b.player().x);
        assert_eq!(run_a.player().y, run_b.player().y);
        assert_eq!(run_a.player().vx, run_b.player().vx);
        assert_eq!(run_a.player().vy, run_b.player().vy);
        assert_eq!(run_a.level_id(), run_b.level_id());
        assert_eq!(run_a.score(), run_b.score());
        assert_eq!(run_a.is_game_over(), run_b.is_game_over());

        let _ = fs::remove_file(path);
    }
}
