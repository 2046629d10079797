//! Keyboard state with edge-triggered and level-triggered queries.
//!
//! The host pushes raw [`KeyEvent`]s into an [`EventQueue`] as they arrive.
//! Once per tick the queue is drained into [`InputState`], the tick reads it,
//! and `end_frame()` clears the edges. A press that lands between ticks is
//! simply seen on the next one.
//!
//! - **Level-triggered (held):** `is_held(key)` is true while the key is down.
//! - **Edge-triggered (just_pressed / just_released):** true only for the tick
//!   the transition was drained in. OS auto-repeat re-arms `just_pressed`, so
//!   holding a movement key keeps producing presses.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Escape,
    F3,
    F5,
    Digit(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Pressed,
    Repeated,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Pressed,
        }
    }

    pub fn repeated(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Repeated,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Released,
        }
    }
}

/// Events received from the host since the last tick, in arrival order.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<KeyEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: KeyEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending event to `input`, oldest first.
    pub fn drain_into(&mut self, input: &mut InputState) {
        while let Some(event) = self.pending.pop_front() {
            input.apply(event);
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: KeyEvent) {
        match event.action {
            KeyAction::Pressed => self.key_down(event.key),
            KeyAction::Repeated => self.key_repeat(event.key),
            KeyAction::Released => self.key_up(event.key),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    /// Auto-repeat from the OS. Only counts while the key is still held.
    pub fn key_repeat(&mut self, key: Key) {
        if self.held.contains(&key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Lowest digit key pressed this tick, if any.
    pub fn just_pressed_digit(&self) -> Option<u8> {
        self.just_pressed
            .iter()
            .filter_map(|key| match key {
                Key::Digit(d) => Some(*d),
                _ => None,
            })
            .min()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
