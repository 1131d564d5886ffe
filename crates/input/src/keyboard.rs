//! Keyboard-state set for terminal environments.
//!
//! Tracks which keys are currently held plus per-frame press/release edges.
//! Supports terminals that do not emit key release events by using a timeout:
//! every press or auto-repeat refreshes the key, and keys that go quiet for
//! longer than the timeout are released. A key refreshed since the previous
//! [`KeyboardState::update`] is not aged by it, so a slow frame cannot drop a
//! key that was pressed during that frame.

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::types::DEFAULT_KEY_RELEASE_TIMEOUT_MS;

/// Upper bound on simultaneously tracked keys.
pub const MAX_HELD_KEYS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    code: KeyCode,
    idle_ms: u32,
    // Pressed or repeated since the last `update`.
    refreshed: bool,
}

/// Held keys plus the edges seen since the last [`KeyboardState::end_frame`].
#[derive(Debug, Clone)]
pub struct KeyboardState {
    held: ArrayVec<HeldKey, MAX_HELD_KEYS>,
    pressed: ArrayVec<KeyCode, MAX_HELD_KEYS>,
    released: ArrayVec<KeyCode, MAX_HELD_KEYS>,
    key_release_timeout_ms: Option<u32>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self {
            held: ArrayVec::new(),
            pressed: ArrayVec::new(),
            released: ArrayVec::new(),
            key_release_timeout_ms: Some(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    /// Set the auto-release timeout; `None` disables it (the terminal reports
    /// real release events).
    pub fn with_key_release_timeout_ms(mut self, timeout_ms: Option<u32>) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn set_key_release_timeout_ms(&mut self, timeout_ms: Option<u32>) {
        self.key_release_timeout_ms = timeout_ms;
    }

    pub fn key_release_timeout_ms(&self) -> Option<u32> {
        self.key_release_timeout_ms
    }

    /// Record a press or auto-repeat. Returns `true` when the key was not
    /// already held (a new press edge).
    pub fn press(&mut self, code: KeyCode) -> bool {
        let code = normalize(code);
        if let Some(key) = self.held.iter_mut().find(|k| k.code == code) {
            key.idle_ms = 0;
            key.refreshed = true;
            return false;
        }
        let key = HeldKey {
            code,
            idle_ms: 0,
            refreshed: true,
        };
        if self.held.try_push(key).is_err() {
            return false;
        }
        if !self.pressed.contains(&code) {
            let _ = self.pressed.try_push(code);
        }
        true
    }

    pub fn release(&mut self, code: KeyCode) {
        let code = normalize(code);
        if let Some(i) = self.held.iter().position(|k| k.code == code) {
            self.held.remove(i);
            if !self.released.contains(&code) {
                let _ = self.released.try_push(code);
            }
        }
    }

    /// Age held keys by `elapsed_ms` and auto-release stale ones.
    ///
    /// Keys pressed or repeated since the previous call keep an idle time of
    /// zero; `elapsed_ms` covers time before their latest event.
    pub fn update(&mut self, elapsed_ms: u32) {
        let Some(timeout) = self.key_release_timeout_ms else {
            for key in &mut self.held {
                key.refreshed = false;
            }
            return;
        };
        let mut i = 0;
        while i < self.held.len() {
            let key = &mut self.held[i];
            if std::mem::take(&mut key.refreshed) {
                i += 1;
                continue;
            }
            key.idle_ms = key.idle_ms.saturating_add(elapsed_ms);
            if key.idle_ms > timeout {
                let code = key.code;
                self.held.remove(i);
                if !self.released.contains(&code) {
                    let _ = self.released.try_push(code);
                }
            } else {
                i += 1;
            }
        }
    }

    /// Clear the per-frame edges. Held keys are kept.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub fn is_down(&self, code: KeyCode) -> bool {
        let code = normalize(code);
        self.held.iter().any(|k| k.code == code)
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&normalize(code))
    }

    pub fn was_released(&self, code: KeyCode) -> bool {
        self.released.contains(&normalize(code))
    }

    /// Keys pressed this frame, in arrival order.
    pub fn pressed(&self) -> &[KeyCode] {
        &self.pressed
    }

    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().map(|k| k.code)
    }

    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.released.clear();
    }
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
