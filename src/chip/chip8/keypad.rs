use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

use crate::chip::chip8::constants::{
    CHIP8_KEY_COUNT, CHIP8_KEY_MAP, CHIP8_KEY_POLL_INTERVAL, CHIP8_KEY_RELEASE_DELAY,
};

#[derive(Default)]
struct KeyState {
    pressed: [bool; CHIP8_KEY_COUNT],

    /// When each pressed key is released again. `None` for keys without a
    /// pending release.
    release_at: [Option<Instant>; CHIP8_KEY_COUNT],
}

/// The 16 keys of the hex keypad. Written by the keyboard polling task and
/// read by the interpreter.
#[derive(Default)]
pub struct Keypad {
    state: RwLock<KeyState>,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// Maps a terminal symbol to the key it presses.
    pub fn key_for_symbol(symbol: char) -> Option<u8> {
        CHIP8_KEY_MAP
            .iter()
            .position(|&c| c == symbol)
            .map(|key| key as u8)
    }

    /// Whether `key` is currently held down. Keys outside of 0x0 - 0xF are
    /// never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .pressed
            .get(key as usize)
            .copied()
            .unwrap_or(false)
    }

    /// The lowest key currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.pressed.iter().position(|&p| p).map(|key| key as u8)
    }

    /// Presses `key` and schedules its release relative to `now`. Keys
    /// beyond 0xF do not exist and are ignored.
    pub fn press(&self, key: u8, now: Instant) {
        if key as usize >= CHIP8_KEY_COUNT {
            warn!("Ignoring press of key 0x{:X}", key);
            return;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.pressed[key as usize] = true;
        state.release_at[key as usize] = Some(now + CHIP8_KEY_RELEASE_DELAY);
    }

    /// Releases every key whose release time has passed at `now`.
    pub fn release_expired(&self, now: Instant) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for key in 0..CHIP8_KEY_COUNT {
            match state.release_at[key] {
                Some(deadline) if now >= deadline => {
                    state.pressed[key] = false;
                    state.release_at[key] = None;
                }
                _ => {}
            }
        }
    }
}

/// The keyboard polling task. Drains all pending symbols from `symbols`
/// without blocking, presses the mapped keys, releases the keys whose
/// release time has passed and then naps for a millisecond. Stops once
/// `running` is cleared.
pub fn run_keypad(keypad: Arc<Keypad>, symbols: Receiver<char>, running: Arc<AtomicBool>) {
    debug!("Keyboard task started");
    let mut connected = true;

    while running.load(Ordering::SeqCst) {
        while connected {
            match symbols.try_recv() {
                Ok(symbol) => match Keypad::key_for_symbol(symbol) {
                    Some(key) => keypad.press(key, Instant::now()),
                    None => warn!("Cannot map {:?} to a key", symbol),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Keyboard input closed");
                    connected = false;
                }
            }
        }

        keypad.release_expired(Instant::now());

        std::thread::sleep(CHIP8_KEY_POLL_INTERVAL);
    }

    debug!("Keyboard task stopped");
}
