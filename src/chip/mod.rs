pub mod chip8;
pub mod event_loop;
pub mod log_feed;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::chip::chip8::{keypad::Keypad, timers::Timers};

/// A machine that can be driven by the event loop. The event loop only talks
/// to the machine through this trait, so any implementation that provides a
/// framebuffer, a snapshot of its state and the shared timer and keypad
/// handles can be scheduled.
pub trait Chip {
    /// Fetches, decodes and executes a single instruction.
    fn cycle(&mut self) -> Result<(), CycleError>;

    /// The output pins, usually wired up to the pixels of a display.
    fn read_output_pins(&self) -> &[bool];

    /// Returns whether the output pins changed since the last call and resets
    /// the flag.
    fn take_redraw(&mut self) -> bool;

    /// Captures the registers, stack and timers for the debugger panel.
    fn snapshot(&self) -> Snapshot;

    /// The timers, shared with the 60Hz timer task.
    fn timers(&self) -> Arc<Timers>;

    /// The keypad, shared with the keyboard polling task.
    fn keypad(&self) -> Arc<Keypad>;
}

/// Errors which can occur while loading a program, before any machine exists.
#[derive(Debug, Error)]
pub enum LoadProgramError {
    #[error("Could not open {}: {source}", .path.display())]
    CouldNotOpenFile { path: PathBuf, source: io::Error },

    #[error("Could not read {}: {source}", .path.display())]
    CouldNotReadFile { path: PathBuf, source: io::Error },

    #[error("Invalid ROM: {0} bytes cannot contain a single instruction")]
    ProgramTooShort(usize),
}

/// Errors which halt the machine. Once a cycle reports one of these the event
/// loop stops driving the machine.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CycleError {
    #[error("Unhandled opcode 0x{0:04X}")]
    UnknownOpcode(u16),

    #[error("Stack overflow calling 0x{0:03X}")]
    StackOverflow(u16),

    #[error("Stack underflow returning at 0x{0:03X}")]
    StackUnderflow(u16),
}

/// A copy of the machine state as shown in the debugger panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub program_counter: u16,
    pub index: u16,
    pub opcode: u16,
    pub registers: [u8; 16],
    pub stack: [u16; 16],
    pub stack_pointer: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
}
