use std::time::Duration;

/// Size of the main memory in bytes.
pub const CHIP8_MEMORY_SIZE: usize = 4096;

/// Programs are loaded 512 bytes into memory.
pub const CHIP8_PROGRAM_OFFSET: u16 = 0x200;

pub const CHIP8_MAX_PROGRAM_SIZE: usize = CHIP8_MEMORY_SIZE - CHIP8_PROGRAM_OFFSET as usize;

pub const CHIP8_CHARSET_OFFSET: u16 = 0x00;

pub const CHIP8_CHARSET_LEN: u16 = 0x50; // 80

/// Every character sprite is 5 bytes high.
pub const CHIP8_CHARSET_SPRITE_LEN: u16 = 5;

pub const CHIP8_CHARSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub const CHIP8_SCREEN_WIDTH: usize = 64;

pub const CHIP8_SCREEN_HEIGHT: usize = 32;

pub const CHIP8_REGISTER_COUNT: usize = 16;

pub const CHIP8_STACK_SIZE: usize = 16;

pub const CHIP8_KEY_COUNT: usize = 16;

/// The delay and sound timers always count down at 60Hz, no matter how fast
/// the CPU runs.
pub const CHIP8_TIMER_FREQUENCY: u32 = 60;

pub const CHIP8_DEFAULT_FPS: u32 = 120;

pub const CHIP8_MIN_FPS: u32 = 60;

/// The terminal only reports key presses, so a key counts as released once
/// it has not been pressed again for this long.
pub const CHIP8_KEY_RELEASE_DELAY: Duration = Duration::from_millis(100);

pub const CHIP8_KEY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Maps terminal symbols to keys. The symbol at position `i` presses key `i`.
pub const CHIP8_KEY_MAP: [char; 16] = [
    '1', '2', '3', '4', //
    'q', 'w', 'e', 'r', //
    'a', 's', 'd', 'f', //
    'z', 'x', 'c', 'v', //
];

pub const CHIP8_LOG_LINES: usize = 18;

pub const CHIP8_LOG_LINE_LEN: usize = CHIP8_SCREEN_WIDTH;

/// Time budget of one tick at the given frequency.
pub fn frame_duration(frequency: u32) -> Duration {
    Duration::from_secs_f64(1.0 / frequency as f64)
}
