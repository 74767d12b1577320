/// CHIP-8 constants.
pub mod constants;
/// Cursive display output.
pub mod cursive_display;
/// The 64x32 monochrome display.
pub mod framebuffer;
/// The hex keypad and the keyboard polling task.
pub mod keypad;
/// Decoding of opcodes and their execution.
pub mod opcodes;
/// The delay and sound timers and the 60Hz timer task.
pub mod timers;
/// Convenience functions for modification of the CHIP-8 state.
mod util;


use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::chip::{
    chip8::{
        constants::{
            CHIP8_CHARSET, CHIP8_CHARSET_LEN, CHIP8_CHARSET_OFFSET, CHIP8_MAX_PROGRAM_SIZE,
            CHIP8_MEMORY_SIZE, CHIP8_PROGRAM_OFFSET, CHIP8_REGISTER_COUNT, CHIP8_STACK_SIZE,
        },
        framebuffer::Framebuffer,
        keypad::Keypad,
        opcodes::Opcode,
        timers::Timers,
    },
    Chip, CycleError, LoadProgramError, Snapshot,
};

/// Represents the state of the CHIP-8.
pub struct Chip8 {
    /// 4096 bytes of main memory
    memory: [u8; CHIP8_MEMORY_SIZE],

    /// 16 registers where each can store one byte. The last one doubles as
    /// the carry, borrow and collision flag.
    registers: [u8; CHIP8_REGISTER_COUNT],

    /// An index register. Note that it is never masked to 12 bits, memory
    /// accesses through it wrap instead.
    index: u16,

    /// A program counter
    program_counter: u16,

    /// The opcode executed by the current cycle.
    opcode: u16,

    /// The display the draw instructions write to.
    display: Framebuffer,

    /// The delay and sound timers, counted down by the timer task.
    timers: Arc<Timers>,

    /// The keys, pressed and released by the keyboard polling task.
    keypad: Arc<Keypad>,

    /// A stack. Note that there are no instructions allowing to modify the
    /// stack and it is only used to store return addresses for the return
    /// opcode.
    stack: [u16; CHIP8_STACK_SIZE],

    /// A pointer, pointing to the current position in the stack.
    stack_pointer: u8,

    /// Source of the random numbers for the RND instruction.
    rng: StdRng,
}

impl Chip for Chip8 {
    fn cycle(&mut self) -> Result<(), CycleError> {
        let opcode = self.next_instruction();
        self.opcode = opcode.value();
        opcode.execute(self)
    }

    fn read_output_pins(&self) -> &[bool] {
        self.display.pixels()
    }

    fn take_redraw(&mut self) -> bool {
        self.display.take_dirty()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            program_counter: self.program_counter,
            index: self.index,
            opcode: self.opcode,
            registers: self.registers,
            stack: self.stack,
            stack_pointer: self.stack_pointer,
            delay_timer: self.timers.delay(),
            sound_timer: self.timers.sound(),
        }
    }

    fn timers(&self) -> Arc<Timers> {
        Arc::clone(&self.timers)
    }

    fn keypad(&self) -> Arc<Keypad> {
        Arc::clone(&self.keypad)
    }
}

impl Chip8 {
    /// Constructs a new CHIP-8 and appropriately initializes all fields so that
    /// it is ready for the first execution cycle. Essentially this means that
    /// the program counter is set to 0x200 and the default CHIP-8 charset is
    /// loaded at memory address `CHIP8_CHARSET_OFFSET`. Note that no program is
    /// loaded upon initialization.
    pub fn new() -> Self {
        let mut memory = [0; CHIP8_MEMORY_SIZE];
        for i in 0..CHIP8_CHARSET_LEN {
            memory[(i + CHIP8_CHARSET_OFFSET) as usize] = CHIP8_CHARSET[i as usize];
        }

        Chip8 {
            memory,
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_OFFSET,
            opcode: 0,
            display: Framebuffer::new(),
            timers: Arc::new(Timers::new()),
            keypad: Arc::new(Keypad::new()),
            stack: [0; CHIP8_STACK_SIZE],
            stack_pointer: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Constructs a CHIP-8 with `program` loaded at 0x200. Anything beyond
    /// the 3584 bytes that fit into memory is ignored.
    pub fn from_program(program: &[u8]) -> Result<Self, LoadProgramError> {
        if program.len() < 2 {
            warn!("Invalid ROM");
            return Err(LoadProgramError::ProgramTooShort(program.len()));
        }

        let mut chip8 = Chip8::new();
        chip8.load_program_bytes(program);
        Ok(chip8)
    }

    /// Reads the program at `path` and constructs a CHIP-8 running it. The
    /// file is read in full before any machine state is created.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadProgramError> {
        let path = path.as_ref();
        info!("Loading {}", path.display());

        let file = File::open(path).map_err(|source| LoadProgramError::CouldNotOpenFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut buffer = Vec::with_capacity(CHIP8_MAX_PROGRAM_SIZE);
        file.take(CHIP8_MAX_PROGRAM_SIZE as u64)
            .read_to_end(&mut buffer)
            .map_err(|source| LoadProgramError::CouldNotReadFile {
                path: path.to_path_buf(),
                source,
            })?;

        Chip8::from_program(&buffer)
    }

    /// Replaces the random number generator by a seeded one, making the RND
    /// instruction reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The display as written by the clear and draw instructions.
    pub fn display(&self) -> &Framebuffer {
        &self.display
    }

    /// Fetches the next instruction based on the current state of
    /// `self.program_counter`. Addresses beyond the end of memory wrap around.
    fn next_instruction(&self) -> Opcode {
        Opcode::new(&[
            self.memory_byte(self.program_counter),
            self.memory_byte(self.program_counter.wrapping_add(1)),
        ])
    }

    /// Copies a program to 0x200, truncating it to the available memory.
    fn load_program_bytes(&mut self, program: &[u8]) {
        let len = program.len().min(CHIP8_MAX_PROGRAM_SIZE);
        let start = CHIP8_PROGRAM_OFFSET as usize;
        self.memory[start..start + len].copy_from_slice(&program[..len]);
    }

    /// Reads a memory byte. Addresses wrap around at the end of memory.
    fn memory_byte(&self, address: u16) -> u8 {
        self.memory[address as usize % CHIP8_MEMORY_SIZE]
    }

    /// Sets a memory byte. Addresses wrap around at the end of memory.
    fn set_memory_byte(&mut self, byte: u8, address: u16) {
        self.memory[address as usize % CHIP8_MEMORY_SIZE] = byte;
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}
