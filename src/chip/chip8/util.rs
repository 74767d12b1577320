use crate::chip::chip8::Chip8;

/// Moves to the next instruction, or past it if `condition` holds.
pub fn skip_if(state: &mut Chip8, condition: bool) {
    if condition {
        increment_program_counter(state);
    }
    increment_program_counter(state);
}

pub fn increment_program_counter(state: &mut Chip8) {
    state.program_counter = state.program_counter.wrapping_add(2);
}

/// Writes the flag register.
pub fn set_flag(state: &mut Chip8, flag: bool) {
    state.registers[0xF] = flag as u8;
}
