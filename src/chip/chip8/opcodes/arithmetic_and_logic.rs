use core::convert::TryFrom;
use rand::Rng;

use crate::chip::{
    chip8::{
        constants::{CHIP8_CHARSET_OFFSET, CHIP8_CHARSET_SPRITE_LEN},
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress,
            InstructionWithOperands, InstructionWithRegAndValue, Opcode,
        },
        util, Chip8,
    },
    CycleError,
};

define_instruction!(Ldr, LdrInstruction, InstructionWithRegAndValue, 0x6);
impl ExecutableOpcode for LdrInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        state.registers[self.reg as usize] = self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Add, AddInstruction, InstructionWithRegAndValue, 0x7);
impl ExecutableOpcode for AddInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        state.registers[self.reg as usize] =
            state.registers[self.reg as usize].wrapping_add(self.value);
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Reg, RegInstruction, InstructionWithOperands, 0x8);
impl ExecutableOpcode for RegInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        fn modify_registers(state: &mut Chip8, r1: u8, r2: u8, f: fn(u8, u8) -> u8) {
            state.registers[r1 as usize] =
                f(state.registers[r1 as usize], state.registers[r2 as usize]);
        }

        /// Stores the result first and derives the flag from the registers
        /// as they are afterwards.
        fn modify_then_flag(
            state: &mut Chip8,
            r1: u8,
            r2: u8,
            f: fn(u8, u8) -> u8,
            flag: fn(u8, u8) -> bool,
        ) {
            modify_registers(state, r1, r2, f);
            let flag = flag(state.registers[r1 as usize], state.registers[r2 as usize]);
            util::set_flag(state, flag);
        }

        /// Sets the flag from the operands first and reads them again for the
        /// result, so the result wins if `r1` is the flag register.
        fn flag_then_modify(
            state: &mut Chip8,
            r1: u8,
            r2: u8,
            flag: fn(u8, u8) -> bool,
            f: fn(u8, u8) -> u8,
        ) {
            let flag = flag(state.registers[r1 as usize], state.registers[r2 as usize]);
            util::set_flag(state, flag);
            modify_registers(state, r1, r2, f);
        }

        let (x, y) = (self.op1, self.op2);
        match self.op3 {
            0x0 => modify_registers(state, x, y, |_, v2| v2),
            0x1 => modify_registers(state, x, y, |v1, v2| v1 | v2),
            0x2 => modify_registers(state, x, y, |v1, v2| v1 & v2),
            0x3 => modify_registers(state, x, y, |v1, v2| v1 ^ v2),
            // the carry is checked against the sum, not the operands
            0x4 => modify_then_flag(
                state,
                x,
                y,
                |v1, v2| v1.wrapping_add(v2),
                |sum, v2| v2 > 0xFF - sum,
            ),
            0x5 => flag_then_modify(state, x, y, |v1, v2| v2 <= v1, |v1, v2| v1.wrapping_sub(v2)),
            0x6 => flag_then_modify(state, x, y, |v1, _| v1 & 1 != 0, |v1, _| v1 >> 1),
            0x7 => flag_then_modify(state, x, y, |v1, v2| v1 <= v2, |v1, v2| v2.wrapping_sub(v1)),
            0xE => flag_then_modify(state, x, y, |v1, _| v1 >> 7 != 0, |v1, _| v1 << 1),
            _ => return Err(CycleError::UnknownOpcode(self.opcode)),
        };
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Ld, LdInstruction, InstructionWithAddress, 0xA);
impl ExecutableOpcode for LdInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        state.index = self.address;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Rnd, RndInstruction, InstructionWithRegAndValue, 0xC);
impl ExecutableOpcode for RndInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let sample: u8 = state.rng.gen();
        state.registers[self.reg as usize] = sample & self.value;
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Drw, DrwInstruction, InstructionWithOperands, 0xD);
impl ExecutableOpcode for DrwInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let x = state.registers[self.op1 as usize];
        let y = state.registers[self.op2 as usize];

        let sprite: Vec<u8> = (0..self.op3 as u16)
            .map(|row| state.memory_byte(state.index.wrapping_add(row)))
            .collect();

        let collision = state.display.draw_sprite(x, y, &sprite);
        util::set_flag(state, collision);
        util::increment_program_counter(state);
        Ok(())
    }
}

define_instruction!(Ldu, LduInstruction, InstructionWithRegAndValue, 0xF);
impl ExecutableOpcode for LduInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let reg = self.reg as usize;
        match self.value {
            0x07 => {
                state.registers[reg] = state.timers.delay();
            }
            0x0A => match state.keypad.first_pressed() {
                Some(key) => state.registers[reg] = key,
                // if no key is pressed, we directly return without
                // incrementing the program counter
                None => return Ok(()),
            },
            0x15 => {
                state.timers.set_delay(state.registers[reg]);
            }
            0x18 => {
                state.timers.set_sound(state.registers[reg]);
            }
            0x1E => {
                let overflow = state.index as u32 + state.registers[reg] as u32 > 0xFFF;
                util::set_flag(state, overflow);
                state.index = state.index.wrapping_add(state.registers[reg] as u16);
            }
            0x29 => {
                let character = state.registers[reg] as u16;
                state.index = CHIP8_CHARSET_OFFSET + character * CHIP8_CHARSET_SPRITE_LEN;
            }
            0x33 => {
                let value = state.registers[reg];
                let index = state.index;
                state.set_memory_byte(value / 100, index);
                state.set_memory_byte((value / 10) % 10, index.wrapping_add(1));
                state.set_memory_byte(value % 10, index.wrapping_add(2));
            }
            0x55 => {
                for i in 0..=reg {
                    let address = state.index.wrapping_add(i as u16);
                    state.set_memory_byte(state.registers[i], address);
                }
                state.index = state.index.wrapping_add(reg as u16 + 1);
            }
            0x65 => {
                for i in 0..=reg {
                    state.registers[i] = state.memory_byte(state.index.wrapping_add(i as u16));
                }
                state.index = state.index.wrapping_add(reg as u16 + 1);
            }
            _ => return Err(CycleError::UnknownOpcode(self.opcode)),
        }
        util::increment_program_counter(state);
        Ok(())
    }
}
