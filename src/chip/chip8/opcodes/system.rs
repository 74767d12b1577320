use core::convert::TryFrom;

use crate::chip::{
    chip8::{
        opcodes::{ExecutableOpcode, InstructionParsingError, InstructionWithAddress, Opcode},
        util, Chip8,
    },
    CycleError,
};

define_instruction!(Sys, SysInstruction, InstructionWithAddress, 0x0);
impl ExecutableOpcode for SysInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        if self.address == 0x000 {
            util::increment_program_counter(state);
            return Ok(());
        }
        // the upper nibble of the payload is ignored
        match self.address & 0x0FF {
            0xE0 => {
                state.display.clear();
                util::increment_program_counter(state);
            }
            0xEE => {
                if state.stack_pointer == 0 {
                    return Err(CycleError::StackUnderflow(state.program_counter));
                }
                state.stack_pointer -= 1;
                state.program_counter = state.stack[state.stack_pointer as usize];
                util::increment_program_counter(state);
            }
            _ => return Err(CycleError::UnknownOpcode(self.opcode)),
        };
        Ok(())
    }
}
