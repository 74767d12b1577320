use core::convert::TryFrom;

use crate::chip::{
    chip8::{
        constants::CHIP8_STACK_SIZE,
        opcodes::{
            ExecutableOpcode, InstructionParsingError, InstructionWithAddress,
            InstructionWithOperands, InstructionWithRegAndValue, Opcode,
        },
        util, Chip8,
    },
    CycleError,
};

define_instruction!(Jmp, JmpInstruction, InstructionWithAddress, 0x1);
impl ExecutableOpcode for JmpInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction!(Call, CallInstruction, InstructionWithAddress, 0x2);
impl ExecutableOpcode for CallInstruction {
    /// Pushes the address of the call itself, the return adds the 2 bytes.
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        if state.stack_pointer as usize >= CHIP8_STACK_SIZE {
            return Err(CycleError::StackOverflow(self.address));
        }
        state.stack[state.stack_pointer as usize] = state.program_counter;
        state.stack_pointer += 1;
        state.program_counter = self.address;
        Ok(())
    }
}

define_instruction!(Se, SeInstruction, InstructionWithRegAndValue, 0x3);
impl ExecutableOpcode for SeInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let condition = state.registers[self.reg as usize] == self.value;
        util::skip_if(state, condition);
        Ok(())
    }
}

define_instruction!(Sne, SneInstruction, InstructionWithRegAndValue, 0x4);
impl ExecutableOpcode for SneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let condition = state.registers[self.reg as usize] != self.value;
        util::skip_if(state, condition);
        Ok(())
    }
}

define_instruction!(Sre, SreInstruction, InstructionWithOperands, 0x5);
impl ExecutableOpcode for SreInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        if self.op3 != 0 {
            return Err(CycleError::UnknownOpcode(self.opcode));
        }
        let condition = state.registers[self.op1 as usize] == state.registers[self.op2 as usize];
        util::skip_if(state, condition);
        Ok(())
    }
}

define_instruction!(Srne, SrneInstruction, InstructionWithOperands, 0x9);
impl ExecutableOpcode for SrneInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        if self.op3 != 0 {
            return Err(CycleError::UnknownOpcode(self.opcode));
        }
        let condition = state.registers[self.op1 as usize] != state.registers[self.op2 as usize];
        util::skip_if(state, condition);
        Ok(())
    }
}

define_instruction!(Jmpr, JmprInstruction, InstructionWithAddress, 0xB);
impl ExecutableOpcode for JmprInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        state.program_counter = self.address + state.registers[0] as u16;
        Ok(())
    }
}

define_instruction!(Sk, SkInstruction, InstructionWithRegAndValue, 0xE);
impl ExecutableOpcode for SkInstruction {
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError> {
        let key = state.registers[self.reg as usize];
        let skip = match self.value {
            0x9E => state.keypad.is_pressed(key),
            0xA1 => !state.keypad.is_pressed(key),
            _ => return Err(CycleError::UnknownOpcode(self.opcode)),
        };
        util::skip_if(state, skip);
        Ok(())
    }
}
