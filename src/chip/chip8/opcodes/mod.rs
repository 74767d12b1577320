#[macro_use]
mod macros;
mod arithmetic_and_logic;
mod program_flow;
mod system;

use core::convert::TryFrom;
use std::marker::PhantomData;

use thiserror::Error;

use crate::chip::{
    chip8::{
        opcodes::{
            arithmetic_and_logic::{
                AddInstruction, DrwInstruction, LdInstruction, LdrInstruction, LduInstruction,
                RegInstruction, RndInstruction,
            },
            program_flow::{
                CallInstruction, JmpInstruction, JmprInstruction, SeInstruction, SkInstruction,
                SneInstruction, SreInstruction, SrneInstruction,
            },
            system::SysInstruction,
        },
        Chip8,
    },
    CycleError,
};

/// Represents a Chip 8 opcode. A Chip 8 opcode is two bytes long.
#[derive(Debug)]
pub(super) struct Opcode {
    /// The instruction class is the most significant nibble of the opcode.
    /// Note that we use a u8 to represent the instruction class here for
    /// convenience, but ensure that a valid opcode can only be constructed
    /// if the four most significant bits of the u8 are 0.
    instruction_class: u8,
    /// The payload constitutes the remaining nibbles of the opcode.
    payload: OpcodePayload,
}

/// Represents the payload of a Chip 8 opcode. That is the opcode without
/// the most significant nibble.
#[derive(Debug)]
pub(super) struct OpcodePayload {
    /// The nibbles representing the payload. Note that we use the u8 type
    /// here for convenience, but ensure that valid payloads can only be
    /// constructed if the four most significant bits of the u8 are 0.
    bytes: [u8; 3],
}

impl OpcodePayload {
    /// Interprets the opcode payload as an address in the range 0x000 to
    /// 0xFFF (inclusive) and returns an u16 containing this address.
    fn address(&self) -> u16 {
        (self.bytes[0] as u16) << 8 | (self.bytes[1] as u16) << 4 | self.bytes[2] as u16
    }

    /// Interprets the most significant nibble of the opcode as a register
    /// address in range 0x0 - 0xF (inclusive) and the remaining nibbles
    /// as a value in range 0x00 - 0xFF (inclusive) and returns a tuple
    /// representing these values.
    fn reg_and_value(&self) -> (u8, u8) {
        (self.bytes[0], (self.bytes[1] << 4) | self.bytes[2])
    }

    /// Interprets the opcode payload as three operands, each of size
    /// one nibble, i.e., in range 0x0 - 0xF (inclusive) and returns
    /// a triple representing these values.
    fn operands(&self) -> (u8, u8, u8) {
        (self.bytes[0], self.bytes[1], self.bytes[2])
    }
}

impl Opcode {
    /// Constructs a new `Opcode` given its big-endian byte representation.
    pub(super) fn new(opcode: &[u8; 2]) -> Opcode {
        Opcode {
            instruction_class: opcode[0] >> 4,
            payload: OpcodePayload {
                bytes: [opcode[0] & 0xF, opcode[1] >> 4, opcode[1] & 0xF],
            },
        }
    }

    /// The opcode as a single 16 bit word.
    pub(super) fn value(&self) -> u16 {
        (self.instruction_class as u16) << 12 | self.payload.address()
    }

    pub(super) fn execute(self, state: &mut Chip8) -> Result<(), CycleError> {
        let value = self.value();
        let executable_opcode =
            self.decode().map_err(|_| CycleError::UnknownOpcode(value))?;
        executable_opcode.execute(state)
    }

    /// Fails unless `self` belongs to `instruction_class`.
    fn expect_class(&self, instruction_class: u8) -> Result<(), InstructionParsingError> {
        if self.instruction_class != instruction_class {
            return Err(InstructionParsingError::InvalidInstructionClass(
                self.instruction_class,
                instruction_class,
            ));
        }
        Ok(())
    }

    /// Converts `self` into the instruction object of its instruction class.
    fn decode(self) -> Result<Box<dyn ExecutableOpcode>, InstructionParsingError> {
        fn into_helper<T>(opcode: Opcode) -> Result<Box<dyn ExecutableOpcode>, InstructionParsingError>
        where
            T: ExecutableOpcode + TryFrom<Opcode, Error = InstructionParsingError> + 'static,
        {
            Ok(Box::new(T::try_from(opcode)?))
        }

        match self.instruction_class {
            0x0 => into_helper::<SysInstruction>(self),
            0x1 => into_helper::<JmpInstruction>(self),
            0x2 => into_helper::<CallInstruction>(self),
            0x3 => into_helper::<SeInstruction>(self),
            0x4 => into_helper::<SneInstruction>(self),
            0x5 => into_helper::<SreInstruction>(self),
            0x6 => into_helper::<LdrInstruction>(self),
            0x7 => into_helper::<AddInstruction>(self),
            0x8 => into_helper::<RegInstruction>(self),
            0x9 => into_helper::<SrneInstruction>(self),
            0xA => into_helper::<LdInstruction>(self),
            0xB => into_helper::<JmprInstruction>(self),
            0xC => into_helper::<RndInstruction>(self),
            0xD => into_helper::<DrwInstruction>(self),
            0xE => into_helper::<SkInstruction>(self),
            0xF => into_helper::<LduInstruction>(self),
            class => Err(InstructionParsingError::UnknownInstructionClass(class)),
        }
    }
}

/// Captures errors when converting opcodes to their respective instruction object.
#[derive(Debug, Error)]
pub(super) enum InstructionParsingError {
    #[error("Instruction class {0} does not comply with target instruction class {1}")]
    InvalidInstructionClass(u8, u8),

    #[error("Unknown instruction class {0}")]
    UnknownInstructionClass(u8),
}

/// Represents an opcode that can be executed.
pub(super) trait ExecutableOpcode {
    /// Executes `self` relative to the given state. Note that this
    /// method will in-place modify the given state. Instructions whose
    /// payload matches no known operation fail before touching the state.
    fn execute(&self, state: &mut Chip8) -> Result<(), CycleError>;
}

/// Represents an opcode that expects the payload to be an address.
pub(super) struct InstructionWithAddress<T> {
    instruction: PhantomData<T>,
    opcode: u16,
    address: u16,
}

/// Represents an opcode that expects the payload to be three operands.
pub(super) struct InstructionWithOperands<T> {
    instruction: PhantomData<T>,
    opcode: u16,
    op1: u8,
    op2: u8,
    op3: u8,
}

/// Represents an opcode that expects the payload to be a register pointer and a value.
pub(super) struct InstructionWithRegAndValue<T> {
    instruction: PhantomData<T>,
    opcode: u16,
    reg: u8,
    value: u8,
}

impl<T> InstructionWithAddress<T> {
    fn from_opcode(opcode: &Opcode) -> Self {
        InstructionWithAddress {
            instruction: PhantomData,
            opcode: opcode.value(),
            address: opcode.payload.address(),
        }
    }
}

impl<T> InstructionWithOperands<T> {
    fn from_opcode(opcode: &Opcode) -> Self {
        let (op1, op2, op3) = opcode.payload.operands();
        InstructionWithOperands {
            instruction: PhantomData,
            opcode: opcode.value(),
            op1,
            op2,
            op3,
        }
    }
}

impl<T> InstructionWithRegAndValue<T> {
    fn from_opcode(opcode: &Opcode) -> Self {
        let (reg, value) = opcode.payload.reg_and_value();
        InstructionWithRegAndValue {
            instruction: PhantomData,
            opcode: opcode.value(),
            reg,
            value,
        }
    }
}

/// Describes what `opcode` does, in the words of the debugger panel.
pub fn describe(opcode: u16) -> &'static str {
    let x_nn = opcode & 0x00FF;
    let n = opcode & 0x000F;
    match opcode & 0xF000 {
        0x0000 if opcode == 0x0000 => "No operation",
        0x0000 => match x_nn {
            0xE0 => "Clear the screen",
            0xEE => "Return from subroutine",
            _ => "Unknown opcode",
        },
        0x1000 => "Jump to NNN",
        0x2000 => "Call subroutine at NNN",
        0x3000 => "Skip next if VX == NN",
        0x4000 => "Skip next if VX != NN",
        0x5000 if n == 0 => "Skip next if VX == VY",
        0x6000 => "Set VX to NN",
        0x7000 => "Add NN to VX",
        0x8000 => match n {
            0x0 => "Set VX to VY",
            0x1 => "Set VX to VX OR VY",
            0x2 => "Set VX to VX AND VY",
            0x3 => "Set VX to VX XOR VY",
            0x4 => "Add VY to VX, VF = carry",
            0x5 => "Subtract VY from VX, VF = no borrow",
            0x6 => "Shift VX right, VF = old low bit",
            0x7 => "Set VX to VY - VX, VF = no borrow",
            0xE => "Shift VX left, VF = old high bit",
            _ => "Unknown opcode",
        },
        0x9000 if n == 0 => "Skip next if VX != VY",
        0xA000 => "Set I to NNN",
        0xB000 => "Jump to NNN + V0",
        0xC000 => "Set VX to random AND NN",
        0xD000 => "Draw 8xN sprite at (VX, VY)",
        0xE000 => match x_nn {
            0x9E => "Skip next if key VX is pressed",
            0xA1 => "Skip next if key VX is not pressed",
            _ => "Unknown opcode",
        },
        0xF000 => match x_nn {
            0x07 => "Set VX to the delay timer",
            0x0A => "Wait for a key press, store it in VX",
            0x15 => "Set the delay timer to VX",
            0x18 => "Set the sound timer to VX",
            0x1E => "Add VX to I, VF = overflow",
            0x29 => "Point I at the font sprite for VX",
            0x33 => "Store VX as decimal digits at I",
            0x55 => "Copy {V0,VX} to {memory[I],memory[I + X]}",
            0x65 => "Copy {memory[I],memory[I + X]} to {V0,VX}",
            _ => "Unknown opcode",
        },
        _ => "Unknown opcode",
    }
}
