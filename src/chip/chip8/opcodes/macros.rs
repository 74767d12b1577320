/// Declares the marker type `$instruction` and `$name` as the alias of its
/// `$shape` representation, e.g. `InstructionWithAddress<$instruction>`, and
/// lets `$name` be decoded from opcodes of `$instruction_class`. Decoding
/// any other class fails with `InvalidInstructionClass`.
macro_rules! define_instruction {
    ($instruction:ident, $name:ident, $shape:ident, $instruction_class:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = $shape<$instruction>;
        impl TryFrom<Opcode> for $name {
            type Error = InstructionParsingError;

            fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
                opcode.expect_class($instruction_class)?;
                Ok(Self::from_opcode(&opcode))
            }
        }
    };
}
