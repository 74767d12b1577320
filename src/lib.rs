//! A CHIP-8 virtual machine for the terminal. The implementation follows the instruction set
//! described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table). The interpreter runs
//! on its own thread next to a 60Hz timer task and a keyboard polling task, and renders
//! through the cursive text user interface library.
pub mod chip;
