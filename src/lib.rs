//! An emulator for the LS-8, an 8-bit CPU with 256 bytes of memory, eight
//! registers and a downward growing stack.
//!
//! ```
//! use ls8::config::MachineConfig;
//! use ls8::machine::Machine;
//! use ls8::memory::StdMem;
//! use ls8::write_instructions;
//!
//! let mut mem = StdMem::default();
//! use ls8::processor::Instruction::*;
//! write_instructions!(mem : 0 => LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT);
//!
//! let mut machine = Machine::new(mem, MachineConfig::default(), Vec::new());
//! machine.run().unwrap();
//! assert_eq!(machine.output().as_slice(), b"72\n");
//! ```

pub mod alu;
pub mod config;
pub mod error;
pub mod machine;
pub mod memory;
pub mod processor;
pub mod registers;
