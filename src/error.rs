use std::{error, fmt, io};

use crate::memory::{Address, Byte};

/// Process exit status for a fault raised while the machine is running
pub const EXIT_FAULT: i32 = 1;
/// Process exit status for a program that could not be loaded, or a bad command line
pub const EXIT_LOAD: i32 = 2;

/// Faults raised by the fetch-decode-execute loop. Each one ends the run.
#[derive(Debug)]
pub enum MachineError {
    /// The byte at `address` is not part of the instruction set
    UnknownOpcode { opcode: Byte, address: Address },
    /// An access left the memory while trapping out of range addresses
    OutOfBounds { address: Address, size: usize },
    /// A register operand does not name one of the eight registers
    InvalidRegister { index: Byte },
    /// A return address does not fit into a register
    AddressOverflow { address: Address },
    /// PUSH or CALL with the stack pointer at 0
    StackOverflow,
    /// POP or RET with the stack pointer at 0xFF
    StackUnderflow,
    /// PRN could not write its output
    Output(io::Error),
}

impl MachineError {
    pub fn exit_code(&self) -> i32 {
        EXIT_FAULT
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::UnknownOpcode { opcode, address } => write!(
                f,
                "unknown opcode `0b{:08b}` at address `0x{:02X}`",
                opcode, address
            ),
            MachineError::OutOfBounds { address, size } => write!(
                f,
                "address `0x{:X}` is outside of memory of size {}",
                address, size
            ),
            MachineError::InvalidRegister { index } => {
                write!(f, "register `R{}` does not exist", index)
            }
            MachineError::AddressOverflow { address } => write!(
                f,
                "return address `0x{:X}` does not fit into a register",
                address
            ),
            MachineError::StackOverflow => f.write_str("stack overflow"),
            MachineError::StackUnderflow => f.write_str("stack underflow"),
            MachineError::Output(err) => write!(f, "failed to write output: {}", err),
        }
    }
}

impl error::Error for MachineError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MachineError::Output(err) => Some(err),
            _ => None,
        }
    }
}
