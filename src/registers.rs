use crate::error::MachineError;
use crate::memory::{Bounds, Byte};

/// Number of registers in the register file
pub const REGISTER_COUNT: usize = 8;
/// Register holding the stack pointer
pub const SP: Byte = 7;

/// The register file, `R0` to `R7`. `R7` doubles as the stack pointer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    pub data: [Byte; REGISTER_COUNT],
}

impl Registers {
    /// Creates a register file with every register cleared and the stack
    /// pointer at `stack_top`
    pub fn new(stack_top: Byte) -> Self {
        let mut registers = Self::default();
        registers.data[SP as usize] = stack_top;
        registers
    }

    fn slot(index: Byte, bounds: Bounds) -> Result<usize, MachineError> {
        let index = index as usize;
        match bounds {
            Bounds::Wrap => Ok(index % REGISTER_COUNT),
            Bounds::Trap if index < REGISTER_COUNT => Ok(index),
            Bounds::Trap => Err(MachineError::InvalidRegister {
                index: index as Byte,
            }),
        }
    }

    pub fn get(&self, index: Byte, bounds: Bounds) -> Result<Byte, MachineError> {
        Ok(self.data[Self::slot(index, bounds)?])
    }

    pub fn set(&mut self, index: Byte, value: Byte, bounds: Bounds) -> Result<(), MachineError> {
        self.data[Self::slot(index, bounds)?] = value;
        Ok(())
    }

    #[inline]
    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    #[inline]
    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }

    /// Stack pointer after a push, without applying it
    pub fn sp_after_push(&self, bounds: Bounds) -> Result<Byte, MachineError> {
        match bounds {
            Bounds::Wrap => Ok(self.sp().wrapping_sub(1)),
            Bounds::Trap => self.sp().checked_sub(1).ok_or(MachineError::StackOverflow),
        }
    }

    /// Stack pointer after a pop, without applying it
    pub fn sp_after_pop(&self, bounds: Bounds) -> Result<Byte, MachineError> {
        match bounds {
            Bounds::Wrap => Ok(self.sp().wrapping_add(1)),
            Bounds::Trap => self.sp().checked_add(1).ok_or(MachineError::StackUnderflow),
        }
    }
}
