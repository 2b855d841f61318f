use std::io::Write;

use crate::config::MachineConfig;
use crate::error::MachineError;
use crate::memory::{Memory, DEFAULT_SIZE};
use crate::processor::Processor;

/// A machine with the standard 256 bytes of memory
pub type StdMachine<W> = Machine<W, DEFAULT_SIZE>;

/// Owns the complete emulated state: processor, memory and the sink PRN
/// writes to.
#[derive(Debug)]
pub struct Machine<W, const S: usize> {
    pub processor: Processor,
    pub memory: Memory<S>,
    output: W,
}

impl<W: Write, const S: usize> Machine<W, S> {
    /// Creates a machine around an already loaded memory
    pub fn new(memory: Memory<S>, config: MachineConfig, output: W) -> Self {
        Self {
            processor: Processor::new(config),
            memory,
            output,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.processor.halted
    }

    /// Executes exactly one instruction. Returns whether the machine halted.
    pub fn step(&mut self) -> Result<bool, MachineError> {
        if !self.processor.halted {
            self.processor.execute(&mut self.memory, &mut self.output)?;
        }

        Ok(self.processor.halted)
    }

    /// Runs until HLT
    pub fn run(&mut self) -> Result<(), MachineError> {
        let result = self
            .processor
            .execute_until_hlt(&mut self.memory, &mut self.output);
        self.output.flush().map_err(MachineError::Output)?;
        result
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
