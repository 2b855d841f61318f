use std::convert::TryFrom;
use std::convert::TryInto;
use std::fmt::Write as _;
use std::io::Write;

use crate::alu::{self, AluOp, Flags};
use crate::config::MachineConfig;
use crate::error::MachineError;
use crate::memory::{Address, Bounds, Byte, Memory};
use crate::registers::Registers;
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Where the program counter goes after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Step over the instruction and its operands
    Next,
    /// Continue at the given address
    Jump(Address),
    Halt,
}

/// Emulates a CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Address,
    /// General purpose registers, `R7` is the stack pointer
    pub registers: Registers,
    /// Condition flags written by CMP
    pub flags: Flags,
    /// Set once HLT was executed
    pub halted: bool,
    pub config: MachineConfig,
}

impl Default for Processor {
    /// Initializes a new CPU
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl Processor {
    /// Initializes a new CPU. Execution starts at address 0.
    pub fn new(config: MachineConfig) -> Self {
        Self {
            pc: 0,
            registers: Registers::new(config.stack_top),
            flags: Flags::default(),
            halted: false,
            config,
        }
    }

    /// Fetches the operand `n` bytes after the opcode
    fn operand<const S: usize>(&self, memory: &Memory<S>, n: usize) -> Result<Byte, MachineError> {
        memory.load(self.pc + n, self.config.bounds)
    }

    fn register(&self, index: Byte) -> Result<Byte, MachineError> {
        self.registers.get(index, self.config.bounds)
    }

    fn push<const S: usize>(&mut self, memory: &mut Memory<S>, value: Byte) -> Result<(), MachineError> {
        let sp = self.registers.sp_after_push(self.config.bounds)?;
        memory.store(sp as Address, value, self.config.bounds)?;
        self.registers.set_sp(sp);
        Ok(())
    }

    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, MachineError> {
        let sp = self.registers.sp_after_pop(self.config.bounds)?;
        let value = memory.load(self.registers.sp() as Address, self.config.bounds)?;
        self.registers.set_sp(sp);
        Ok(value)
    }

    /// Executes a single instruction. The program counter is left untouched,
    /// the returned [`Flow`] says where to continue.
    fn execute_instruction<const S: usize, W: Write>(
        &mut self,
        instruction: Instruction,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<Flow, MachineError> {
        let bounds = self.config.bounds;

        let flow = match instruction {
            Instruction::HLT => {
                self.halted = true; // set termination flag

                debug!("HLT");
                Flow::Halt
            }
            Instruction::LDI => {
                let reg = self.operand(memory, 1)?;
                let value = self.operand(memory, 2)?;
                self.registers.set(reg, value, bounds)?;

                debug!("LDI R{} {}", reg, value);
                Flow::Next
            }
            Instruction::PRN => {
                let reg = self.operand(memory, 1)?;
                let value = self.register(reg)?;
                writeln!(out, "{}", value).map_err(MachineError::Output)?;

                debug!("PRN R{}: {}", reg, value);
                Flow::Next
            }
            Instruction::ADD => self.alu(AluOp::Add, instruction, memory)?,
            Instruction::MUL => self.alu(AluOp::Mul, instruction, memory)?,
            Instruction::CMP => self.alu(AluOp::Cmp, instruction, memory)?,
            Instruction::PUSH => {
                let reg = self.operand(memory, 1)?;
                let value = self.register(reg)?;
                self.push(memory, value)?;

                debug!("PUSH R{}: {}", reg, value);
                Flow::Next
            }
            Instruction::POP => {
                let reg = self.operand(memory, 1)?;
                // validate the destination before the stack moves
                self.register(reg)?;
                let value = self.pop(memory)?;
                self.registers.set(reg, value, bounds)?;

                debug!("POP R{}: {}", reg, value);
                Flow::Next
            }
            Instruction::CALL => {
                let reg = self.operand(memory, 1)?;
                let target = self.register(reg)?;
                let return_address = self.return_address(self.pc + instruction.size())?;
                self.push(memory, return_address)?;

                debug!("CALL R{}: {} (return to {})", reg, target, return_address);
                Flow::Jump(target as Address)
            }
            Instruction::RET => {
                let target = self.pop(memory)?;

                debug!("RET {}", target);
                Flow::Jump(target as Address)
            }
            Instruction::JMP => {
                let reg = self.operand(memory, 1)?;
                let target = self.register(reg)?;

                debug!("JMP R{}: {}", reg, target);
                Flow::Jump(target as Address)
            }
            Instruction::JEQ | Instruction::JNE => {
                let taken = (instruction == Instruction::JEQ) == self.flags.equal;
                let reg = self.operand(memory, 1)?;

                if taken {
                    let target = self.register(reg)?;

                    debug!("{} R{}: {}", instruction, reg, target);
                    Flow::Jump(target as Address)
                } else {
                    debug!("{} R{}: not taken", instruction, reg);
                    Flow::Next
                }
            }
        };

        Ok(flow)
    }

    /// Runs a two-register ALU instruction
    fn alu<const S: usize>(
        &mut self,
        op: AluOp,
        instruction: Instruction,
        memory: &Memory<S>,
    ) -> Result<Flow, MachineError> {
        let reg_a = self.operand(memory, 1)?;
        let reg_b = self.operand(memory, 2)?;
        alu::execute(
            op,
            &mut self.registers,
            &mut self.flags,
            reg_a,
            reg_b,
            self.config.bounds,
        )?;

        debug!(
            "{} R{} R{}: {} {:?}",
            instruction,
            reg_a,
            reg_b,
            self.register(reg_a)?,
            self.flags
        );
        Ok(Flow::Next)
    }

    /// Converts the address following a CALL into a stack value
    fn return_address(&self, address: Address) -> Result<Byte, MachineError> {
        match self.config.bounds {
            Bounds::Wrap => Ok(address as Byte),
            Bounds::Trap => address
                .try_into()
                .map_err(|_| MachineError::AddressOverflow { address }),
        }
    }

    /// Runs one execution step: fetch, decode, execute, then advance or jump.
    ///
    /// # Errors
    ///
    /// Fails with [`MachineError::UnknownOpcode`] when the byte at the
    /// program counter is not an instruction. Nothing is changed in that case.
    pub fn execute<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), MachineError> {
        let bounds = self.config.bounds;
        let opcode = memory.load(self.pc, bounds)?; // Read opcode where PC is
        let instruction = Instruction::try_from(opcode).map_err(|_| MachineError::UnknownOpcode {
            opcode,
            address: self.pc,
        })?;

        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace(memory));
        }

        match self.execute_instruction(instruction, memory, out)? {
            Flow::Next => {
                let next = self.pc + instruction.size();
                self.pc = match bounds {
                    Bounds::Wrap => next % S,
                    Bounds::Trap => next,
                };
            }
            Flow::Jump(address) => self.pc = address,
            Flow::Halt => {}
        }

        Ok(())
    }

    /// Run program until the HLT instruction is executed
    pub fn execute_until_hlt<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), MachineError> {
        while !self.halted {
            self.execute(memory, out)?;
        }

        info!("Program halted at 0x{:02X}", self.pc);

        Ok(())
    }

    /// Renders the machine state as
    /// `TRACE: PC | IR OP1 OP2 | R0 R1 R2 R3 R4 R5 R6 R7`
    pub fn trace<const S: usize>(&self, memory: &Memory<S>) -> String {
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc,
            memory.peek(self.pc),
            memory.peek(self.pc + 1),
            memory.peek(self.pc + 2)
        );

        for register in self.registers.data.iter() {
            let _ = write!(line, " {:02X}", register);
        }

        line
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions. Bits 7 and 6 of the encoding hold the
        /// number of operands following the opcode.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001,
    /// Return from a subroutine, popping the program counter from the stack
    RET = 0b0001_0001,
    /// Push the value of a register onto the stack
    /// @param reg The register to push
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into a register
    /// @param reg The register to pop into
    POP = 0b0100_0110,
    /// Prints the value of a register as a decimal number
    /// @param reg The register to print
    PRN = 0b0100_0111,
    /// Push the address of the next instruction and jump to a subroutine
    /// @param reg The register holding the subroutine address
    CALL = 0b0101_0000,
    /// Jump to an address
    /// @param reg The register holding the address
    JMP = 0b0101_0100,
    /// Jump if the equal flag is set
    /// @param reg The register holding the address
    JEQ = 0b0101_0101,
    /// Jump if the equal flag is clear
    /// @param reg The register holding the address
    JNE = 0b0101_0110,
    /// Load an immediate into a register
    /// @param reg The register to load
    /// @param value The value to load
    LDI = 0b1000_0010,
    /// Add the second register to the first
    /// @param reg_a Destination and first summand
    /// @param reg_b Second summand
    ADD = 0b1010_0000,
    /// Multiply the first register by the second
    /// @param reg_a Destination and first factor
    /// @param reg_b Second factor
    MUL = 0b1010_0010,
    /// Compare two registers and set exactly one of the flags
    /// @param reg_a First register
    /// @param reg_b Second register
    CMP = 0b1010_0111,
}

impl Instruction {
    /// Number of operand bytes following the opcode
    pub fn operand_count(self) -> usize {
        (u8::from(self) >> 6) as usize
    }

    /// Number of bytes the instruction occupies, opcode included
    pub fn size(self) -> usize {
        1 + self.operand_count()
    }
}

impl ::std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.write_str(self.name())
    }
}
