use std::fmt::Write;

use crate::error::MachineError;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Address = usize;

/// Number of cells in the LS-8 address space
pub const DEFAULT_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<DEFAULT_SIZE>;

/// How an address outside of the memory is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bounds {
    /// Out of range accesses fail with an error
    Trap,
    /// Addresses are reduced modulo the memory size
    Wrap,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::Trap
    }
}

/// Emulates memory for use with the CPU. Program bytes and the stack share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Address) -> Byte {
        self.data[position]
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Address, value: Byte) {
        self.data[position] = value;
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Address, data: &[Byte]) {
        self.data[position..position + data.len()].copy_from_slice(data);
    }

    /// Reads a byte, or 0 if `position` is outside of the memory
    pub fn peek(&self, position: Address) -> Byte {
        self.data.get(position).copied().unwrap_or(0)
    }

    /// Maps `position` onto a valid cell according to `bounds`.
    ///
    /// # Errors
    ///
    /// [`MachineError::OutOfBounds`] if `bounds` is [`Bounds::Trap`] and the
    /// position is not below `S`.
    pub fn resolve(&self, position: Address, bounds: Bounds) -> Result<Address, MachineError> {
        match bounds {
            Bounds::Wrap => Ok(position % S),
            Bounds::Trap if position < S => Ok(position),
            Bounds::Trap => Err(MachineError::OutOfBounds {
                address: position,
                size: S,
            }),
        }
    }

    /// Reads a byte through the bounds policy
    pub fn load(&self, position: Address, bounds: Bounds) -> Result<Byte, MachineError> {
        let position = self.resolve(position, bounds)?;
        Ok(self.data[position])
    }

    /// Writes a byte through the bounds policy
    pub fn store(
        &mut self,
        position: Address,
        value: Byte,
        bounds: Bounds,
    ) -> Result<(), MachineError> {
        let position = self.resolve(position, bounds)?;
        self.data[position] = value;
        Ok(())
    }

    /// Renders the memory as a hex dump, 16 cells per row
    pub fn dump(&self) -> String {
        let mut out = String::new();

        for (row, chunk) in self.data.chunks(16).enumerate() {
            let _ = write!(out, "{:04X}:", row * 16);
            for byte in chunk {
                let _ = write!(out, " {:02X}", byte);
            }
            out.push('\n');
        }

        out
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ]);
    };
}

#[cfg(test)]
mod tests {
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2), 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12);
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(&mem.data[0x44..0x48], &[0x12, 0x34, 0x56, 0x78]);

        Ok(())
    }

    #[test]
    fn test_peek_outside_memory() -> Result<()> {
        let mut mem = Memory::<4>::default();
        mem.write_byte(3, 9);
        assert_eq!(mem.peek(3), 9);
        assert_eq!(mem.peek(4), 0);

        Ok(())
    }

    #[test]
    fn test_trap_out_of_bounds() -> Result<()> {
        let mut mem = Memory::<16>::default();

        assert_eq!(mem.resolve(15, Bounds::Trap)?, 15);
        assert!(matches!(
            mem.load(16, Bounds::Trap),
            Err(MachineError::OutOfBounds {
                address: 16,
                size: 16
            })
        ));
        assert!(mem.store(200, 1, Bounds::Trap).is_err());
        assert_eq!(mem, Memory::<16>::default());

        Ok(())
    }

    #[test]
    fn test_wrap_out_of_bounds() -> Result<()> {
        let mut mem = Memory::<16>::default();

        mem.store(17, 42, Bounds::Wrap)?;
        assert_eq!(mem.data[1], 42);
        assert_eq!(mem.load(33, Bounds::Wrap)?, 42);

        Ok(())
    }

    #[test]
    fn test_dump() -> Result<()> {
        let mut mem = Memory::<32>::default();
        mem.write_array(0x10, &[0x82, 0x00, 0x08]);

        let dump = mem.dump();
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("0000: 00 00"));
        assert!(rows[1].starts_with("0010: 82 00 08 00"));

        Ok(())
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0,
            &[
                Instruction::LDI as Byte,
                0,
                8,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        );

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0 => LDI, 0, 8, PRN, 0, HLT);

        assert_eq!(mem, mem2);

        Ok(())
    }
}
