use std::cmp::Ordering;

use crate::error::MachineError;
use crate::memory::{Bounds, Byte};
use crate::registers::Registers;

/// Operations carried out by the arithmetic-logic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Mul,
    Cmp,
}

/// Condition flags. Only [`AluOp::Cmp`] writes them, and afterwards exactly
/// one is set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags {
    pub equal: bool,
    pub less: bool,
    pub greater: bool,
}

impl Flags {
    fn compare(a: Byte, b: Byte) -> Self {
        let mut flags = Self::default();
        match a.cmp(&b) {
            Ordering::Equal => flags.equal = true,
            Ordering::Less => flags.less = true,
            Ordering::Greater => flags.greater = true,
        }
        flags
    }
}

/// Applies `op` to the registers `reg_a` and `reg_b`. Arithmetic results land
/// in `reg_a` and wrap around on overflow.
pub fn execute(
    op: AluOp,
    registers: &mut Registers,
    flags: &mut Flags,
    reg_a: Byte,
    reg_b: Byte,
    bounds: Bounds,
) -> Result<(), MachineError> {
    let a = registers.get(reg_a, bounds)?;
    let b = registers.get(reg_b, bounds)?;

    match op {
        AluOp::Add => registers.set(reg_a, a.wrapping_add(b), bounds),
        AluOp::Mul => registers.set(reg_a, a.wrapping_mul(b), bounds),
        AluOp::Cmp => {
            *flags = Flags::compare(a, b);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    fn registers(a: Byte, b: Byte) -> Registers {
        let mut registers = Registers::default();
        registers.data[0] = a;
        registers.data[1] = b;
        registers
    }

    #[test]
    fn test_add() -> Result<()> {
        let mut regs = registers(3, 4);
        let mut flags = Flags::default();

        execute(AluOp::Add, &mut regs, &mut flags, 0, 1, Bounds::Trap)?;

        assert_eq!(regs.data[0], 7);
        assert_eq!(regs.data[1], 4);
        assert_eq!(flags, Flags::default());

        Ok(())
    }

    #[test]
    fn test_add_wraps() -> Result<()> {
        let mut regs = registers(250, 10);
        execute(AluOp::Add, &mut regs, &mut Flags::default(), 0, 1, Bounds::Trap)?;
        assert_eq!(regs.data[0], 4);

        Ok(())
    }

    #[test]
    fn test_mul() -> Result<()> {
        let mut regs = registers(8, 9);
        execute(AluOp::Mul, &mut regs, &mut Flags::default(), 0, 1, Bounds::Trap)?;
        assert_eq!(regs.data[0], 72);

        let mut regs = registers(16, 17);
        execute(AluOp::Mul, &mut regs, &mut Flags::default(), 0, 1, Bounds::Trap)?;
        assert_eq!(regs.data[0], (16u16 * 17 % 256) as Byte);

        Ok(())
    }

    #[test]
    fn test_add_same_register() -> Result<()> {
        let mut regs = registers(21, 0);
        execute(AluOp::Add, &mut regs, &mut Flags::default(), 0, 0, Bounds::Trap)?;
        assert_eq!(regs.data[0], 42);

        Ok(())
    }

    #[test]
    fn test_cmp_sets_exactly_one_flag() -> Result<()> {
        for a in (0..=255u8).step_by(17) {
            for b in (0..=255u8).step_by(15) {
                let mut regs = registers(a, b);
                // stale flags from an earlier compare must be cleared
                let mut flags = Flags {
                    equal: true,
                    less: true,
                    greater: true,
                };

                execute(AluOp::Cmp, &mut regs, &mut flags, 0, 1, Bounds::Trap)?;

                assert_eq!(flags.equal, a == b);
                assert_eq!(flags.less, a < b);
                assert_eq!(flags.greater, a > b);
                assert_eq!(regs, registers(a, b));
            }
        }

        Ok(())
    }

    #[test]
    fn test_invalid_register_leaves_state() -> Result<()> {
        let mut regs = registers(1, 2);
        let mut flags = Flags::default();

        let result = execute(AluOp::Cmp, &mut regs, &mut flags, 0, 9, Bounds::Trap);

        assert!(matches!(
            result,
            Err(MachineError::InvalidRegister { index: 9 })
        ));
        assert_eq!(flags, Flags::default());

        Ok(())
    }
}
