//! Loader for LS-8 program files.
//!
//! Every line holds one byte written in binary, anything after a `#` is a
//! comment:
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```
//!
//! Bytes are stored at consecutive addresses starting at 0. Lines that do not
//! hold a binary byte are skipped.

use std::path::{Path, PathBuf};
use std::str::{FromStr, Lines};
use std::{error, fmt, fs, io};

use super::{Address, Byte, Memory};

#[derive(Debug)]
pub enum LoadError {
    /// The program file could not be read
    Io { path: PathBuf, source: io::Error },
    /// The program has more bytes than the memory has cells
    ProgramTooLarge { capacity: usize, line_nr: usize },
}

impl LoadError {
    pub fn exit_code(&self) -> i32 {
        crate::error::EXIT_LOAD
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } if source.kind() == io::ErrorKind::NotFound => {
                write!(f, "{} Not Found", path.display())
            }
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::ProgramTooLarge { capacity, line_nr } => write!(
                f,
                "error [ln: {}]: program does not fit into {} bytes of memory",
                line_nr, capacity
            ),
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::ProgramTooLarge { .. } => None,
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// Parses a binary byte. A leading `+` and a `0b` prefix, in that order, are
/// both optional.
fn parse_byte(token: &str) -> Option<Byte> {
    let unsigned = token.strip_prefix('+').unwrap_or(token);
    let digits = unsigned.strip_prefix("0b").unwrap_or(unsigned);
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }

    Byte::from_str_radix(digits, 2).ok()
}

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: Address,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` from
    /// address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and loads all of `data` into memory.
    ///
    /// # Errors
    ///
    /// [`LoadError::ProgramTooLarge`] once a byte would land past the end of
    /// the memory.
    pub fn parse(mut self) -> Result<Memory<S>> {
        while let Some(res) = self.parse_next_line() {
            res?;
        }

        log::info!("Loaded {} bytes", self.position);

        Ok(self.memory)
    }

    /// Parses the next line of the input. Lines without a byte are skipped.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let code = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        }
        .trim();

        if code.is_empty() {
            // Comment or empty line; skip
            return Some(Ok(()));
        }

        match parse_byte(code) {
            Some(byte) => Some(self.write_byte(byte)),
            None => {
                log::debug!("[{}] Skipping `{}`", self.line_nr, code);
                Some(Ok(()))
            }
        }
    }

    /// Writes `byte` at the current position and moves on to the next cell.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        if self.position >= S {
            return Err(LoadError::ProgramTooLarge {
                capacity: S,
                line_nr: self.line_nr,
            });
        }

        self.memory.write_byte(self.position, byte);
        self.position += 1;

        Ok(())
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = LoadError;

    fn from_str(data: &str) -> Result<Self> {
        Parser::new(data, Memory::default()).parse()
    }
}

impl<const S: usize> Memory<S> {
    /// Loads an LS-8 program file into a fresh memory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;

        data.parse()
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::{StdMem, DEFAULT_SIZE};
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_print8() -> Result<()> {
        let data = r#"
            # print8.ls8: Print the number 8 on the screen

            10000010 # LDI R0,8
            00000000
            00001000
            01000111 # PRN R0
            00000000
            00000001 # HLT
        "#;

        let mem = StdMem::from_str(data)?;

        assert_eq!(mem.read_byte(0), Instruction::LDI.into());
        assert_eq!(mem.read_byte(1), 0);
        assert_eq!(mem.read_byte(2), 8);
        assert_eq!(mem.read_byte(3), Instruction::PRN.into());
        assert_eq!(mem.read_byte(4), 0);
        assert_eq!(mem.read_byte(5), Instruction::HLT.into());
        assert!(mem.data[6..].iter().all(|&byte| byte == 0));

        Ok(())
    }

    #[test]
    fn parse_skips_malformed_lines() -> Result<()> {
        let data = "10000010\nhello\n\n#10100010\n2\n00000001 trailing\n0b101\n111111111\n   00001000   \n";

        let mem = StdMem::from_str(data)?;

        assert_eq!(mem.read_byte(0), 0b1000_0010);
        assert_eq!(mem.read_byte(1), 0b101);
        assert_eq!(mem.read_byte(2), 0b1000);
        assert_eq!(mem.read_byte(3), 0);

        Ok(())
    }

    #[test]
    fn parse_leading_plus() -> Result<()> {
        let mem = StdMem::from_str("+1000010\n00000001\n+0b11\n0b+11\n++1\n+\n")?;

        assert_eq!(mem.read_byte(0), 0b100_0010);
        assert_eq!(mem.read_byte(1), 1);
        assert_eq!(mem.read_byte(2), 0b11);
        assert_eq!(mem.read_byte(3), 0);

        Ok(())
    }

    #[test]
    fn parse_comment_only() -> Result<()> {
        let mem = StdMem::from_str("# nothing\n   # at all\n")?;
        assert_eq!(mem, StdMem::default());

        Ok(())
    }

    #[test]
    fn parse_fills_memory() -> Result<()> {
        let data = "00000001\n".repeat(DEFAULT_SIZE);
        let mem = StdMem::from_str(&data)?;
        assert!(mem.data.iter().all(|&byte| byte == 1));

        Ok(())
    }

    #[test]
    fn parse_program_too_large() -> Result<()> {
        let data = "00000001\n".repeat(5);
        let result = Memory::<4>::from_str(&data);

        assert!(matches!(
            result,
            Err(LoadError::ProgramTooLarge {
                capacity: 4,
                line_nr: 5
            })
        ));

        Ok(())
    }

    #[test]
    fn load_missing_file() -> Result<()> {
        let err = StdMem::from_file("does/not/exist.ls8").unwrap_err();

        assert!(matches!(&err, LoadError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound));
        assert_eq!(err.to_string(), "does/not/exist.ls8 Not Found");
        assert_eq!(err.exit_code(), 2);

        Ok(())
    }

    #[test]
    fn load_file() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/programs/mult.ls8");
        let mem = StdMem::from_file(path)?;

        assert_eq!(mem.read_byte(6), Instruction::MUL.into());
        assert_eq!(mem.read_byte(11), Instruction::HLT.into());

        Ok(())
    }
}
