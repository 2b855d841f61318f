use std::ffi::OsString;
use std::path::PathBuf;
use std::{error, fmt};

use log::LevelFilter;

use crate::memory::{Bounds, Byte};

/// Initial stack pointer. `0xF4..=0xFF` stays clear of the stack.
pub const STACK_TOP: Byte = 0xF4;

/// Settings the machine runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineConfig {
    /// Handling of addresses, register indices and stack pointer moves that
    /// leave their range
    pub bounds: Bounds,
    /// Value `R7` starts with
    pub stack_top: Byte,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::Trap,
            stack_top: STACK_TOP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingProgram,
    UnknownFlag(String),
    UnexpectedArgument(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingProgram => f.write_str("no program file given"),
            ConfigError::UnknownFlag(flag) => write!(f, "unknown flag `{}`", flag),
            ConfigError::UnexpectedArgument(arg) => write!(f, "unexpected argument `{}`", arg),
        }
    }
}

impl error::Error for ConfigError {}

/// Command line configuration of the `ls8` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub program: PathBuf,
    pub machine: MachineConfig,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn usage(bin: &str) -> String {
        format!(
            "usage: {} [--wrap] [-v|--verbose] [--trace] <program.ls8>\n\
             \n\
             \x20   --wrap        wrap out of range addresses instead of stopping\n\
             \x20   -v, --verbose log every executed instruction\n\
             \x20   --trace       log the machine state before every cycle",
            bin
        )
    }

    /// Parses the arguments following the binary name. Program paths may
    /// be any `OsString`, flags must be UTF-8.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut program = None;
        let mut machine = MachineConfig::default();
        let mut log_level = LevelFilter::Warn;

        for arg in args {
            match arg.to_str() {
                Some("--wrap") => machine.bounds = Bounds::Wrap,
                Some("-v") | Some("--verbose") => log_level = log_level.max(LevelFilter::Debug),
                Some("--trace") => log_level = LevelFilter::Trace,
                Some(flag) if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ConfigError::UnknownFlag(flag.to_owned()))
                }
                _ if program.is_none() => program = Some(PathBuf::from(&arg)),
                _ => {
                    return Err(ConfigError::UnexpectedArgument(
                        arg.to_string_lossy().into_owned(),
                    ))
                }
            }
        }

        Ok(Self {
            program: program.ok_or(ConfigError::MissingProgram)?,
            machine,
            log_level,
        })
    }
}
