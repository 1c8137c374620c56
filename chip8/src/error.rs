//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::{constants::Address, stack::StackError};

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Call stack misuse by the running program.
    Stack {
        kind: StackError,
        /// Address of the offending `CALL` or `RET` instruction.
        pc: Address,
    },
    /// Fetched bits do not map to any instruction.
    UnknownInstruction { instr: u16, pc: Address },
    /// Attempt to load a program with no bytes.
    EmptyProgram,
    /// Attempt to load a bytecode program that can't fit in memory.
    LargeProgram { size: usize },
    Io(std::io::Error),
    Fmt(fmt::Error),
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack { kind, pc } => write!(f, "{kind} at PC = 0x{pc:04X}"),
            Self::UnknownInstruction { instr, pc } => {
                write!(f, "unknown instruction 0x{instr:04X} at PC = 0x{pc:04X}")
            }
            Self::EmptyProgram => write!(f, "program is empty"),
            Self::LargeProgram { size } => {
                write!(f, "program too large for VM memory: {size} bytes")
            }
            Self::Io(err) => write!(f, "{}", err),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Fmt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Chip8Error {
    fn from(err: std::io::Error) -> Self {
        Chip8Error::Io(err)
    }
}

impl From<fmt::Error> for Chip8Error {
    fn from(err: fmt::Error) -> Self {
        Chip8Error::Fmt(err)
    }
}
