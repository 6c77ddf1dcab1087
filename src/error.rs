use std::io;

use thiserror::Error;

/// Everything that can stop the interpreter. All of these are fatal: once
/// one is returned the interpreter is halted and must be rebuilt.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode 0x{0:04x}")]
    UnknownOpcode(u16),

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("call stack overflow ({depth} frames)")]
    StackOverflow { depth: usize },

    #[error("memory access out of bounds: 0x{addr:04x} (+{len} bytes)")]
    MemoryOutOfBounds { addr: usize, len: usize },

    #[error("program is {size} bytes, only {max} bytes fit after 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("interpreter is halted")]
    Halted,

    #[error("device i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
