//! # instruction
//!
//! Every CHIP-8 instruction is one big-endian 16-bit word. The top nibble
//! picks the family; families 0x0, 0x8, 0xE and 0xF are further split on
//! the low nibble or low byte. Operand fields sit at fixed positions:
//!
//! ```text
//!   _nnn   address
//!   _x__   register Vx
//!   __y_   register Vy
//!   __kk   byte immediate
//!   ___n   nibble immediate
//! ```
use crate::error::{Chip8Error, Result};

/// A register index, 0x0..=0xf
pub type Reg = usize;

/// the flag register
pub const VF: Reg = 0xf;

/// Raw instruction word with field accessors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn x(self) -> Reg {
        ((self.0 & 0x0f00) >> 8) as Reg
    }

    pub fn y(self) -> Reg {
        ((self.0 & 0x00f0) >> 4) as Reg
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0x00ff) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000f) as u8
    }
}

/// The 35 CHIP-8 instructions. Once a word has decoded into one of these
/// it is guaranteed to be executable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn: call a machine-code routine on the original hardware; ignored
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipEqImm { x: Reg, kk: u8 },
    /// 4xkk
    SkipNeImm { x: Reg, kk: u8 },
    /// 5xy0
    SkipEqReg { x: Reg, y: Reg },
    /// 6xkk
    LoadImm { x: Reg, kk: u8 },
    /// 7xkk
    AddImm { x: Reg, kk: u8 },
    /// 8xy0
    Move { x: Reg, y: Reg },
    /// 8xy1
    Or { x: Reg, y: Reg },
    /// 8xy2
    And { x: Reg, y: Reg },
    /// 8xy3
    Xor { x: Reg, y: Reg },
    /// 8xy4
    AddReg { x: Reg, y: Reg },
    /// 8xy5
    SubReg { x: Reg, y: Reg },
    /// 8xy6
    ShiftRight { x: Reg, y: Reg },
    /// 8xy7
    SubRegInv { x: Reg, y: Reg },
    /// 8xyE
    ShiftLeft { x: Reg, y: Reg },
    /// 9xy0
    SkipNeReg { x: Reg, y: Reg },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpV0(u16),
    /// Cxkk
    Random { x: Reg, kk: u8 },
    /// Dxyn
    Draw { x: Reg, y: Reg, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: Reg },
    /// ExA1
    SkipKeyNotPressed { x: Reg },
    /// Fx07
    LoadDelay { x: Reg },
    /// Fx0A
    WaitKey { x: Reg },
    /// Fx15
    SetDelay { x: Reg },
    /// Fx18
    SetSound { x: Reg },
    /// Fx1E
    AddIndex { x: Reg },
    /// Fx29
    LoadGlyph { x: Reg },
    /// Fx33
    StoreBcd { x: Reg },
    /// Fx55
    StoreRegs { x: Reg },
    /// Fx65
    LoadRegs { x: Reg },
}

impl Instruction {
    pub fn decode(word: u16) -> Result<Instruction> {
        use Instruction::*;

        let op = Opcode(word);
        let (x, y) = (op.x(), op.y());
        let inst = match (op.family(), op.n()) {
            (0x0, _) => match op.nnn() {
                0x0e0 => ClearScreen,
                0x0ee => Return,
                nnn => Sys(nnn),
            },
            (0x1, _) => Jump(op.nnn()),
            (0x2, _) => Call(op.nnn()),
            (0x3, _) => SkipEqImm { x, kk: op.kk() },
            (0x4, _) => SkipNeImm { x, kk: op.kk() },
            (0x5, 0x0) => SkipEqReg { x, y },
            (0x6, _) => LoadImm { x, kk: op.kk() },
            (0x7, _) => AddImm { x, kk: op.kk() },
            (0x8, 0x0) => Move { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => AddReg { x, y },
            (0x8, 0x5) => SubReg { x, y },
            (0x8, 0x6) => ShiftRight { x, y },
            (0x8, 0x7) => SubRegInv { x, y },
            (0x8, 0xe) => ShiftLeft { x, y },
            (0x9, 0x0) => SkipNeReg { x, y },
            (0xa, _) => LoadIndex(op.nnn()),
            (0xb, _) => JumpV0(op.nnn()),
            (0xc, _) => Random { x, kk: op.kk() },
            (0xd, n) => Draw { x, y, n },
            (0xe, _) => match op.kk() {
                0x9e => SkipKeyPressed { x },
                0xa1 => SkipKeyNotPressed { x },
                _ => return Err(Chip8Error::UnknownOpcode(word)),
            },
            (0xf, _) => match op.kk() {
                0x07 => LoadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegs { x },
                0x65 => LoadRegs { x },
                _ => return Err(Chip8Error::UnknownOpcode(word)),
            },
            _ => return Err(Chip8Error::UnknownOpcode(word)),
        };
        Ok(inst)
    }
}
