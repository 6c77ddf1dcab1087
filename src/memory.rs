use crate::error::{Chip8Error, Result};
use log::info;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents addressable memory. Every access is bounds-checked; nothing
/// wraps around the end of RAM.
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x004f  font
///   0x0050-0x01ff  interpreter (unused)
///   0x0200-0x0fff  program
///
/// chip-8 programs *should* not write below 0x200, but nothing stops them
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = self.check(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = self.check(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live; each glyph is this many bytes
pub const CHIP8_FONT_ADDR: u16 = 0x0000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

impl Chip8MemoryMap {
    /// initialises CHIP-8 with the font baked in and everything else zeroed
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        }
    }

    /// largest program that fits between 0x200 and the top of RAM
    pub fn max_program_size(&self) -> usize {
        CHIP8_RAM_SIZE_BYTES - self.program_addr as usize
    }

    /// copy a program image to 0x200; rejects it before writing if too big
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        let max = self.max_program_size();
        if program.len() > max {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max,
            });
        }
        self.write(program, self.program_addr)?;
        info!(
            "loaded {} byte program at 0x{:03x}",
            program.len(),
            self.program_addr
        );
        Ok(())
    }

    /// load a CHIP-8 program at 0x200 from any reader
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load(&buf)
    }

    /// address of the glyph for hex digit `digit`; nothing stops a program
    /// asking for digits past 0xf
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + digit as u16 * CHIP8_FONT_GLYPH_BYTES
    }

    fn check(&self, addr: u16, len: usize) -> Result<usize> {
        let a = addr as usize;
        if a + len > self.bytes.len() {
            return Err(Chip8Error::MemoryOutOfBounds { addr: a, len });
        }
        Ok(a)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
