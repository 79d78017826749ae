use crate::error::LoadError;
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const ADDR_MASK: TypeAddr = 0x0FFF;

pub const FONT_ADDR: TypeAddr = 0x050;
pub const FONT_GLYPH_LEN: TypeAddr = 5;
pub const BIG_FONT_ADDR: TypeAddr = 0x0A0;
pub const BIG_FONT_GLYPH_LEN: TypeAddr = 10;

pub const STACK_DEPTH: usize = 16;

const DEFAULT_FONT: [u8; 5 * 16] = [
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

// SUPER-CHIP 8x10 digits, 0-9 only
const BIG_FONT: [u8; 10 * 10] = [
    0x3C, 0x7E, 0xE7, 0xC3, 0xC3, 0xC3, 0xC3, 0xE7, 0x7E, 0x3C, // 0
    0x18, 0x38, 0x58, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, // 1
    0x3E, 0x7F, 0xC3, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFF, 0xFF, // 2
    0x3C, 0x7E, 0xC3, 0x03, 0x0E, 0x0E, 0x03, 0xC3, 0x7E, 0x3C, // 3
    0x06, 0x0E, 0x1E, 0x36, 0x66, 0xC6, 0xFF, 0xFF, 0x06, 0x06, // 4
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFE, 0x03, 0xC3, 0x7E, 0x3C, // 5
    0x3E, 0x7C, 0xC0, 0xC0, 0xFC, 0xFE, 0xC3, 0xC3, 0x7E, 0x3C, // 6
    0xFF, 0xFF, 0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, // 7
    0x3C, 0x7E, 0xC3, 0xC3, 0x7E, 0x7E, 0xC3, 0xC3, 0x7E, 0x3C, // 8
    0x3C, 0x7E, 0xC3, 0xC3, 0x7F, 0x3F, 0x03, 0x03, 0x3E, 0x7C, // 9
];

pub struct Memory {
    // 4k bytes
    // small font at 050 -> 09F, big font at 0A0 -> 103
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            stack: Stack::new(),
        };
        mem.load_fonts();
        mem
    }

    fn load_fonts(&mut self) {
        let start = FONT_ADDR as usize;
        self.bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
        let start = BIG_FONT_ADDR as usize;
        self.bytes[start..start + BIG_FONT.len()].copy_from_slice(&BIG_FONT);
    }

    /// Reads a byte; the address wraps to 12 bits.
    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    /// Writes a byte; the address wraps to 12 bits.
    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = val;
    }

    /// Big-endian opcode at `addr`, or `None` if the second byte falls off the
    /// end of memory.
    pub fn word_at(&self, addr: TypeAddr) -> Option<u16> {
        let hi = addr as usize;
        if hi + 1 > ADDR_MASK as usize {
            return None;
        }
        Some(u16::from_be_bytes([self.bytes[hi], self.bytes[hi + 1]]))
    }

    /// Wipes memory, reinstalls the fonts and copies the program to 0x200.
    /// Nothing is touched if the program does not fit.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        *self = Self::new();
        self.write_program(rom);
        Ok(())
    }

    /// Copies as much of `rom` as fits into the program area.
    pub(crate) fn write_program(&mut self, rom: &[u8]) {
        let len = rom.len().min(MAX_ROM_SIZE);
        let start = PROGRAM_START as usize;
        self.bytes[start..start + len].copy_from_slice(&rom[..len]);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

pub struct Stack {
    addresses: Vec<TypeAddr>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: Vec::with_capacity(STACK_DEPTH),
        }
    }

    pub fn push(&mut self, addr: TypeAddr) -> Result<(), StackFault> {
        if self.addresses.len() == STACK_DEPTH {
            return Err(StackFault::Overflow);
        }
        self.addresses.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TypeAddr, StackFault> {
        self.addresses.pop().ok_or(StackFault::Underflow)
    }

    pub fn depth(&self) -> usize {
        self.addresses.len()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
