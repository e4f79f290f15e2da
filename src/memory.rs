use crate::error::Chip8Error;
use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable byte memory of the machine. Out of range
/// addresses are a bug in the program or in decode, so they panic rather
/// than wrap.
pub trait MemoryMap {
    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];

    fn get(&self, addr: u16) -> u8 {
        self.get_ro_slice(addr, 1)[0]
    }

    fn set(&mut self, addr: u16, value: u8) {
        self.get_rw_slice(addr, 1)[0] = value;
    }

    /// get a big-endian two-byte word (opcodes, stack entries)
    fn get_word(&self, addr: u16) -> u16 {
        let word = self.get_ro_slice(addr, 2);
        ((word[0] as u16) << 8) | (word[1] as u16)
    }

    /// store a big-endian two-byte word
    fn set_word(&mut self, addr: u16, value: u16) {
        let word = self.get_rw_slice(addr, 2);
        word[0] = (value >> 8) as u8;
        word[1] = value as u8;
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) {
        self.get_rw_slice(addr, data.len()).copy_from_slice(data);
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live; each is 5 bytes tall
pub const CHIP8_FONT_ADDR: u16 = 0x0000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// stack sits straight after the font and grows upward, two bytes per entry
pub const CHIP8_STACK_ADDR: u16 = CHIP8_FONT_ADDR + CHIP8_FONT.len() as u16 + 2;

/// biggest program we can hold
pub const CHIP8_PROGRAM_CAPACITY: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// Defines the CHIP-8 memory map (4K configuration):
///   0x0000-0x004f  font
///   0x0052-0x00ff  stack (16 bit entries, high byte first)
///   0x0200-0x0fff  program
pub struct Chip8Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8Memory {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

impl Chip8Memory {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8Memory {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// load a CHIP-8 program at 0x200; refuses anything that won't fit
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_PROGRAM_CAPACITY {
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                capacity: CHIP8_PROGRAM_CAPACITY,
            });
        }
        self.write(program, CHIP8_PROGRAM_ADDR);
        debug!(
            "loaded {} byte program at {:03x}",
            program.len(),
            CHIP8_PROGRAM_ADDR
        );
        Ok(())
    }

    /// load a program of unknown length from anything readable
    pub fn load_from_reader(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// address of the glyph for hex digit `digit`
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + CHIP8_FONT_GLYPH_BYTES * (digit & 0x0f) as u16
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT: [u8; 80] = [
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
