use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop the machine. None of these are retried; a
/// running program either keeps stepping or the whole run ends.
#[derive(Error, Debug)]
pub enum Chip8Error {
    /// host I/O failed (terminal, rom file, keyboard)
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// rom path exists but isn't a regular file (or doesn't exist at all)
    #[error("rom path {} is not a regular file", .0.display())]
    NotAFile(PathBuf),
    /// rom won't fit between the load address and the top of RAM
    #[error("rom is {size} bytes but only {capacity} bytes are available")]
    RomTooLarge { size: usize, capacity: usize },
    /// no handler for this opcode
    #[error("unknown opcode {opcode:04x} at {addr:03x}")]
    UnknownOpcode { opcode: u16, addr: u16 },
    /// a call would push the stack pointer past the top of its register
    #[error("stack overflow at {addr:03x}")]
    StackOverflow { addr: u16 },
    /// a return with nothing on the stack
    #[error("stack underflow at {addr:03x}")]
    StackUnderflow { addr: u16 },
}

impl Chip8Error {
    /// the user asked to stop (Esc, ctrl-c) while we were waiting on them
    pub fn is_quit(&self) -> bool {
        matches!(self, Chip8Error::Io(e) if e.kind() == io::ErrorKind::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::path::Path;

    #[test]
    fn test_unknown_opcode_message() {
        let e = Chip8Error::UnknownOpcode {
            opcode: 0x0123,
            addr: 0x200,
        };
        assert_eq!(e.to_string(), "unknown opcode 0123 at 200");
    }

    #[test]
    fn test_io_is_source() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(e.source().is_some());
        assert!(!e.is_quit());
    }

    #[test]
    fn test_load_error_messages() {
        let e = Chip8Error::NotAFile(Path::new("roms/missing.ch8").to_path_buf());
        assert_eq!(e.to_string(), "rom path roms/missing.ch8 is not a regular file");
        let e = Chip8Error::RomTooLarge {
            size: 3585,
            capacity: 3584,
        };
        assert_eq!(
            e.to_string(),
            "rom is 3585 bytes but only 3584 bytes are available"
        );
        let e = Chip8Error::StackOverflow { addr: 0x200 };
        assert_eq!(e.to_string(), "stack overflow at 200");
    }

    #[test]
    fn test_interrupted_is_quit() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::Interrupted, "esc").into();
        assert!(e.is_quit());
    }
}
