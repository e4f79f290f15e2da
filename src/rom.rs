use crate::error::Chip8Error;
use crate::memory::CHIP8_PROGRAM_CAPACITY;
use log::{debug, trace};
use std::fmt;
use std::fs;
use std::path::Path;

/// A program image, read in full before anything runs so that a bad path or
/// an oversized file is reported up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Chip8Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Chip8Error::NotAFile(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        debug!("read {} bytes from {}", data.len(), path.display());
        let rom = Rom::from_bytes(data)?;
        trace!("rom image: {}", rom);
        Ok(rom)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Chip8Error> {
        if data.len() > CHIP8_PROGRAM_CAPACITY {
            return Err(Chip8Error::RomTooLarge {
                size: data.len(),
                capacity: CHIP8_PROGRAM_CAPACITY,
            });
        }
        Ok(Rom { data })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// hex dump, one opcode-sized word per group
impl fmt::Display for Rom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.data.chunks(2).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            for b in word {
                write!(f, "{:02x}", b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_from_bytes_ok() -> Result<(), Chip8Error> {
        let rom = Rom::from_bytes(vec![0x00, 0xe0, 0x12, 0x00])?;
        assert_eq!(rom.len(), 4);
        assert_eq!(rom.data(), &[0x00, 0xe0, 0x12, 0x00]);
        Ok(())
    }

    #[test]
    fn test_too_large() {
        assert!(matches!(
            Rom::from_bytes(vec![0; 0xe01]),
            Err(Chip8Error::RomTooLarge { .. })
        ));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = env::temp_dir();
        assert!(matches!(Rom::from_path(&dir), Err(Chip8Error::NotAFile(_))));
    }

    #[test]
    fn test_missing_is_not_a_file() {
        let missing = env::temp_dir().join("chip8-vm-no-such-rom.ch8");
        assert!(matches!(
            Rom::from_path(&missing),
            Err(Chip8Error::NotAFile(_))
        ));
    }

    #[test]
    fn test_from_path_reads_file() -> Result<(), Chip8Error> {
        let path = env::temp_dir().join(format!("chip8-vm-rom-{}.ch8", std::process::id()));
        fs::write(&path, [0x60u8, 0x05, 0x12, 0x02])?;
        let rom = Rom::from_path(&path);
        fs::remove_file(&path)?;
        assert_eq!(rom?.data(), &[0x60, 0x05, 0x12, 0x02]);
        Ok(())
    }

    #[test]
    fn test_hex_dump() -> Result<(), Chip8Error> {
        let rom = Rom::from_bytes(vec![0x00, 0xe0, 0xa2])?;
        assert_eq!(rom.to_string(), "00e0 a2");
        Ok(())
    }
}
