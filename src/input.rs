use crate::config::Layout;
use bimap::BiHashMap;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// number of keys on the hex keypad
pub const CHIP8_NUM_KEYS: u8 = 16;

/// left-hand side of a qwerty keyboard, laid out like the COSMAC keypad
///   1 2 3 C       1 2 3 4
///   4 5 6 D  <=>  q w e r
///   7 8 9 E       a s d f
///   A 0 B F       z x c v
const CHIP8_QWERTY_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// ditto for azerty
const CHIP8_AZERTY_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('a', 0x04),
    ('z', 0x05),
    ('e', 0x06),
    ('q', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('w', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Two-way map between host keys and the sixteen keypad codes.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: BiHashMap<char, u8>,
}

impl KeyMap {
    pub fn new(layout: Layout) -> Self {
        let table = match layout {
            Layout::Qwerty => &CHIP8_QWERTY_KEYMAP,
            Layout::Azerty => &CHIP8_AZERTY_KEYMAP,
        };
        let mut keys = BiHashMap::new();
        for (host, code) in table.iter() {
            keys.insert(*host, *code);
        }
        KeyMap { keys }
    }

    /// keypad code for a host key
    pub fn code_for(&self, key: char) -> Option<u8> {
        self.keys
            .get_by_left(&key.to_ascii_lowercase())
            .copied()
    }

    /// host key for a keypad code
    pub fn key_for(&self, code: u8) -> Option<char> {
        self.keys.get_by_right(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The hex keypad as seen by the interpreter. State comes live from the host;
/// the interpreter doesn't cache it.
pub trait KeyPad {
    /// is keypad key `code` (0x0-0xF) held right now?
    fn is_key_down(&mut self, code: u8) -> Result<bool, io::Error>;

    /// block until some key goes down and return its code. An
    /// `io::ErrorKind::Interrupted` error means the user asked to quit.
    fn block_until_key_down(&mut self) -> Result<u8, io::Error>;

    /// give the host a chance to pump its events between frames
    fn refresh(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

/// how long a key counts as held after the terminal last reported it;
/// terminals send repeats while a key is held but never a release
const KEY_HOLD: Duration = Duration::from_millis(150);

/// KeyPad reading a raw-mode terminal through crossterm. Esc or ctrl-c
/// raise the shared quit flag.
pub struct TermKeyPad {
    keymap: KeyMap,
    last_pressed: [Option<Instant>; CHIP8_NUM_KEYS as usize],
    quit: Arc<AtomicBool>,
}

impl TermKeyPad {
    pub fn new(keymap: KeyMap, quit: Arc<AtomicBool>) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermKeyPad {
            keymap,
            last_pressed: [None; CHIP8_NUM_KEYS as usize],
            quit,
        })
    }

    fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    /// handle one key event; returns the keypad code if it mapped to one
    fn handle_key(&mut self, evt: KeyEvent) -> Option<u8> {
        match evt.code {
            KeyCode::Esc => {
                self.quit.store(true, Ordering::SeqCst);
                None
            }
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit.store(true, Ordering::SeqCst);
                None
            }
            KeyCode::Char(key) => match self.keymap.code_for(key) {
                Some(code) => {
                    self.last_pressed[code as usize] = Some(Instant::now());
                    Some(code)
                }
                None => {
                    warn!("can't map {:?} to a COSMAC key", key);
                    None
                }
            },
            _ => None,
        }
    }

    /// drain whatever events are waiting, waiting at most `timeout` for the first
    fn read_events(&mut self, timeout: Duration) -> Result<Option<u8>, io::Error> {
        let mut pressed = None;
        let mut wait = timeout;
        while poll(wait)? {
            wait = Duration::from_millis(0);
            if let Event::Key(evt) = read()? {
                if let Some(code) = self.handle_key(evt) {
                    pressed.get_or_insert(code);
                }
            }
        }
        Ok(pressed)
    }

    fn interrupted() -> io::Error {
        io::Error::new(io::ErrorKind::Interrupted, "quit requested")
    }
}

impl Drop for TermKeyPad {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl KeyPad for TermKeyPad {
    fn is_key_down(&mut self, code: u8) -> Result<bool, io::Error> {
        self.read_events(Duration::from_millis(0))?;
        Ok(match self.last_pressed.get(code as usize) {
            Some(Some(at)) => at.elapsed() < KEY_HOLD,
            _ => false,
        })
    }

    fn block_until_key_down(&mut self) -> Result<u8, io::Error> {
        debug!("waiting for a keypress");
        loop {
            if self.quit_requested() {
                return Err(TermKeyPad::interrupted());
            }
            if let Some(code) = self.read_events(Duration::from_millis(50))? {
                return Ok(code);
            }
        }
    }

    fn refresh(&mut self) -> Result<(), io::Error> {
        self.read_events(Duration::from_millis(0))?;
        Ok(())
    }
}

/// dummy KeyPad implementation for testing: a fixed set of held keys plus a
/// queue of presses to hand out to blocking waits
#[derive(Debug, Default)]
pub struct DummyKeyPad {
    down: HashSet<u8>,
    presses: VecDeque<u8>,
}

impl DummyKeyPad {
    pub fn new(down: &[u8]) -> Self {
        DummyKeyPad {
            down: down.iter().copied().collect(),
            presses: VecDeque::new(),
        }
    }

    pub fn press(&mut self, code: u8) {
        self.presses.push_back(code);
    }
}

impl KeyPad for DummyKeyPad {
    fn is_key_down(&mut self, code: u8) -> Result<bool, io::Error> {
        Ok(self.down.contains(&code))
    }

    /// no more queued presses is treated as the user quitting
    fn block_until_key_down(&mut self) -> Result<u8, io::Error> {
        self.presses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Interrupted, "no more key presses"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_is_a_bijection() {
        for layout in [Layout::Qwerty, Layout::Azerty] {
            let map = KeyMap::new(layout);
            assert_eq!(map.len(), 16);
            for code in 0..CHIP8_NUM_KEYS {
                let key = map.key_for(code).expect("every code has a key");
                assert_eq!(map.code_for(key), Some(code));
            }
        }
    }

    #[test]
    fn test_qwerty_layout() {
        let map = KeyMap::new(Layout::Qwerty);
        assert_eq!(map.code_for('x'), Some(0x0));
        assert_eq!(map.code_for('Q'), Some(0x4));
        assert_eq!(map.code_for('v'), Some(0xf));
        assert_eq!(map.code_for('p'), None);
        assert_eq!(map.key_for(0xc), Some('4'));
        assert_eq!(map.key_for(0x10), None);
    }

    #[test]
    fn test_azerty_layout() {
        let map = KeyMap::new(Layout::Azerty);
        assert_eq!(map.code_for('a'), Some(0x4));
        assert_eq!(map.code_for('q'), Some(0x7));
        assert_eq!(map.code_for('w'), Some(0xa));
    }

    #[test]
    fn test_dummy_keypad() -> Result<(), io::Error> {
        let mut k = DummyKeyPad::new(&[0x3, 0xa]);
        assert!(k.is_key_down(0x3)?);
        assert!(!k.is_key_down(0x4)?);
        k.press(0x7);
        assert_eq!(k.block_until_key_down()?, 0x7);
        let e = k.block_until_key_down().unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::Interrupted);
        Ok(())
    }
}
