//! # registers
//!
//! Every register is a counter of some fixed width. Writes wrap into range
//! and leave a flag behind saying which way they wrapped; the flag only
//! describes the most recent write, so read it straight after the write that
//! produced it (typically to copy it into VF).

/// a fixed-width wrapping counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    value: u16,
    width_bits: u32,
    overflowed: bool,
    borrowed: bool,
}

impl Register {
    pub fn new(width_bits: u32, value: u16) -> Self {
        assert!(
            width_bits > 0 && width_bits <= 16,
            "registers are between 1 and 16 bits wide"
        );
        let mut r = Register {
            value: 0,
            width_bits,
            overflowed: false,
            borrowed: false,
        };
        r.set(value as i32);
        r.overflowed = false;
        r
    }

    pub fn get(&self) -> u16 {
        self.value
    }

    /// the low 8 bits, for the byte-wide registers
    pub fn get_byte(&self) -> u8 {
        self.value as u8
    }

    pub fn width_bits(&self) -> u32 {
        self.width_bits
    }

    fn modulus(&self) -> i32 {
        1 << self.width_bits
    }

    /// assign, wrapping into [0, 2^width); flags which way we wrapped
    pub fn set(&mut self, v: i32) {
        self.overflowed = v >= self.modulus();
        self.borrowed = v < 0;
        self.value = v.rem_euclid(self.modulus()) as u16;
    }

    pub fn add(&mut self, delta: i32) {
        self.set(self.value as i32 + delta)
    }

    pub fn increment(&mut self) {
        self.add(1)
    }

    pub fn decrement(&mut self) {
        self.add(-1)
    }

    /// last write was >= 2^width
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// last write was negative
    pub fn borrowed(&self) -> bool {
        self.borrowed
    }
}

/// number of general purpose registers, V0-VF
pub const NUM_GENERAL_REGISTERS: usize = 16;

/// VF doubles as carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// The whole CHIP-8 register set, each register at its declared width.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    pub v: [Register; NUM_GENERAL_REGISTERS],
    pub index: Register,
    pub program_counter: Register,
    pub stack_pointer: Register,
    pub delay_timer: Register,
    pub sound_timer: Register,
}

impl RegisterFile {
    pub fn new(program_counter: u16, stack_pointer: u16) -> Self {
        RegisterFile {
            v: [Register::new(8, 0); NUM_GENERAL_REGISTERS],
            index: Register::new(16, 0),
            program_counter: Register::new(16, program_counter),
            stack_pointer: Register::new(8, stack_pointer),
            delay_timer: Register::new(8, 0),
            sound_timer: Register::new(8, 0),
        }
    }

    /// read Vx
    pub fn v(&self, x: usize) -> u8 {
        self.v[x].get_byte()
    }

    /// write Vx
    pub fn set_v(&mut self, x: usize, value: u8) {
        self.v[x].set(value as i32)
    }

    /// VF := 1 if flag else 0
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER].set(flag as i32)
    }

    pub fn flag(&self) -> u8 {
        self.v(FLAG_REGISTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_in_range_clears_flags() {
        let mut r = Register::new(8, 0);
        r.set(300);
        r.set(200);
        assert_eq!(r.get(), 200);
        assert!(!r.overflowed());
        assert!(!r.borrowed());
    }

    #[test]
    fn test_set_overflow_wraps_down() {
        let mut r = Register::new(8, 0);
        r.set(260);
        assert_eq!(r.get(), 4);
        assert!(r.overflowed());
        assert!(!r.borrowed());
    }

    #[test]
    fn test_set_negative_wraps_up() {
        let mut r = Register::new(8, 0);
        r.set(-1);
        assert_eq!(r.get(), 0xff);
        assert!(r.borrowed());
        assert!(!r.overflowed());
    }

    #[test]
    fn test_exact_modulus_overflows() {
        let mut r = Register::new(8, 0xff);
        r.increment();
        assert_eq!(r.get(), 0);
        assert!(r.overflowed());
    }

    #[test]
    fn test_decrement_from_zero_borrows() {
        let mut r = Register::new(16, 0);
        r.decrement();
        assert_eq!(r.get(), 0xffff);
        assert!(r.borrowed());
    }

    #[test]
    fn test_flags_only_describe_last_write() {
        let mut r = Register::new(8, 250);
        r.add(10);
        assert!(r.overflowed());
        r.add(1);
        assert!(!r.overflowed());
        assert_eq!(r.get(), 5);
    }

    #[test]
    fn test_value_always_in_range() {
        // walk a bunch of widths and deltas; value must stay inside the width
        for width in [1, 4, 8, 12, 16] {
            let mut r = Register::new(width, 0);
            let modulus = 1i32 << width;
            let mut expected: i32 = 0;
            for delta in [7, -300, 65535, -1, 1, 129, -70000, 3] {
                let raw = expected + delta;
                r.add(delta);
                expected = raw.rem_euclid(modulus);
                assert_eq!(r.get() as i32, expected);
                assert_eq!(r.overflowed(), raw >= modulus);
                assert_eq!(r.borrowed(), raw < 0);
            }
        }
    }

    #[test]
    fn test_new_wraps_initial_value_without_flag() {
        let r = Register::new(8, 0x1ff);
        assert_eq!(r.get(), 0xff);
        assert!(!r.overflowed());
    }

    #[test]
    #[should_panic]
    fn test_too_wide_register_panics() {
        let _ = Register::new(17, 0);
    }

    #[test]
    fn test_register_file_widths() {
        let rf = RegisterFile::new(0x200, 0x52);
        assert!(rf.v.iter().all(|r| r.width_bits() == 8 && r.get() == 0));
        assert_eq!(rf.index.width_bits(), 16);
        assert_eq!(rf.program_counter.width_bits(), 16);
        assert_eq!(rf.program_counter.get(), 0x200);
        assert_eq!(rf.stack_pointer.width_bits(), 8);
        assert_eq!(rf.stack_pointer.get(), 0x52);
        assert_eq!(rf.delay_timer.width_bits(), 8);
        assert_eq!(rf.sound_timer.width_bits(), 8);
    }

    #[test]
    fn test_set_flag() {
        let mut rf = RegisterFile::new(0x200, 0x52);
        rf.set_flag(true);
        assert_eq!(rf.v(FLAG_REGISTER), 1);
        rf.set_flag(false);
        assert_eq!(rf.flag(), 0);
    }
}
