//! # instruction set
//!
//! Decoding is two levels deep: the top nibble picks a group, and groups
//! 0, 8, E and F look at a second field (low nibble for 0 and 8, low byte for
//! E and F) to pick the instruction. The set is closed, so it's all one match.
use std::fmt;

/// A raw 16-bit instruction word with accessors for the usual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Opcode(((hi as u16) << 8) | lo as u16)
    }

    /// top nibble; selects the group
    pub fn group(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Every instruction the machine understands. `x`/`y` are register numbers,
/// addresses are 12 bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SeByte(usize, u8),
    /// 4xnn
    SneByte(usize, u8),
    /// 5xy0
    SeReg(usize, usize),
    /// 6xnn
    LdByte(usize, u8),
    /// 7xnn
    AddByte(usize, u8),
    /// 8xy0
    LdReg(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    AddReg(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    Shr(usize, usize),
    /// 8xy7
    Subn(usize, usize),
    /// 8xyE
    Shl(usize, usize),
    /// 9xy0
    SneReg(usize, usize),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxnn
    Rnd(usize, u8),
    /// Dxyn
    Drw(usize, usize, u8),
    /// Ex9E
    Skp(usize),
    /// ExA1
    Sknp(usize),
    /// Fx07
    LdRegDt(usize),
    /// Fx0A
    LdKey(usize),
    /// Fx15
    LdDtReg(usize),
    /// Fx18
    LdSt(usize),
    /// Fx1E
    AddI(usize),
    /// Fx29
    LdF(usize),
    /// Fx33
    LdB(usize),
    /// Fx55
    StoreRegs(usize),
    /// Fx65
    LoadRegs(usize),
}

impl Instruction {
    /// `None` if nothing handles this opcode
    pub fn decode(op: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let (x, y) = (op.x(), op.y());
        Some(match op.group() {
            0x0 => return Self::decode_system(op),
            0x1 => Jp(op.nnn()),
            0x2 => Call(op.nnn()),
            0x3 => SeByte(x, op.nn()),
            0x4 => SneByte(x, op.nn()),
            0x5 => SeReg(x, y),
            0x6 => LdByte(x, op.nn()),
            0x7 => AddByte(x, op.nn()),
            0x8 => return Self::decode_alu(op),
            0x9 => SneReg(x, y),
            0xA => LdI(op.nnn()),
            0xB => JpV0(op.nnn()),
            0xC => Rnd(x, op.nn()),
            0xD => Drw(x, y, op.n()),
            0xE => return Self::decode_keys(op),
            0xF => return Self::decode_misc(op),
            _ => unreachable!("a nibble only has 16 values"),
        })
    }

    fn decode_system(op: Opcode) -> Option<Instruction> {
        // only 00E0 and 00EE; 0nnn machine code calls aren't supported
        match op.0 {
            0x00E0 => Some(Instruction::Cls),
            0x00EE => Some(Instruction::Ret),
            _ => None,
        }
    }

    fn decode_alu(op: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let (x, y) = (op.x(), op.y());
        match op.n() {
            0x0 => Some(LdReg(x, y)),
            0x1 => Some(Or(x, y)),
            0x2 => Some(And(x, y)),
            0x3 => Some(Xor(x, y)),
            0x4 => Some(AddReg(x, y)),
            0x5 => Some(Sub(x, y)),
            0x6 => Some(Shr(x, y)),
            0x7 => Some(Subn(x, y)),
            0xE => Some(Shl(x, y)),
            _ => None,
        }
    }

    fn decode_keys(op: Opcode) -> Option<Instruction> {
        match op.nn() {
            0x9E => Some(Instruction::Skp(op.x())),
            0xA1 => Some(Instruction::Sknp(op.x())),
            _ => None,
        }
    }

    fn decode_misc(op: Opcode) -> Option<Instruction> {
        use Instruction::*;
        let x = op.x();
        match op.nn() {
            0x07 => Some(LdRegDt(x)),
            0x0A => Some(LdKey(x)),
            0x15 => Some(LdDtReg(x)),
            0x18 => Some(LdSt(x)),
            0x1E => Some(AddI(x)),
            0x29 => Some(LdF(x)),
            0x33 => Some(LdB(x)),
            0x55 => Some(StoreRegs(x)),
            0x65 => Some(LoadRegs(x)),
            _ => None,
        }
    }
}

/// conventional assembler mnemonics, for trace output
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP {:03x}", a),
            Call(a) => write!(f, "CALL {:03x}", a),
            SeByte(x, nn) => write!(f, "SE V{:X}, {:02x}", x, nn),
            SneByte(x, nn) => write!(f, "SNE V{:X}, {:02x}", x, nn),
            SeReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte(x, nn) => write!(f, "LD V{:X}, {:02x}", x, nn),
            AddByte(x, nn) => write!(f, "ADD V{:X}, {:02x}", x, nn),
            LdReg(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI(a) => write!(f, "LD I, {:03x}", a),
            JpV0(a) => write!(f, "JP V0, {:03x}", a),
            Rnd(x, nn) => write!(f, "RND V{:X}, {:02x}", x, nn),
            Drw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {:x}", x, y, n),
            Skp(x) => write!(f, "SKP V{:X}", x),
            Sknp(x) => write!(f, "SKNP V{:X}", x),
            LdRegDt(x) => write!(f, "LD V{:X}, DT", x),
            LdKey(x) => write!(f, "LD V{:X}, K", x),
            LdDtReg(x) => write!(f, "LD DT, V{:X}", x),
            LdSt(x) => write!(f, "LD ST, V{:X}", x),
            AddI(x) => write!(f, "ADD I, V{:X}", x),
            LdF(x) => write!(f, "LD F, V{:X}", x),
            LdB(x) => write!(f, "LD B, V{:X}", x),
            StoreRegs(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegs(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_fields() {
        let op = Opcode(0xD7B3);
        assert_eq!(op.group(), 0xD);
        assert_eq!(op.x(), 0x7);
        assert_eq!(op.y(), 0xB);
        assert_eq!(op.n(), 0x3);
        assert_eq!(op.nn(), 0xB3);
        assert_eq!(op.nnn(), 0x7B3);
        assert_eq!(Opcode::from_bytes(0xD7, 0xB3), op);
    }

    #[test]
    fn test_opcode_translation() {
        let cases = [
            (0x00E0, Cls),
            (0x00EE, Ret),
            (0x1234, Jp(0x234)),
            (0x2456, Call(0x456)),
            (0x342A, SeByte(4, 0x2A)),
            (0x4A75, SneByte(0xA, 0x75)),
            (0x5AE0, SeReg(0xA, 0xE)),
            (0x63F5, LdByte(3, 0xF5)),
            (0x7B12, AddByte(0xB, 0x12)),
            (0x8590, LdReg(5, 9)),
            (0x8101, Or(1, 0)),
            (0x8642, And(6, 4)),
            (0x87F3, Xor(7, 0xF)),
            (0x8264, AddReg(2, 6)),
            (0x8C45, Sub(0xC, 4)),
            (0x8136, Shr(1, 3)),
            (0x86D7, Subn(6, 0xD)),
            (0x8E2E, Shl(0xE, 2)),
            (0x9990, SneReg(9, 9)),
            (0xA568, LdI(0x568)),
            (0xBABC, JpV0(0xABC)),
            (0xC5AF, Rnd(5, 0xAF)),
            (0xD7B0, Drw(7, 0xB, 0)),
            (0xE49E, Skp(4)),
            (0xECA1, Sknp(0xC)),
            (0xF907, LdRegDt(9)),
            (0xFD0A, LdKey(0xD)),
            (0xF315, LdDtReg(3)),
            (0xF718, LdSt(7)),
            (0xF91E, AddI(9)),
            (0xFF29, LdF(0xF)),
            (0xF533, LdB(5)),
            (0xF655, StoreRegs(6)),
            (0xF865, LoadRegs(8)),
        ];
        for (opcode, instr) in cases {
            assert_eq!(Instruction::decode(Opcode(opcode)), Some(instr), "{:04x}", opcode);
        }
    }

    #[test]
    fn test_unknown_opcodes() {
        for opcode in [
            0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0xE09F, 0xE0A2, 0xF000, 0xF030, 0xF075,
        ] {
            assert_eq!(Instruction::decode(Opcode(opcode)), None, "{:04x}", opcode);
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Drw(1, 2, 5).to_string(), "DRW V1, V2, 5");
        assert_eq!(LdI(0x2ea).to_string(), "LD I, 2ea");
        assert_eq!(StoreRegs(0xf).to_string(), "LD [I], VF");
    }
}
