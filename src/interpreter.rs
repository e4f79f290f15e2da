//! # interpreter
//!
//! The machine proper: 4K of memory, the register file, a 64x32 framebuffer
//! and a borrowed keypad. `step()` runs one fetch/decode/execute cycle;
//! `tick_timers()` is the separate 60Hz clock and must be driven by the host
//! at wallclock rate, independent of how many steps it runs.
//!
//! Memory map, stack and flag conventions:
//!  * font glyphs at 0x000, 5 bytes per hex digit
//!  * stack from 0x052 upward, two bytes per return address (high byte
//!    first); SP is an 8 bit register so it tops out at 0xff
//!  * programs load at 0x200 and PC starts there
//!  * VF is written last by the arithmetic, shift and draw instructions, so
//!    it always holds the flag even when VF was also the destination
use crate::config::{Quirks, ShiftSource};
use crate::display::FrameBuffer;
use crate::error::Chip8Error;
use crate::input::KeyPad;
use crate::instruction::{Instruction, Opcode};
use crate::memory::{Chip8Memory, MemoryMap, CHIP8_PROGRAM_ADDR, CHIP8_STACK_ADDR};
use crate::register::RegisterFile;
use crate::rom::Rom;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// what an instruction did to control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// fall through to the next instruction
    Continue,
    /// PC already points where we're going
    Jumped,
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8Memory,
    registers: RegisterFile,
    framebuffer: FrameBuffer,
    keypad: &'a mut dyn KeyPad,
    quirks: Quirks,
    rng: StdRng,
}

impl<'a> Chip8Interpreter<'a> {
    /// a freshly reset machine; `seed` fixes the random number sequence
    pub fn new(keypad: &'a mut dyn KeyPad, quirks: Quirks, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8Memory::new(),
            registers: RegisterFile::new(CHIP8_PROGRAM_ADDR, CHIP8_STACK_ADDR),
            framebuffer: FrameBuffer::default(),
            keypad,
            quirks,
            rng,
        }
    }

    /// back to power-on state; the program image is wiped too
    pub fn reset(&mut self) {
        debug!("reset");
        self.memory = Chip8Memory::new();
        self.registers = RegisterFile::new(CHIP8_PROGRAM_ADDR, CHIP8_STACK_ADDR);
        self.framebuffer = FrameBuffer::default();
    }

    /// load a chip8 program
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_program(program)
    }

    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), Chip8Error> {
        self.load_program(rom.data())
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// true (once) if the host should redraw
    pub fn take_redraw(&mut self) -> bool {
        self.framebuffer.take_dirty()
    }

    /// a tone should be sounding
    pub fn sound_active(&self) -> bool {
        self.registers.sound_timer.get() > 0
    }

    /// let the keypad pump host events between frames
    pub fn refresh_input(&mut self) -> Result<(), Chip8Error> {
        self.keypad.refresh()?;
        Ok(())
    }

    fn pc(&self) -> u16 {
        self.registers.program_counter.get()
    }

    fn fetch(&self) -> Opcode {
        Opcode(self.memory.get_word(self.pc()))
    }

    /// one fetch/decode/execute cycle; returns what was executed
    pub fn step(&mut self) -> Result<Instruction, Chip8Error> {
        let addr = self.pc();
        let opcode = self.fetch();
        let instruction = Instruction::decode(opcode).ok_or(Chip8Error::UnknownOpcode {
            opcode: opcode.0,
            addr,
        })?;
        trace!("{:03x}: {} {}", addr, opcode, instruction);
        if self.execute(instruction)? == Flow::Continue {
            self.registers.program_counter.add(2);
        }
        Ok(instruction)
    }

    /// the 60Hz clock: both timers count down to zero and stop there
    pub fn tick_timers(&mut self) {
        for timer in [
            &mut self.registers.delay_timer,
            &mut self.registers.sound_timer,
        ] {
            if timer.get() > 0 {
                timer.decrement();
            }
        }
    }

    pub fn execute(&mut self, instruction: Instruction) -> Result<Flow, Chip8Error> {
        use Instruction::*;
        let flow = match instruction {
            Cls => {
                self.framebuffer.clear();
                Flow::Continue
            }
            Ret => {
                let addr = self.pop()?;
                self.jump(addr)
            }
            Jp(addr) => self.jump(addr),
            Call(addr) => {
                self.push(self.pc() + 2)?;
                self.jump(addr)
            }
            SeByte(x, nn) => self.skip_if(self.registers.v(x) == nn),
            SneByte(x, nn) => self.skip_if(self.registers.v(x) != nn),
            SeReg(x, y) => self.skip_if(self.registers.v(x) == self.registers.v(y)),
            SneReg(x, y) => self.skip_if(self.registers.v(x) != self.registers.v(y)),
            LdByte(x, nn) => {
                self.registers.set_v(x, nn);
                Flow::Continue
            }
            AddByte(x, nn) => {
                // no carry flag for this one
                self.registers.v[x].add(nn as i32);
                Flow::Continue
            }
            LdReg(x, y) => self.alu_reg(x, y, |_, vy| vy),
            Or(x, y) => self.alu_reg(x, y, |vx, vy| vx | vy),
            And(x, y) => self.alu_reg(x, y, |vx, vy| vx & vy),
            Xor(x, y) => self.alu_reg(x, y, |vx, vy| vx ^ vy),
            AddReg(x, y) => {
                let vy = self.registers.v(y) as i32;
                self.registers.v[x].add(vy);
                let carry = self.registers.v[x].overflowed();
                self.registers.set_flag(carry);
                Flow::Continue
            }
            Sub(x, y) => {
                let vy = self.registers.v(y) as i32;
                self.registers.v[x].add(-vy);
                let borrow = self.registers.v[x].borrowed();
                self.registers.set_flag(!borrow);
                Flow::Continue
            }
            Subn(x, y) => {
                let diff = self.registers.v(y) as i32 - self.registers.v(x) as i32;
                self.registers.v[x].set(diff);
                let borrow = self.registers.v[x].borrowed();
                self.registers.set_flag(!borrow);
                Flow::Continue
            }
            Shr(x, y) => {
                let src = self.shift_source(x, y);
                self.registers.set_v(x, src >> 1);
                self.registers.set_flag(src & 0x01 == 0x01);
                Flow::Continue
            }
            Shl(x, y) => {
                let src = self.shift_source(x, y);
                self.registers.v[x].set((src as i32) << 1);
                let out = self.registers.v[x].overflowed();
                self.registers.set_flag(out);
                Flow::Continue
            }
            LdI(addr) => {
                self.registers.index.set(addr as i32);
                Flow::Continue
            }
            JpV0(addr) => self.jump(self.registers.v(0) as u16 + addr),
            Rnd(x, nn) => {
                let r: u8 = self.rng.gen();
                self.registers.set_v(x, r & nn);
                Flow::Continue
            }
            Drw(x, y, n) => {
                self.draw_sprite(self.registers.v(x), self.registers.v(y), n);
                Flow::Continue
            }
            Skp(x) => {
                let down = self.keypad.is_key_down(self.registers.v(x) & 0x0f)?;
                self.skip_if(down)
            }
            Sknp(x) => {
                let down = self.keypad.is_key_down(self.registers.v(x) & 0x0f)?;
                self.skip_if(!down)
            }
            LdRegDt(x) => {
                let dt = self.registers.delay_timer.get_byte();
                self.registers.set_v(x, dt);
                Flow::Continue
            }
            LdKey(x) => {
                let key = self.keypad.block_until_key_down()?;
                debug!("key {:x} pressed", key);
                self.registers.set_v(x, key);
                Flow::Continue
            }
            LdDtReg(x) => {
                let vx = self.registers.v(x) as i32;
                self.registers.delay_timer.set(vx);
                Flow::Continue
            }
            LdSt(x) => {
                let vx = self.registers.v(x) as i32;
                self.registers.sound_timer.set(vx);
                Flow::Continue
            }
            AddI(x) => {
                let vx = self.registers.v(x) as i32;
                self.registers.index.add(vx);
                Flow::Continue
            }
            LdF(x) => {
                let addr = Chip8Memory::glyph_addr(self.registers.v(x));
                self.registers.index.set(addr as i32);
                Flow::Continue
            }
            LdB(x) => {
                let vx = self.registers.v(x);
                let i = self.registers.index.get();
                self.memory.write(&[vx / 100, (vx / 10) % 10, vx % 10], i);
                Flow::Continue
            }
            StoreRegs(x) => {
                let i = self.registers.index.get();
                for r in 0..=x {
                    self.memory.set(i + r as u16, self.registers.v(r));
                }
                self.bump_index(x);
                Flow::Continue
            }
            LoadRegs(x) => {
                let i = self.registers.index.get();
                for r in 0..=x {
                    let value = self.memory.get(i + r as u16);
                    self.registers.set_v(r, value);
                }
                self.bump_index(x);
                Flow::Continue
            }
        };
        Ok(flow)
    }

    fn jump(&mut self, addr: u16) -> Flow {
        self.registers.program_counter.set(addr as i32);
        Flow::Jumped
    }

    /// skip over the next instruction; the usual advance happens on top
    fn skip_if(&mut self, condition: bool) -> Flow {
        if condition {
            self.registers.program_counter.add(2);
        }
        Flow::Continue
    }

    /// Vx := f(Vx, Vy), flags untouched
    fn alu_reg(&mut self, x: usize, y: usize, f: impl Fn(u8, u8) -> u8) -> Flow {
        let result = f(self.registers.v(x), self.registers.v(y));
        self.registers.set_v(x, result);
        Flow::Continue
    }

    fn shift_source(&self, x: usize, y: usize) -> u8 {
        match self.quirks.shift_source {
            ShiftSource::Vx => self.registers.v(x),
            ShiftSource::Vy => self.registers.v(y),
        }
    }

    fn bump_index(&mut self, x: usize) {
        if self.quirks.load_store_increments_index {
            self.registers.index.add(x as i32 + 1);
        }
    }

    fn push(&mut self, addr: u16) -> Result<(), Chip8Error> {
        let sp = self.registers.stack_pointer.get();
        self.registers.stack_pointer.add(2);
        if self.registers.stack_pointer.overflowed() {
            self.registers.stack_pointer.set(sp as i32);
            return Err(Chip8Error::StackOverflow { addr: self.pc() });
        }
        self.memory.set_word(sp, addr);
        Ok(())
    }

    fn pop(&mut self) -> Result<u16, Chip8Error> {
        if self.registers.stack_pointer.get() < CHIP8_STACK_ADDR + 2 {
            return Err(Chip8Error::StackUnderflow { addr: self.pc() });
        }
        self.registers.stack_pointer.add(-2);
        Ok(self.memory.get_word(self.registers.stack_pointer.get()))
    }

    /// XOR an 8 x n sprite from [I] onto the screen at (vx, vy), wrapping at
    /// the edges. VF ends up 1 if any lit pixel was turned off.
    fn draw_sprite(&mut self, vx: u8, vy: u8, n: u8) {
        let (w, h) = (self.framebuffer.width(), self.framebuffer.height());
        let sprite = self
            .memory
            .get_ro_slice(self.registers.index.get(), n as usize);
        self.registers.set_flag(false);
        let mut collision = false;
        for (j, row) in sprite.iter().enumerate() {
            for i in 0..8 {
                let (px, py) = ((vx as usize + i) % w, (vy as usize + j) % h);
                let color = (*row >> (7 - i)) & 0x01 == 0x01;
                let existing = self.framebuffer.get_pixel(px, py);
                collision |= color && existing;
                self.framebuffer.set_pixel(px, py, existing ^ color);
            }
        }
        if collision {
            self.registers.set_flag(true);
        }
        self.framebuffer.mark_dirty();
    }
}
