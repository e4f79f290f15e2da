//! # chip8-vm
//!
//! ## Design
//!
//! * bit-exact CHIP-8 instruction semantics: every carry, borrow and
//!   shifted-out bit lands in VF exactly as programs expect
//! * the interpreter owns memory, registers and the framebuffer; the keypad
//!   is borrowed from the host
//! * two clocks: instructions run as fast as the host calls `step()`, the
//!   delay/sound timers tick at 60Hz of wallclock time regardless
//! * abstract display and keypad so alternatives can plug in; starting with
//!   a TUI in-console
//! * points where interpreters disagree are explicit quirks, not accidents
//!
//! Model
//!
//! main
//!  |-- config (cli), rom
//!  |-- keypad(keymap), display
//!  |-- interpreter(keypad, quirks)
//!  |    |-- memory (font, stack, program)
//!  |    |-- register file
//!  |    |-- framebuffer
//!  |    `-- instruction set: opcode -> instruction -> execute
//!  `-- scheduler
//!       |-- for each ~16ms frame:
//!       |     refresh input; step() n times; tick timers;
//!       |     redraw if the framebuffer changed
//!       `-- sleep off the rest of the frame
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod register;
pub mod rom;
pub mod scheduler;

pub use config::{Config, Layout, Quirks, ShiftSource};
pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, Flow};
pub use rom::Rom;
pub use scheduler::Scheduler;
