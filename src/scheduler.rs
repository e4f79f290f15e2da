use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::interpreter::Chip8Interpreter;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Drives the two clocks. Each frame is one timer tick long: run a batch of
/// instructions as fast as they go, tick the timers once, redraw if the
/// picture changed, then sleep off the rest of the tick. So wallclock timing
/// looks right even though instructions inside a frame run in a burst.
#[derive(Debug, Clone)]
pub struct Scheduler {
    instructions_per_tick: u32,
    tick_duration: Duration,
}

impl Scheduler {
    pub fn new(config: &Config) -> Self {
        Scheduler {
            instructions_per_tick: config.instructions_per_tick(),
            tick_duration: config.tick_duration(),
        }
    }

    pub fn instructions_per_tick(&self) -> u32 {
        self.instructions_per_tick
    }

    /// one tick's worth of work, without the sleep
    pub fn run_frame(
        &self,
        interpreter: &mut Chip8Interpreter,
        display: &mut dyn Display,
    ) -> Result<(), Chip8Error> {
        interpreter.refresh_input()?;
        for _ in 0..self.instructions_per_tick {
            interpreter.step()?;
        }
        interpreter.tick_timers();
        if interpreter.take_redraw() {
            display.draw(interpreter.framebuffer())?;
        }
        Ok(())
    }

    /// run frames until `quit` is raised or the user quits from the keypad;
    /// returns how many whole frames ran
    pub fn run(
        &self,
        interpreter: &mut Chip8Interpreter,
        display: &mut dyn Display,
        quit: &AtomicBool,
    ) -> Result<u64, Chip8Error> {
        let mut frames = 0;
        while !quit.load(Ordering::SeqCst) {
            let start = Instant::now();
            match self.run_frame(interpreter, display) {
                Err(e) if e.is_quit() => break,
                r => r?,
            }
            frames += 1;
            if let Some(rest) = self.tick_duration.checked_sub(start.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
        debug!("stopped after {} frames", frames);
        Ok(frames)
    }
}
