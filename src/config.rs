use std::time::Duration;

/// Which register the shift instructions (8xy6, 8xyE) read from. The COSMAC
/// interpreter shifted Vy into Vx; most later interpreters shift Vx in place,
/// and real programs depend on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSource {
    Vx,
    Vy,
}

/// Points where CHIP-8 implementations disagree. Keep these explicit so a
/// program's expectations can be matched rather than guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    pub shift_source: ShiftSource,
    /// Fx55/Fx65 leave I pointing past the last register transferred
    pub load_store_increments_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            shift_source: ShiftSource::Vx,
            load_store_increments_index: false,
        }
    }
}

/// host keyboard layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Qwerty,
    Azerty,
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qwerty" => Ok(Layout::Qwerty),
            "azerty" => Ok(Layout::Azerty),
            other => Err(format!("unknown keyboard layout '{}'", other)),
        }
    }
}

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const DEFAULT_TIMER_HZ: u32 = 60;

/// Everything a run can be configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    pub layout: Layout,
    pub instructions_per_second: u32,
    pub timer_hz: u32,
    /// terminal cells per CHIP-8 pixel, each way
    pub scale: usize,
    /// fixed seed for Cxnn, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            layout: Layout::Qwerty,
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            timer_hz: DEFAULT_TIMER_HZ,
            scale: 1,
            seed: None,
        }
    }
}

impl Config {
    /// instructions to run between timer ticks; always at least one
    pub fn instructions_per_tick(&self) -> u32 {
        (self.instructions_per_second / self.timer_hz.max(1)).max(1)
    }

    /// wallclock length of one timer tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.timer_hz.max(1) as u64)
    }
}
