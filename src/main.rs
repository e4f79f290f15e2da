extern crate clap;

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use chip8_vm::display::MonoTermDisplay;
use chip8_vm::input::{KeyMap, TermKeyPad};
use chip8_vm::{Chip8Interpreter, Config, Layout, Quirks, Rom, Scheduler, ShiftSource};

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    clap::App::new("chip8-vm")
        .version("0.1")
        .about("CHIP-8 interpreter that runs in the terminal. Esc quits.")
        .arg(
            clap::Arg::with_name("rom")
                .index(1)
                .required(true)
                .help("CHIP-8 program to load at 0x200"),
        )
        .arg(
            clap::Arg::with_name("ips")
                .long("ips")
                .takes_value(true)
                .help("instructions per second (default 700)"),
        )
        .arg(
            clap::Arg::with_name("scale")
                .long("scale")
                .takes_value(true)
                .help("terminal cells per pixel (default 1)"),
        )
        .arg(
            clap::Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("fixed random seed, for reproducible runs"),
        )
        .arg(
            clap::Arg::with_name("layout")
                .long("layout")
                .takes_value(true)
                .possible_values(&["qwerty", "azerty"])
                .help("host keyboard layout (default qwerty)"),
        )
        .arg(
            clap::Arg::with_name("shift-vy")
                .long("shift-vy")
                .help("8xy6/8xyE shift Vy into Vx, as on the COSMAC VIP"),
        )
        .arg(
            clap::Arg::with_name("index-increment")
                .long("index-increment")
                .help("Fx55/Fx65 leave I past the last register"),
        )
        .get_matches()
}

fn parse_arg<T: std::str::FromStr>(
    matches: &clap::ArgMatches,
    name: &str,
) -> Result<Option<T>, Box<dyn Error>> {
    match matches.value_of(name) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format!("bad value '{}' for --{}", v, name).into()),
        None => Ok(None),
    }
}

fn build_config(matches: &clap::ArgMatches) -> Result<Config, Box<dyn Error>> {
    let defaults = Config::default();
    Ok(Config {
        quirks: Quirks {
            shift_source: if matches.is_present("shift-vy") {
                ShiftSource::Vy
            } else {
                ShiftSource::Vx
            },
            load_store_increments_index: matches.is_present("index-increment"),
        },
        layout: parse_arg::<Layout>(matches, "layout")?.unwrap_or(defaults.layout),
        instructions_per_second: parse_arg(matches, "ips")?
            .unwrap_or(defaults.instructions_per_second),
        timer_hz: defaults.timer_hz,
        scale: parse_arg(matches, "scale")?.unwrap_or(defaults.scale),
        seed: parse_arg(matches, "seed")?,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // initialise
    let matches = fetch_config();
    let config = build_config(&matches)?;
    let rom = Rom::from_path(matches.value_of("rom").unwrap_or_default())?;
    info!("loaded {} byte rom, {:?}", rom.len(), config);

    let quit = Arc::new(AtomicBool::new(false));
    let q = quit.clone();
    ctrlc::set_handler(move || q.store(true, Ordering::SeqCst))?;

    let mut input = TermKeyPad::new(KeyMap::new(config.layout), quit.clone())?;
    let mut display = MonoTermDisplay::new(config.scale)?;
    let mut interpreter = Chip8Interpreter::new(&mut input, config.quirks, config.seed);
    interpreter.load_rom(&rom)?;

    let result = Scheduler::new(&config).run(&mut interpreter, &mut display, &quit);
    // put the terminal back before saying anything
    drop(interpreter);
    drop(display);
    drop(input);
    match result {
        Ok(frames) => {
            info!("quit after {} frames", frames);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
