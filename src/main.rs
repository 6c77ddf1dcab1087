use std::error::Error;
use std::fs::File;

use chip8::config::Config;
use chip8::display::{MonoTermDisplay, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use chip8::input::StdinInput;
use chip8::interpreter::Chip8Interpreter;
use chip8::sound::{Mute, SimpleBeep, Sound};
use clap::Parser;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = Config::parse();
    config.validate()?;

    // load the program before the terminal goes raw so errors print cleanly
    let mut f = File::open(&config.rom)?;

    if config.mute {
        run(&config, &mut f, &mut Mute::new())
    } else {
        run(&config, &mut f, &mut SimpleBeep::new())
    }
}

fn run(config: &Config, rom: &mut File, sound: &mut impl Sound) -> Result<(), Box<dyn Error>> {
    let mut display = MonoTermDisplay::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)?;
    let mut input = StdinInput::new()?;
    let mut interpreter = Chip8Interpreter::with_config(&mut display, &mut input, sound, config);

    interpreter.load_program(rom)?;
    info!("starting {}", config.rom.display());
    let cycles = interpreter.main_loop(config.frames);
    // stop the tone whatever happened
    let _ = sound.stop();
    info!("ran {:?} cycles", cycles);
    cycles?;
    Ok(())
}
