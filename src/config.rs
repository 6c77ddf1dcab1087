use clap::Parser;
use std::path::PathBuf;

/// CHIP-8 interpreter
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Filepath to the CHIP-8 program that will be executed
    #[arg(index = 1)]
    pub rom: PathBuf,

    /// Instructions executed per cycle
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub speed: u32,

    /// Cycles per second; timers tick once per cycle
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Tone frequency in Hz while the sound timer runs
    #[arg(long, default_value_t = 440)]
    pub tone: u16,

    /// Don't use the PC speaker
    #[arg(short, long)]
    pub mute: bool,

    /// PRNG seed for Cxkk
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    pub frames: Option<u64>,

    /// Make Fx55/Fx65 cover V0 through Vx inclusive
    #[arg(long)]
    pub inclusive_load_store: bool,
}

impl Config {
    /// checks what clap can't express
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fps > 0.0 && self.fps <= 1000.0) {
            return Err(format!("fps must be in (0, 1000], got {}", self.fps));
        }
        if self.speed == 0 {
            return Err("speed must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom: PathBuf::new(),
            speed: 10,
            fps: 60.0,
            tone: 440,
            mute: false,
            seed: None,
            frames: None,
            inclusive_load_store: false,
        }
    }
}
