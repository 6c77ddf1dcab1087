//!
//! ## Design
//!
//! * a plain CHIP-8 interpreter: 35 instructions, 4K RAM, 64x32 mono display
//! * one owned interpreter struct; no statics
//! * instructions decode into a closed enum before they run, so a decoded
//!   instruction can always execute
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//! * the host drives time: one `step_cycle()` per frame, several
//!   instructions per cycle, timers tick once per cycle
//!
//! Model
//!
//! ```text
//! main
//!  |-- config (clap)
//!  |-- display, input, sound
//!  |-- interpreter(display, input, sound, config)
//!  |    |-- memory map (font at 0x000, program at 0x200)
//!  |    `-- instruction decoder
//!  `-- interpreter.main_loop()
//!       |-- input.wants_exit()?
//!       |-- interpreter.step_cycle()
//!       |     |-- (awaiting key?) input.next_key_press()
//!       |     |-- `speed` x fetch/decode/execute
//!       |     |-- tick timers
//!       |     |-- sound.play()/stop()
//!       |     `-- display.render()
//!       `-- sleep until next frame
//! ```
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod sound;

pub use error::{Chip8Error, Result};
pub use interpreter::{Chip8Interpreter, ExecState};
