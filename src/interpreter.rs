//! # interpreter
//!
//! Owns every bit of machine state (memory, V0-VF, I, PC, call stack, the
//! two timers) and borrows the display, input and sound devices for as long
//! as it lives. The host calls `step_cycle()` once per frame (nominally 60Hz):
//!
//!  1. run up to `speed` instructions, unless waiting for a key
//!  2. tick both timers, unless waiting for a key
//!  3. start/stop the tone to match the sound timer
//!  4. render the display
//!
//! Fx0A doesn't block: it parks the interpreter in `ExecState::AwaitingKey`
//! and later cycles do nothing but render until a key turns up, either from
//! `press_key()` or from the input device at the start of a cycle.
//!
//! Any error is fatal. The interpreter moves to `ExecState::Halted` and
//! refuses to run again; build a new one.
use crate::config::Config;
use crate::error::{Chip8Error, Result};
use crate::instruction::{Instruction, Reg, VF};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::{display, input, sound};
use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spin_sleep::LoopHelper;
use std::io;

/// how many return addresses fit on the call stack
pub const CHIP8_STACK_DEPTH: usize = 16;

/// what the fetch/decode/execute engine is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// Fx0A: the next key pressed goes into this register
    AwaitingKey(Reg),
    /// a fatal error happened
    Halted,
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    display: &'a mut dyn display::Display,
    input: &'a mut dyn input::Input,
    sound: &'a mut dyn sound::Sound,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    sound_timer: u8,
    state: ExecState,
    speed: u32,
    fps: f64,
    tone: u16,
    inclusive_load_store: bool,
    rng: StdRng,
    tone_failed: bool,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut impl display::Display,
        input: &'a mut impl input::Input,
        sound: &'a mut impl sound::Sound,
    ) -> Chip8Interpreter<'a> {
        Chip8Interpreter::with_config(display, input, sound, &Config::default())
    }

    pub fn with_config(
        display: &'a mut impl display::Display,
        input: &'a mut impl input::Input,
        sound: &'a mut impl sound::Sound,
        config: &Config,
    ) -> Chip8Interpreter<'a> {
        let memory = Chip8MemoryMap::new();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            program_counter: memory.program_addr,
            memory,
            display,
            input,
            sound,
            v: [0; 16],
            i: 0,
            stack: Vec::with_capacity(CHIP8_STACK_DEPTH),
            delay_timer: 0,
            sound_timer: 0,
            state: ExecState::Running,
            speed: config.speed.max(1),
            fps: config.fps,
            tone: config.tone,
            inclusive_load_store: config.inclusive_load_store,
            rng,
            tone_failed: false,
        }
    }

    /// copy a program image into memory at 0x200
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load(program)
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program(reader)
    }

    /// one frame's worth of work; see the module docs
    pub fn step_cycle(&mut self) -> Result<()> {
        let res = self.run_cycle();
        self.guard(res)
    }

    /// fetch, decode and execute a single instruction; does nothing while
    /// waiting for a key
    pub fn step(&mut self) -> Result<()> {
        let res = match self.state {
            ExecState::Halted => return Err(Chip8Error::Halted),
            ExecState::AwaitingKey(_) => Ok(()),
            ExecState::Running => self.execute_next(),
        };
        self.guard(res)
    }

    /// count both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// report a key going down; finishes an Fx0A wait. Returns whether
    /// anything was waiting for it. Keys past 0xf are ignored.
    pub fn press_key(&mut self, key: u8) -> bool {
        if key > 0xf {
            warn!("ignoring press of non-existent key 0x{:02x}", key);
            return false;
        }
        match self.state {
            ExecState::AwaitingKey(x) => {
                debug!("key 0x{:x} -> V{:X}, resuming", key, x);
                self.v[x] = key;
                self.state = ExecState::Running;
                true
            }
            _ => false,
        }
    }

    /// run cycles at the configured rate until `frames` cycles have run
    /// (forever if None) or the input asks to leave; returns cycles run
    pub fn main_loop(&mut self, frames: Option<u64>) -> Result<u64> {
        let mut loop_helper = LoopHelper::builder()
            .report_interval_s(5.0)
            .build_with_target_rate(self.fps);
        let mut count = 0;
        info!("running at {} cycles/s, {} instructions/cycle", self.fps, self.speed);
        while frames.map_or(true, |f| count < f) {
            if self.input.wants_exit() {
                info!("exit requested after {} cycles", count);
                break;
            }
            loop_helper.loop_start();
            self.step_cycle()?;
            count += 1;
            if let Some(rate) = loop_helper.report_rate() {
                debug!("actual rate {:.1} cycles/s", rate);
            }
            loop_helper.loop_sleep();
        }
        Ok(count)
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, ExecState::AwaitingKey(_))
    }

    pub fn pc(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn register(&self, r: Reg) -> u8 {
        self.v[r & 0xf]
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// whether the tone sink is sounding
    pub fn is_beeping(&self) -> bool {
        self.sound.is_playing()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    fn run_cycle(&mut self) -> Result<()> {
        match self.state {
            ExecState::Halted => return Err(Chip8Error::Halted),
            ExecState::AwaitingKey(_) => {
                if let Some(key) = self.input.next_key_press()? {
                    self.press_key(key);
                }
            }
            ExecState::Running => (),
        }

        for _ in 0..self.speed {
            if self.state != ExecState::Running {
                break;
            }
            self.execute_next()?;
        }

        if self.state == ExecState::Running {
            self.tick_timers();
        }

        self.update_sound();
        self.display.render()?;
        Ok(())
    }

    /// a broken tone sink only costs the sound; it is not tried again
    fn update_sound(&mut self) {
        if self.tone_failed {
            return;
        }
        let res = if self.sound_timer > 0 {
            self.sound.play(self.tone)
        } else {
            self.sound.stop()
        };
        if let Err(e) = res {
            warn!("tone sink failed, carrying on silently: {}", e);
            self.tone_failed = true;
        }
    }

    fn guard(&mut self, res: Result<()>) -> Result<()> {
        if let Err(e) = &res {
            if self.state != ExecState::Halted {
                error!("halting at pc 0x{:03x}: {}", self.program_counter, e);
                self.state = ExecState::Halted;
            }
        }
        res
    }

    fn execute_next(&mut self) -> Result<()> {
        let word = self.memory.get_word(self.program_counter)?;
        let inst = Instruction::decode(word)?;
        trace!("{:03x}: {:04x} {:?}", self.program_counter, word, inst);
        self.program_counter = self.program_counter.wrapping_add(2);
        self.execute(inst)
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    /// how many registers Fx55/Fx65 move
    fn load_store_count(&self, x: Reg) -> usize {
        if self.inclusive_load_store {
            x + 1
        } else {
            x
        }
    }

    fn execute(&mut self, inst: Instruction) -> Result<()> {
        use Instruction::*;

        match inst {
            Sys(nnn) => debug!("ignoring SYS 0x{:03x}", nnn),
            ClearScreen => self.display.clear(),
            Return => {
                self.program_counter = self.stack.pop().ok_or(Chip8Error::StackUnderflow)?;
                debug!("return to 0x{:03x}, depth {}", self.program_counter, self.stack.len());
            }
            Jump(nnn) => self.program_counter = nnn,
            Call(nnn) => {
                if self.stack.len() >= CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow {
                        depth: self.stack.len(),
                    });
                }
                self.stack.push(self.program_counter);
                self.program_counter = nnn;
                debug!("call 0x{:03x}, depth {}", nnn, self.stack.len());
            }
            SkipEqImm { x, kk } => self.skip_if(self.v[x] == kk),
            SkipNeImm { x, kk } => self.skip_if(self.v[x] != kk),
            SkipEqReg { x, y } => self.skip_if(self.v[x] == self.v[y]),
            SkipNeReg { x, y } => self.skip_if(self.v[x] != self.v[y]),
            LoadImm { x, kk } => self.v[x] = kk,
            AddImm { x, kk } => self.v[x] = self.v[x].wrapping_add(kk),
            Move { x, y } => self.v[x] = self.v[y],
            Or { x, y } => self.v[x] |= self.v[y],
            And { x, y } => self.v[x] &= self.v[y],
            Xor { x, y } => self.v[x] ^= self.v[y],
            // flag first, then the result; if x is VF the result wins
            AddReg { x, y } => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[VF] = carry as u8;
                self.v[x] = sum;
            }
            SubReg { x, y } => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[VF] = (vx > vy) as u8;
                self.v[x] = vx.wrapping_sub(vy);
            }
            ShiftRight { x, .. } => {
                let vx = self.v[x];
                self.v[VF] = vx & 0x01;
                self.v[x] = vx >> 1;
            }
            SubRegInv { x, y } => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[VF] = (vy > vx) as u8;
                self.v[x] = vy.wrapping_sub(vx);
            }
            ShiftLeft { x, .. } => {
                let vx = self.v[x];
                self.v[VF] = vx >> 7;
                self.v[x] = vx << 1;
            }
            LoadIndex(nnn) => self.i = nnn,
            JumpV0(nnn) => self.program_counter = nnn + self.v[0] as u16,
            Random { x, kk } => self.v[x] = self.rng.gen::<u8>() & kk,
            Draw { x, y, n } => {
                let (ox, oy) = (self.v[x] as usize, self.v[y] as usize);
                let sprite = self.memory.get_ro_slice(self.i, n as usize)?;
                let mut collision = false;
                for (row, bits) in sprite.iter().enumerate() {
                    for col in 0..8 {
                        if bits & (0x80 >> col) != 0 {
                            collision |= self.display.set_pixel(ox + col, oy + row);
                        }
                    }
                }
                self.v[VF] = collision as u8;
            }
            SkipKeyPressed { x } => {
                let key = self.v[x];
                let held = key <= 0xf && self.input.is_pressed(key)?;
                self.skip_if(held);
            }
            SkipKeyNotPressed { x } => {
                let key = self.v[x];
                let held = key <= 0xf && self.input.is_pressed(key)?;
                self.skip_if(!held);
            }
            LoadDelay { x } => self.v[x] = self.delay_timer,
            WaitKey { x } => {
                // presses from before the wait don't count
                while self.input.next_key_press()?.is_some() {}
                debug!("waiting for a key for V{:X}", x);
                self.state = ExecState::AwaitingKey(x);
            }
            SetDelay { x } => self.delay_timer = self.v[x],
            SetSound { x } => self.sound_timer = self.v[x],
            AddIndex { x } => self.i = self.i.wrapping_add(self.v[x] as u16),
            LoadGlyph { x } => self.i = self.memory.glyph_addr(self.v[x]),
            StoreBcd { x } => {
                let vx = self.v[x];
                self.memory.write(&[vx / 100, (vx % 100) / 10, vx % 10], self.i)?;
            }
            StoreRegs { x } => {
                let count = self.load_store_count(x);
                self.memory.write(&self.v[..count], self.i)?;
            }
            LoadRegs { x } => {
                let count = self.load_store_count(x);
                let data = self.memory.get_ro_slice(self.i, count)?;
                self.v[..count].copy_from_slice(data);
            }
        }
        Ok(())
    }
}
