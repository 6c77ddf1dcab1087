use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// left-hand side of a qwerty keyboard mapped onto the COSMAC hex keypad
///
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  <-  |Q|W|E|R|
/// |7|8|9|E|  <-  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses (plus autorepeat), never releases, so a
/// key is treated as held for this long after its last press event
const HOLD_WINDOW: Duration = Duration::from_millis(150);

/// reads keypresses
pub trait Input {
    /// is hex key `key` (0x0..=0xf) currently held down
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error>;

    /// the next key to go down, if any; each press is reported once
    fn next_key_press(&mut self) -> Result<Option<u8>, io::Error>;

    /// whether the user asked to leave
    fn wants_exit(&mut self) -> bool {
        false
    }
}

/// Input from the terminal keyboard, via crossterm in raw mode
pub struct StdinInput {
    held_until: [Option<Instant>; 16],
    presses: VecDeque<u8>,
    keymap: HashMap<char, u8>,
    exit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            held_until: [None; 16],
            presses: VecDeque::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            exit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => self.press(mapped_key, Instant::now()),
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => {
                        debug!("escape pressed, requesting exit");
                        self.exit = true;
                    }
                    other => warn!("unknown key event received: {:?}", other),
                },
                _ => debug!("ignoring non-key terminal event"),
            }
        }
        Ok(())
    }

    fn press(&mut self, key: u8, now: Instant) {
        let was_held = self.is_held(key, now);
        self.held_until[key as usize] = Some(now + HOLD_WINDOW);
        // autorepeat shows up as more presses; only the first counts
        if !was_held {
            self.presses.push_back(key);
        }
    }

    fn is_held(&self, key: u8, now: Instant) -> bool {
        matches!(self.held_until[(key & 0x0f) as usize], Some(t) if t > now)
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        self.read_stdin()?;
        Ok(self.is_held(key, Instant::now()))
    }

    fn next_key_press(&mut self) -> Result<Option<u8>, io::Error> {
        self.read_stdin()?;
        Ok(self.presses.pop_front())
    }

    fn wants_exit(&mut self) -> bool {
        if let Err(e) = self.read_stdin() {
            warn!("failed to read keyboard: {}", e);
        }
        self.exit
    }
}

/// dummy Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    held: [bool; 16],
    presses: VecDeque<u8>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for &k in keys {
            input.hold(k);
        }
        input
    }

    /// mark a key as held down
    pub fn hold(&mut self, key: u8) {
        self.held[(key & 0x0f) as usize] = true;
    }

    /// release a held key
    pub fn release(&mut self, key: u8) {
        self.held[(key & 0x0f) as usize] = false;
    }

    /// queue a press for `next_key_press`
    pub fn press(&mut self, key: u8) {
        self.presses.push_back(key & 0x0f);
    }
}

impl Input for DummyInput {
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        Ok(self.held[(key & 0x0f) as usize])
    }

    fn next_key_press(&mut self) -> Result<Option<u8>, io::Error> {
        Ok(self.presses.pop_front())
    }
}
