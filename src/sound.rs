use beep::beep;
use log::debug;
use std::error::Error;

/// Makes the buzzer noise while the sound timer runs. Both calls are
/// idempotent: playing while playing, or stopping while stopped, does nothing.
pub trait Sound {
    fn play(&mut self, frequency: u16) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_playing(&self) -> bool;
}

/// PC speaker tone, via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn play(&mut self, frequency: u16) -> Result<(), Box<dyn Error>> {
        if !self.is_beeping {
            debug!("beep on at {}Hz", frequency);
            beep(frequency)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            debug!("beep off");
            beep(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.is_beeping
    }
}

/// silence, but remembers what it was asked to do
#[derive(Default)]
pub struct Mute {
    playing: Option<u16>,
    pub starts: usize,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }

    /// frequency of the tone that would be sounding
    pub fn frequency(&self) -> Option<u16> {
        self.playing
    }
}

impl Sound for Mute {
    fn play(&mut self, frequency: u16) -> Result<(), Box<dyn Error>> {
        if self.playing.is_none() {
            self.playing = Some(frequency);
            self.starts += 1;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.playing = None;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_play_is_idempotent() -> Result<(), Box<dyn Error>> {
        let mut m = Mute::new();
        m.play(440)?;
        m.play(440)?;
        assert!(m.is_playing());
        assert_eq!(m.starts, 1);
        assert_eq!(m.frequency(), Some(440));
        Ok(())
    }

    #[test]
    fn test_mute_stop_is_idempotent() -> Result<(), Box<dyn Error>> {
        let mut m = Mute::new();
        m.stop()?;
        assert!(!m.is_playing());
        m.play(440)?;
        m.stop()?;
        m.stop()?;
        assert!(!m.is_playing());
        m.play(440)?;
        assert_eq!(m.starts, 2);
        Ok(())
    }

    #[test]
    fn test_simplebeep_stop_when_silent_is_noop() -> Result<(), Box<dyn Error>> {
        // never touches the speaker because it was never started
        let mut b = SimpleBeep::new();
        b.stop()?;
        assert!(!b.is_playing());
        Ok(())
    }
}
