use crossterm::{cursor, execute, terminal};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// turn every pixel off
    fn clear(&mut self);

    /// XOR-toggle the pixel at (x, y), wrapping both coordinates; true if
    /// the pixel was on and is now off
    fn set_pixel(&mut self, x: usize, y: usize) -> bool;

    /// flush current pixel state to wherever it is shown
    fn render(&mut self) -> Result<(), io::Error>;
}

// store useful metadata about the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    fn byte_count(&self) -> usize {
        self.pixel_count() / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// Packed 1-bit-per-pixel screen contents, row-major, MSB is leftmost.
/// Shared by every Display so they agree on XOR and wraparound.
pub struct FrameBuffer {
    resolution: Resolution,
    bits: Vec<u8>,
}

impl FrameBuffer {
    /// width must be a non-zero multiple of 8, height non-zero
    pub fn new(width: usize, height: usize) -> Result<Self, io::Error> {
        if width == 0 || width % 8 != 0 || height == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("can't pack a {}x{} frame buffer", width, height),
            ));
        }
        Ok(FrameBuffer::blank(Resolution(width, height)))
    }

    fn blank(resolution: Resolution) -> Self {
        FrameBuffer {
            resolution,
            bits: vec![0; resolution.byte_count()],
        }
    }

    pub fn width(&self) -> usize {
        self.resolution.0
    }

    pub fn height(&self) -> usize {
        self.resolution.1
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = 0);
    }

    fn locate(&self, x: usize, y: usize) -> (usize, u8) {
        let idx = (y % self.height()) * self.width() + (x % self.width());
        (idx / 8, 0x80 >> (idx % 8))
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        let (byte, mask) = self.locate(x, y);
        self.bits[byte] & mask != 0
    }

    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let (byte, mask) = self.locate(x, y);
        let was_set = self.bits[byte] & mask != 0;
        self.bits[byte] ^= mask;
        was_set
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn lit_count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    frame: FrameBuffer,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            frame: FrameBuffer::new(x, y)?,
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = execute!(
            self.terminal.backend_mut(),
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
    }
}

impl Display for MonoTermDisplay {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn render(&mut self) -> Result<(), io::Error> {
        let resolution = self.frame.resolution;
        let data = self.frame.as_bytes();
        // expand each bitplane into x, y float coords, suitable for
        // rendering with TUI. this just prints blocky points for now
        let off: Vec<_> = resolution.bitplane_from_data(data, 0).collect();
        let on: Vec<_> = resolution.bitplane_from_data(data, 1).collect();

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// headless display; keeps the pixels so tests can look at them
pub struct DummyDisplay {
    pub frame: FrameBuffer,
    pub renders: usize,
}

impl DummyDisplay {
    pub fn new(x: usize, y: usize) -> Result<DummyDisplay, io::Error> {
        Ok(DummyDisplay {
            frame: FrameBuffer::new(x, y)?,
            renders: 0,
        })
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.frame.is_set(x, y)
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        DummyDisplay {
            frame: FrameBuffer::blank(Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)),
            renders: 0,
        }
    }
}

impl Display for DummyDisplay {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn render(&mut self) -> Result<(), io::Error> {
        self.renders += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution(64, 32);
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_split_pixels() {
        let r = Resolution(64, 32);
        let mut data = [0u8; 256];
        data[0] = 0x80; // (0, 0)
        data[9] = 0x01; // (15, 1)
        let mut on: Vec<_> = r.bitplane_from_data(&data, 1).collect();
        on.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(on, vec![(0.0, 0.0), (15.0, -1.0)]);
        assert_eq!(r.bitplane_from_data(&data, 0).count(), 2046);
    }

    // FrameBuffer tests
    #[test]
    fn test_toggle_reports_erasure() -> Result<(), io::Error> {
        let mut fb = FrameBuffer::new(64, 32)?;
        assert!(!fb.toggle(3, 4));
        assert!(fb.is_set(3, 4));
        assert!(fb.toggle(3, 4));
        assert!(!fb.is_set(3, 4));
        Ok(())
    }

    #[test]
    fn test_toggle_wraps() -> Result<(), io::Error> {
        let mut fb = FrameBuffer::new(64, 32)?;
        fb.toggle(64 + 2, 32 + 1);
        assert!(fb.is_set(2, 1));
        assert_eq!(fb.lit_count(), 1);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<(), io::Error> {
        let mut fb = FrameBuffer::new(64, 32)?;
        fb.toggle(0, 0);
        fb.toggle(63, 31);
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
        assert!(!fb.toggle(0, 0));
        Ok(())
    }

    #[test]
    fn test_rejects_unpackable_sizes() {
        for (w, h) in [(60, 32), (0, 32), (64, 0)] {
            let err = FrameBuffer::new(w, h).err().map(|e| e.kind());
            assert_eq!(err, Some(io::ErrorKind::InvalidInput), "{}x{}", w, h);
        }
        assert!(DummyDisplay::new(60, 32).is_err());
        assert!(DummyDisplay::new(128, 64).is_ok());
    }

    #[test]
    fn test_dummy_counts_renders() -> Result<(), io::Error> {
        let mut d = DummyDisplay::default();
        d.render()?;
        d.render()?;
        assert_eq!(d.renders, 2);
        Ok(())
    }
}
