use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::{Backend, CrosstermBackend};
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// The machine's monochrome screen: a row-major grid of on/off pixels.
///
/// Coordinates must already be in range; the sprite routine wraps them before
/// they get here. The dirty flag is raised by whoever changes the picture and
/// lowered by the host once it has redrawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![false; width * height],
            dirty: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} framebuffer",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[self.offset(x, y)]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        let o = self.offset(x, y);
        self.pixels[o] = value;
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
        self.dirty = true;
    }

    /// ask the host to redraw
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// true (once) if the picture changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// all pixels, row-major
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)
    }
}

/// Display is used by the host to put the framebuffer on some screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw the whole framebuffer
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the terminal: width, height, scale
struct Resolution(usize, usize, usize);

impl Resolution {
    fn scaled_width(&self) -> usize {
        self.0 * self.2
    }

    fn scaled_height(&self) -> usize {
        self.1 * self.2
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.scaled_width() - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.scaled_height() - 1) as f64, 0.0]
    }

    /// canvas points for every pixel that is `lit`, each blown up to
    /// scale x scale points
    fn bitplane_from_frame<'a>(
        &self,
        frame: &'a FrameBuffer,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = frame.width();
        let scale = self.2;
        frame
            .pixels()
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == lit)
            .flat_map(move |(i, _)| {
                let (x, y) = ((i % w) * scale, (i / w) * scale);
                (0..scale * scale).map(move |s| {
                    (
                        (x + s % scale) as f64,        // x
                        -1.0 * (y + s / scale) as f64, // y
                    )
                })
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    scale: usize,
}

impl MonoTermDisplay {
    pub fn new(scale: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            scale: scale.max(1),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        draw_canvas(&mut self.terminal, frame, self.scale)
    }
}

/// render `frame` on any tui backend. One terminal cell per scaled pixel,
/// plus the border; whatever doesn't fit in the terminal is cut off.
fn draw_canvas<B: Backend>(
    terminal: &mut Terminal<B>,
    frame: &FrameBuffer,
    scale: usize,
) -> Result<(), io::Error> {
    let resolution = Resolution(frame.width(), frame.height(), scale);
    let on = resolution.bitplane_from_frame(frame, true).collect::<Vec<_>>();
    let off = resolution.bitplane_from_frame(frame, false).collect::<Vec<_>>();

    terminal.draw(|f| {
        let wanted = Rect::new(
            0,
            0,
            2 + resolution.scaled_width() as u16,
            2 + resolution.scaled_height() as u16,
        );
        let size = wanted.intersection(f.size());

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

/// useful for testing non-display routines; counts what it was asked to draw
#[derive(Debug, Default)]
pub struct NullDisplay {
    pub frames_drawn: usize,
    pub last_lit: usize,
}

impl NullDisplay {
    pub fn new() -> Self {
        NullDisplay::default()
    }
}

impl Display for NullDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_lit = frame.lit_count();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::backend::TestBackend;

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds_scaled() {
        let r = Resolution(64, 32, 2);
        assert_eq!(r.y_bounds(), [-63.0, 0.0]);
    }

    #[test]
    fn test_bitplanes_partition_the_screen() {
        let mut fb = FrameBuffer::default();
        fb.set_pixel(1, 0, true);
        let r = Resolution(64, 32, 1);
        let on = r.bitplane_from_frame(&fb, true).collect::<Vec<_>>();
        assert_eq!(on, vec![(1.0, 0.0)]);
        assert_eq!(r.bitplane_from_frame(&fb, false).count(), 2047);
    }

    #[test]
    fn test_bitplane_scaled() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.set_pixel(1, 1, true);
        let r = Resolution(4, 2, 2);
        let on = r.bitplane_from_frame(&fb, true).collect::<Vec<_>>();
        assert_eq!(on, vec![(2.0, -2.0), (3.0, -2.0), (2.0, -3.0), (3.0, -3.0)]);
    }

    // canvas rendering, against an in-memory terminal
    #[test]
    fn test_canvas_fits_terminal_at_scale_one() -> Result<(), io::Error> {
        let mut terminal = Terminal::new(TestBackend::new(80, 40))?;
        let mut fb = FrameBuffer::default();
        fb.set_pixel(0, 0, true);
        draw_canvas(&mut terminal, &fb, 1)?;
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.get(0, 0).symbol, "┌");
        assert_eq!(buffer.get(65, 33).symbol, "┘");
        Ok(())
    }

    #[test]
    fn test_scaled_canvas_clipped_to_small_terminal() -> Result<(), io::Error> {
        // 64x32 at scale 2 wants 130x66 cells
        let mut terminal = Terminal::new(TestBackend::new(80, 24))?;
        let mut fb = FrameBuffer::default();
        fb.set_pixel(63, 31, true);
        draw_canvas(&mut terminal, &fb, 2)?;
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.get(0, 0).symbol, "┌");
        assert_eq!(buffer.get(79, 0).symbol, "┐");
        assert_eq!(buffer.get(79, 23).symbol, "┘");
        Ok(())
    }

    // FrameBuffer tests
    #[test]
    fn test_new_is_blank_and_dirty() {
        let mut fb = FrameBuffer::default();
        assert_eq!(fb.width(), 64);
        assert_eq!(fb.height(), 32);
        assert_eq!(fb.lit_count(), 0);
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());
    }

    #[test]
    fn test_set_get_row_major() {
        let mut fb = FrameBuffer::default();
        fb.set_pixel(63, 31, true);
        assert!(fb.get_pixel(63, 31));
        assert!(fb.pixels()[31 * 64 + 63]);
        // pixel writes alone don't flag a redraw
        fb.take_dirty();
        fb.set_pixel(0, 0, true);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::default();
        fb.set_pixel(3, 4, true);
        fb.take_dirty();
        fb.clear();
        assert_eq!(fb.lit_count(), 0);
        assert!(fb.is_dirty());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let fb = FrameBuffer::default();
        fb.get_pixel(64, 0);
    }

    #[test]
    fn test_null_display_counts() -> Result<(), io::Error> {
        let mut d = NullDisplay::new();
        let mut fb = FrameBuffer::default();
        fb.set_pixel(0, 0, true);
        d.draw(&fb)?;
        assert_eq!(d.frames_drawn, 1);
        assert_eq!(d.last_lit, 1);
        Ok(())
    }
}
