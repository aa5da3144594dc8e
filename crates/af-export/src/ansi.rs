use std::io::{self, Write};

use af_core::frame::AsciiGrid;
use af_core::traits::GridSerializer;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

/// Séquences ANSI truecolor pour affichage terminal direct.
///
/// La couleur n'est réémise que lorsqu'elle change ; chaque rangée se
/// termine par `ResetColor` puis un saut de ligne.
///
/// # Example
/// ```
/// use af_core::frame::{AsciiCell, AsciiGrid};
/// use af_core::traits::GridSerializer;
/// use af_export::ansi::AnsiSerializer;
///
/// let mut grid = AsciiGrid::new(1, 1);
/// grid.set(0, 0, AsciiCell { ch: '@', fg: (255, 128, 0) });
/// let mut out = Vec::new();
/// AnsiSerializer.serialize(&grid, &mut out);
/// assert_eq!(out, b"\x1b[38;2;255;128;0m@\x1b[0m\n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiSerializer;

impl AnsiSerializer {
    fn write_grid<W: Write>(grid: &AsciiGrid, out: &mut W) -> io::Result<()> {
        for row in grid.rows() {
            let mut current: Option<(u8, u8, u8)> = None;
            for cell in row {
                if current != Some(cell.fg) {
                    let (r, g, b) = cell.fg;
                    queue!(out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.fg);
                }
                queue!(out, Print(cell.ch))?;
            }
            queue!(out, ResetColor, Print('\n'))?;
        }
        Ok(())
    }
}

impl GridSerializer for AnsiSerializer {
    fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        if let Err(e) = Self::write_grid(grid, out) {
            log::warn!("Sérialisation ANSI interrompue : {e}");
        }
        out.len() - start
    }

    fn name(&self) -> &'static str {
        "ansi"
    }
}
