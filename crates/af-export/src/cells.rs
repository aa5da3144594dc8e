use af_core::frame::{AsciiGrid, CELL_BYTES};
use af_core::traits::GridSerializer;

/// Octets bruts : `[glyphe, r, g, b]` par cellule, row-major.
///
/// # Example
/// ```
/// use af_core::frame::{AsciiCell, AsciiGrid};
/// use af_core::traits::GridSerializer;
/// use af_export::cells::CellBytes;
///
/// let mut grid = AsciiGrid::new(2, 1);
/// grid.set(1, 0, AsciiCell { ch: '@', fg: (1, 2, 3) });
/// let mut out = Vec::new();
/// assert_eq!(CellBytes.serialize(&grid, &mut out), 8);
/// assert_eq!(out, [b' ', 0, 0, 0, b'@', 1, 2, 3]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CellBytes;

impl GridSerializer for CellBytes {
    fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize {
        out.reserve(grid.cells.len() * CELL_BYTES);
        for cell in &grid.cells {
            out.extend_from_slice(&cell.to_bytes());
        }
        grid.cells.len() * CELL_BYTES
    }

    fn name(&self) -> &'static str {
        "cells"
    }
}
