use af_core::frame::AsciiGrid;
use af_core::traits::GridSerializer;

/// Texte brut : une ligne par rangée, chacune terminée par `\n`. Couleurs ignorées.
///
/// # Example
/// ```
/// use af_core::frame::{AsciiCell, AsciiGrid};
/// use af_core::traits::GridSerializer;
/// use af_export::text::PlainText;
///
/// let mut grid = AsciiGrid::new(2, 2);
/// grid.set(0, 1, AsciiCell { ch: '#', fg: (9, 9, 9) });
/// let mut out = Vec::new();
/// PlainText.serialize(&grid, &mut out);
/// assert_eq!(out, b"  \n# \n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl GridSerializer for PlainText {
    fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        let mut buf = [0u8; 4];
        for row in grid.rows() {
            for cell in row {
                out.extend_from_slice(cell.ch.encode_utf8(&mut buf).as_bytes());
            }
            out.push(b'\n');
        }
        out.len() - start
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use af_core::frame::AsciiCell;

    use super::*;

    #[test]
    fn unicode_glyphs_are_utf8() {
        let mut grid = AsciiGrid::new(1, 1);
        grid.set(0, 0, AsciiCell { ch: '█', fg: (0, 0, 0) });
        let mut out = Vec::new();
        assert_eq!(PlainText.serialize(&grid, &mut out), 4);
        assert_eq!(String::from_utf8(out).unwrap(), "█\n");
    }

    #[test]
    fn appends_after_existing_content() {
        let grid = AsciiGrid::new(3, 1);
        let mut out = b"x".to_vec();
        assert_eq!(PlainText.serialize(&grid, &mut out), 4);
        assert_eq!(out, b"x   \n");
    }
}
