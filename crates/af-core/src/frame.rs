use crate::color::{pack_rgb, unpack_rgb};

/// Taille en octets d'une cellule packée : glyphe + r + g + b.
pub const CELL_BYTES: usize = 4;

/// Frame source réutilisable : pixels packés 32 bits `0xAARRGGBB`, row-major.
///
/// Stride = width (pas de stride indépendant).
///
/// # Example
/// ```
/// use af_core::frame::PixelFrame;
/// let fb = PixelFrame::new(10, 10);
/// assert_eq!(fb.data.len(), 100);
/// ```
#[derive(Clone, Debug)]
pub struct PixelFrame {
    /// Pixels packés, row-major.
    pub data: Vec<u32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelFrame {
    /// Crée une frame noire (alpha opaque) aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::PixelFrame;
    /// let fb = PixelFrame::new(4, 2);
    /// assert_eq!(fb.rgb(3, 1), (0, 0, 0));
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0xFF00_0000)
    }

    /// Frame remplie d'une couleur unie.
    #[must_use]
    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        Self {
            data: vec![pixel; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Convertit un buffer RGBA 8 bits (4 octets/pixel) en pixels packés.
    ///
    /// Les octets en trop sont ignorés, les pixels manquants restent noirs.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::PixelFrame;
    /// let fb = PixelFrame::from_rgba8(1, 1, &[10, 20, 30, 255]);
    /// assert_eq!(fb.data[0], 0xFF0A_141E);
    /// ```
    #[must_use]
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Self {
        let mut frame = Self::new(width, height);
        for (dst, px) in frame.data.iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = (u32::from(px[3]) << 24) | (pack_rgb(px[0], px[1], px[2]) & 0x00FF_FFFF);
        }
        frame
    }

    /// Pixel packé en (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Canaux (r, g, b) du pixel en (x, y).
    #[inline(always)]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        unpack_rgb(self.pixel(x, y))
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: u32) {
        if let Some(slot) = self.data.get_mut((y * self.width + x) as usize) {
            *slot = pixel;
        }
    }
}

/// Single cell in the ASCII grid: un glyphe et sa couleur moyenne gamma-corrigée.
///
/// # Example
/// ```
/// use af_core::frame::AsciiCell;
/// let cell = AsciiCell::default();
/// assert_eq!(cell.ch, ' ');
/// assert_eq!(cell.fg, (0, 0, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur (RGB), déjà passée par la table gamma.
    pub fg: (u8, u8, u8),
}

impl Default for AsciiCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: (0, 0, 0),
        }
    }
}

impl AsciiCell {
    /// Forme packée `[glyphe, r, g, b]`. Les glyphes non-ASCII deviennent `?`.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::AsciiCell;
    /// let cell = AsciiCell { ch: '@', fg: (1, 2, 3) };
    /// assert_eq!(cell.to_bytes(), [b'@', 1, 2, 3]);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn to_bytes(self) -> [u8; CELL_BYTES] {
        let glyph = if self.ch.is_ascii() { self.ch as u8 } else { b'?' };
        [glyph, self.fg.0, self.fg.1, self.fg.2]
    }
}

/// Grille de sortie ASCII. Pré-allouée, réutilisée chaque frame.
///
/// `cells.len() == width × height` ; la capacité sous-jacente peut être
/// plus grande pour éviter toute réallocation quand les dimensions changent.
///
/// # Example
/// ```
/// use af_core::frame::{AsciiGrid, AsciiCell};
/// let mut grid = AsciiGrid::new(80, 24);
/// grid.set(0, 0, AsciiCell { ch: '@', fg: (255, 0, 0) });
/// assert_eq!(grid.get(0, 0).ch, '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<AsciiCell>,
    /// Width in characters.
    pub width: u16,
    /// Height in characters.
    pub height: u16,
}

impl AsciiGrid {
    /// Crée une grille pré-allouée.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::AsciiGrid;
    /// let grid = AsciiGrid::new(80, 24);
    /// assert_eq!(grid.cells.len(), 80 * 24);
    /// ```
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![AsciiCell::default(); usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Reshape in place, keeping the allocation when it is large enough.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::AsciiGrid;
    /// let mut grid = AsciiGrid::new(8, 8);
    /// grid.reshape(4, 2);
    /// assert_eq!(grid.cells.len(), 8);
    /// assert!(grid.cells.capacity() >= 64);
    /// ```
    pub fn reshape(&mut self, width: u16, height: u16) {
        let len = usize::from(width) * usize::from(height);
        self.cells.resize(len, AsciiCell::default());
        self.width = width;
        self.height = height;
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, cell: AsciiCell) {
        self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)] = cell;
    }

    /// Get a cell reference at position (x, y).
    ///
    /// # Example
    /// ```
    /// use af_core::frame::AsciiGrid;
    /// let grid = AsciiGrid::new(10, 10);
    /// assert_eq!(grid.get(0, 0).ch, ' ');
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> &AsciiCell {
        &self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// Row-major iterator over grid rows.
    pub fn rows(&self) -> impl Iterator<Item = &[AsciiCell]> {
        self.cells.chunks(usize::from(self.width).max(1))
    }

    /// Clear all cells to default (space, black).
    pub fn clear(&mut self) {
        self.cells.fill(AsciiCell::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_keeps_allocation() {
        let mut grid = AsciiGrid::new(16, 16);
        let ptr = grid.cells.as_ptr();
        grid.reshape(8, 4);
        grid.reshape(16, 16);
        assert_eq!(grid.cells.as_ptr(), ptr);
        assert_eq!(grid.rows().count(), 16);
    }

    #[test]
    fn rgba8_conversion_keeps_alpha() {
        let fb = PixelFrame::from_rgba8(2, 1, &[255, 0, 0, 128, 0, 0, 255, 255]);
        assert_eq!(fb.data, vec![0x80FF_0000, 0xFF00_00FF]);
        assert_eq!(fb.rgb(1, 0), (0, 0, 255));
    }

    #[test]
    fn non_ascii_glyph_packs_as_question_mark() {
        let cell = AsciiCell { ch: '█', fg: (9, 8, 7) };
        assert_eq!(cell.to_bytes(), [b'?', 9, 8, 7]);
    }
}
