use crate::error::CoreError;

/// 10 glyphes — compact, bon contraste. Palette par défaut.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// 69 glyphes — Paul Bourke extended, bon équilibre.
pub const CHARSET_STANDARD: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Minimal — haut contraste.
pub const CHARSET_MINIMAL: &str = " .:#@";

/// Palette nommée : `compact`, `standard`, `minimal`.
///
/// # Example
/// ```
/// use af_core::charset::{charset_preset, CHARSET_MINIMAL};
/// assert_eq!(charset_preset("Minimal"), Some(CHARSET_MINIMAL));
/// assert_eq!(charset_preset(" .#"), None);
/// ```
#[must_use]
pub fn charset_preset(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "compact" => Some(CHARSET_COMPACT),
        "standard" => Some(CHARSET_STANDARD),
        "minimal" => Some(CHARSET_MINIMAL),
        _ => None,
    }
}

/// Upper bound on palette length: glyph indices are stored as `u8`.
pub const MAX_GLYPHS: usize = 256;

/// Ordered glyph palette, sparsest (index 0, darkest) to densest (last, brightest).
///
/// # Example
/// ```
/// use af_core::charset::Palette;
/// let palette = Palette::new(" .:#@").unwrap();
/// assert_eq!(palette.len(), 5);
/// assert_eq!(palette.glyph(0), ' ');
/// assert_eq!(palette.glyph(4), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// Build a palette from a charset ordered sparsest→densest.
    ///
    /// # Errors
    /// Returns [`CoreError::PaletteTooShort`] below two glyphs and
    /// [`CoreError::Config`] above [`MAX_GLYPHS`].
    pub fn new(charset: &str) -> Result<Self, CoreError> {
        let glyphs: Vec<char> = charset.chars().collect();
        if glyphs.len() < 2 {
            return Err(CoreError::PaletteTooShort { len: glyphs.len() });
        }
        if glyphs.len() > MAX_GLYPHS {
            return Err(CoreError::Config(format!(
                "palette de {} glyphes, maximum {MAX_GLYPHS}",
                glyphs.len()
            )));
        }
        Ok(Self { glyphs })
    }

    /// Number of glyphs (always ≥ 2).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph at `index`, saturating to the densest glyph.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, index: u8) -> char {
        let i = usize::from(index).min(self.glyphs.len() - 1);
        self.glyphs[i]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            glyphs: CHARSET_COMPACT.chars().collect(),
        }
    }
}

/// Lookup table mapping brightness [0..255] → glyph index.
///
/// Entier uniquement : `(b·(len−1) + 127) >> 8`, pas de flottant ni de
/// division. Pré-calculée une fois, O(1) par cellule.
///
/// # Example
/// ```
/// use af_core::charset::GlyphLut;
/// let lut = GlyphLut::new(10);
/// assert_eq!(lut.index(0), 0);
/// assert_eq!(lut.index(255), 9);
/// ```
#[derive(Clone)]
pub struct GlyphLut {
    lut: [u8; 256],
}

impl GlyphLut {
    /// Build the table for a palette of `palette_len` glyphs.
    #[must_use]
    pub fn new(palette_len: usize) -> Self {
        let last = palette_len.clamp(1, MAX_GLYPHS) - 1;
        let mut lut = [0u8; 256];
        for (b, slot) in lut.iter_mut().enumerate() {
            let idx = (b * last + 127) >> 8;
            *slot = idx.min(last) as u8;
        }
        Self { lut }
    }

    /// Map a brightness value to a palette index.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, brightness: u8) -> u8 {
        self.lut[usize::from(brightness)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_lut_maps_extremes() {
        let lut = GlyphLut::new(10);
        assert_eq!(lut.index(0), 0);
        assert_eq!(lut.index(255), 9);
    }

    #[test]
    fn glyph_lut_monotonic() {
        let lut = GlyphLut::new(CHARSET_STANDARD.chars().count());
        let mut prev = 0u8;
        for b in 0..=255u8 {
            let idx = lut.index(b);
            assert!(idx >= prev, "LUT non monotone à luminance {b}");
            prev = idx;
        }
    }

    #[test]
    fn glyph_lut_matches_integer_formula() {
        // (b*9 + 127) >> 8 pour la palette compacte.
        let lut = GlyphLut::new(10);
        assert_eq!(lut.index(28), 1);
        assert_eq!(lut.index(128), 4);
        assert_eq!(lut.index(142), 5);
        assert_eq!(lut.index(227), 8);
    }

    #[test]
    fn presets_are_valid_palettes() {
        for name in ["compact", "standard", "minimal"] {
            let charset = charset_preset(name).unwrap();
            assert!(Palette::new(charset).is_ok(), "{name}");
        }
        assert_eq!(Palette::new(CHARSET_STANDARD).unwrap().len(), 69);
    }

    #[test]
    fn palette_rejects_single_glyph() {
        assert!(matches!(
            Palette::new("@"),
            Err(CoreError::PaletteTooShort { len: 1 })
        ));
    }

    #[test]
    fn palette_glyph_saturates() {
        let palette = Palette::default();
        assert_eq!(palette.glyph(200), '@');
        assert_eq!(palette.glyph(7), '#');
    }
}
