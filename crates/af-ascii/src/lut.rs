use af_core::charset::{GlyphLut, Palette};
use af_core::color::{GammaLut, luma_q10};
use af_core::error::CoreError;
use af_core::frame::AsciiCell;

/// Tables de correspondance d'un convertisseur : palette, index de glyphe, gamma.
///
/// Immuables une fois construites ; [`LookupTables::ensure`] ne reconstruit
/// que si la palette ou le gamma changent.
///
/// # Example
/// ```
/// use af_ascii::lut::LookupTables;
/// let tables = LookupTables::new(" .:-=+*#%@", 0.35).unwrap();
/// assert_eq!(tables.cell(0, 0, 0).ch, ' ');
/// assert_eq!(tables.cell(255, 255, 255).ch, '@');
/// ```
#[derive(Clone)]
pub struct LookupTables {
    palette: Palette,
    glyphs: GlyphLut,
    gamma: GammaLut,
    charset: String,
}

impl LookupTables {
    /// Build all tables for `charset` and exponent `gamma`.
    ///
    /// # Errors
    /// Returns an error if the charset is not a valid palette.
    pub fn new(charset: &str, gamma: f32) -> Result<Self, CoreError> {
        let palette = Palette::new(charset)?;
        let glyphs = GlyphLut::new(palette.len());
        log::debug!(
            "Tables construites : {} glyphes, gamma {gamma}",
            palette.len()
        );
        Ok(Self {
            palette,
            glyphs,
            gamma: GammaLut::new(gamma),
            charset: charset.to_string(),
        })
    }

    /// Rebuild only if `charset` or `gamma` differ from the current tables.
    ///
    /// Returns `true` when a rebuild happened.
    ///
    /// # Errors
    /// Returns an error if a rebuild is needed and the charset is invalid;
    /// the existing tables are kept in that case.
    pub fn ensure(&mut self, charset: &str, gamma: f32) -> Result<bool, CoreError> {
        if self.charset == charset && self.gamma.gamma().to_bits() == gamma.to_bits() {
            return Ok(false);
        }
        *self = Self::new(charset, gamma)?;
        Ok(true)
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Correction gamma d'un canal.
    #[inline(always)]
    #[must_use]
    pub fn gamma(&self, value: u8) -> u8 {
        self.gamma.apply(value)
    }

    /// Glyphe pour une luminance déjà saturée à [0, 255].
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, lum: u8) -> char {
        self.palette.glyph(self.glyphs.index(lum))
    }

    /// Cellule finale à partir d'une luminance et de canaux moyens saturés.
    #[inline(always)]
    #[must_use]
    pub fn finish(&self, lum: u8, r: u8, g: u8, b: u8) -> AsciiCell {
        AsciiCell {
            ch: self.glyph(lum),
            fg: (self.gamma(r), self.gamma(g), self.gamma(b)),
        }
    }

    /// Réduction complète d'une couleur moyenne vers une cellule.
    #[inline(always)]
    #[must_use]
    pub fn cell(&self, r: u8, g: u8, b: u8) -> AsciiCell {
        let lum = luma_q10(u32::from(r), u32::from(g), u32::from(b));
        self.finish(lum, r, g, b)
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        let palette = Palette::default();
        let glyphs = GlyphLut::new(palette.len());
        Self {
            palette,
            glyphs,
            gamma: GammaLut::default(),
            charset: af_core::charset::CHARSET_COMPACT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent() {
        let mut tables = LookupTables::default();
        assert!(!tables.ensure(" .:-=+*#%@", 0.35).unwrap());
        assert!(tables.ensure(" #", 0.35).unwrap());
        assert!(!tables.ensure(" #", 0.35).unwrap());
        assert_eq!(tables.palette().len(), 2);
    }

    #[test]
    fn invalid_charset_keeps_previous_tables() {
        let mut tables = LookupTables::default();
        assert!(tables.ensure("", 0.35).is_err());
        assert_eq!(tables.palette().len(), 10);
    }

    #[test]
    fn white_maps_to_densest_with_full_gamma() {
        let tables = LookupTables::default();
        let cell = tables.cell(255, 255, 255);
        assert_eq!(cell.ch, '@');
        assert_eq!(cell.fg, (tables.gamma(255), tables.gamma(255), tables.gamma(255)));
    }
}
