/// Gamma par défaut : < 1.0 éclaircit les tons moyens.
pub const DEFAULT_GAMMA: f32 = 0.35;

/// Luma weights scaled so they sum to ~1000 and are normalised by `>> 10`.
pub const LUMA_R: u32 = 299;
pub const LUMA_G: u32 = 587;
pub const LUMA_B: u32 = 114;
pub const LUMA_SHIFT: u32 = 10;

/// Extrait (r, g, b) d'un pixel packé `0xAARRGGBB`. Alpha ignoré.
///
/// # Example
/// ```
/// use af_core::color::unpack_rgb;
/// assert_eq!(unpack_rgb(0xFF12_3456), (0x12, 0x34, 0x56));
/// ```
#[inline(always)]
#[must_use]
pub fn unpack_rgb(pixel: u32) -> (u8, u8, u8) {
    (
        ((pixel >> 16) & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        (pixel & 0xFF) as u8,
    )
}

/// Packe (r, g, b) en `0xFFRRGGBB`.
///
/// # Example
/// ```
/// use af_core::color::{pack_rgb, unpack_rgb};
/// assert_eq!(unpack_rgb(pack_rgb(1, 2, 3)), (1, 2, 3));
/// ```
#[inline(always)]
#[must_use]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Luminance en virgule fixe : `(r·299 + g·587 + b·114) >> 10`, saturée à 255.
///
/// Le diviseur est une puissance de deux (1024) et non 1000 : le blanc pur
/// donne 249, pas 255.
///
/// # Example
/// ```
/// use af_core::color::luma_q10;
/// assert_eq!(luma_q10(0, 0, 0), 0);
/// assert_eq!(luma_q10(255, 255, 255), 249);
/// ```
#[inline(always)]
#[must_use]
pub fn luma_q10(r: u32, g: u32, b: u32) -> u8 {
    let lum = (r * LUMA_R + g * LUMA_G + b * LUMA_B) >> LUMA_SHIFT;
    lum.min(255) as u8
}

/// Table de correction gamma 256 entrées, immuable après construction.
///
/// `lut[v] = round(255 · (v/255)^γ)`, saturée à [0, 255].
///
/// # Example
/// ```
/// use af_core::color::GammaLut;
/// let lut = GammaLut::new(0.35);
/// assert_eq!(lut.apply(0), 0);
/// assert_eq!(lut.apply(255), 255);
/// assert!(lut.apply(64) > 64);
/// ```
#[derive(Clone)]
pub struct GammaLut {
    lut: [u8; 256],
    gamma: f32,
}

impl GammaLut {
    /// Build the table for exponent `gamma`.
    #[must_use]
    pub fn new(gamma: f32) -> Self {
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            let normalized = i as f32 / 255.0;
            let v = normalized.powf(gamma) * 255.0;
            *slot = v.clamp(0.0, 255.0).round() as u8;
        }
        Self { lut, gamma }
    }

    #[inline(always)]
    #[must_use]
    pub fn apply(&self, value: u8) -> u8 {
        self.lut[usize::from(value)]
    }

    /// Exponent the table was built with.
    #[must_use]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}
