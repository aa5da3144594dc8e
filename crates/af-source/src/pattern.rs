use std::sync::Arc;

use af_core::color::pack_rgb;
use af_core::error::CoreError;
use af_core::frame::PixelFrame;
use af_core::traits::Source;

/// Motifs synthétiques déterministes, pour benchs et démos sans fichier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Dégradé horizontal (rouge) × vertical (vert), bleu constant.
    Gradient,
    /// Damier noir/blanc de cases 8×8.
    Checker,
    /// Plasma animé (somme de sinusoïdes), change à chaque frame.
    Plasma,
}

impl Pattern {
    /// Parse un nom de motif (insensible à la casse).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gradient" => Some(Self::Gradient),
            "checker" => Some(Self::Checker),
            "plasma" => Some(Self::Plasma),
            _ => None,
        }
    }
}

/// Générateur de frames synthétiques.
///
/// Réutilise un pool de frames : pas d'allocation en régime établi tant
/// que le consommateur relâche les `Arc` entre deux appels.
///
/// # Example
/// ```
/// use af_core::traits::Source;
/// use af_source::pattern::{Pattern, PatternSource};
/// let mut source = PatternSource::new(Pattern::Gradient, 64, 32);
/// let frame = source.next_frame().unwrap();
/// assert_eq!((frame.width, frame.height), (64, 32));
/// ```
pub struct PatternSource {
    pattern: Pattern,
    width: u32,
    height: u32,
    pool: Vec<Arc<PixelFrame>>,
    frame_count: u64,
}

impl PatternSource {
    #[must_use]
    pub fn new(pattern: Pattern, width: u32, height: u32) -> Self {
        let pool = (0..3)
            .map(|_| Arc::new(PixelFrame::new(width, height)))
            .collect();
        Self {
            pattern,
            width,
            height,
            pool,
            frame_count: 0,
        }
    }
}

impl Source for PatternSource {
    fn next_frame(&mut self) -> Option<Arc<PixelFrame>> {
        let free_idx = self
            .pool
            .iter()
            .position(|a| Arc::strong_count(a) == 1)
            .unwrap_or(0);
        let slot = &mut self.pool[free_idx];
        if Arc::get_mut(slot).is_none() {
            // Pool saturé : le consommateur garde toutes les frames.
            *slot = Arc::new(PixelFrame::new(self.width, self.height));
        }
        let fb = Arc::get_mut(slot)?;
        render(self.pattern, fb, self.frame_count);
        self.frame_count += 1;
        Some(Arc::clone(slot))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_live(&self) -> bool {
        matches!(self.pattern, Pattern::Plasma)
    }
}

/// Dessine `pattern` dans `frame` pour la frame d'indice `t`.
pub fn render(pattern: Pattern, frame: &mut PixelFrame, t: u64) {
    let (w, h) = (frame.width.max(1), frame.height.max(1));
    match pattern {
        Pattern::Gradient => {
            for y in 0..frame.height {
                let g = (y * 255 / h.saturating_sub(1).max(1)) as u8;
                for x in 0..frame.width {
                    let r = (x * 255 / w.saturating_sub(1).max(1)) as u8;
                    frame.set(x, y, pack_rgb(r, g, 96));
                }
            }
        }
        Pattern::Checker => {
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let on = ((x / 8) + (y / 8)) % 2 == 0;
                    let v = if on { 255 } else { 0 };
                    frame.set(x, y, pack_rgb(v, v, v));
                }
            }
        }
        Pattern::Plasma => {
            let time = t as f32 / 30.0;
            for y in 0..frame.height {
                let fy = y as f32 / h as f32;
                for x in 0..frame.width {
                    let fx = x as f32 / w as f32;
                    let v = (fx * 10.0 + time).sin()
                        + (fy * 8.0 - time * 0.7).sin()
                        + ((fx + fy) * 6.0 + time * 1.3).sin();
                    let n = (v + 3.0) / 6.0;
                    let r = (n * 255.0) as u8;
                    let g = ((1.0 - n) * 255.0) as u8;
                    let b = ((n * std::f32::consts::PI).sin() * 255.0) as u8;
                    frame.set(x, y, pack_rgb(r, g, b));
                }
            }
        }
    }
}

/// Fabrique la source synthétique choisie par l'utilisateur.
///
/// # Errors
/// Retourne une erreur si le motif n'est pas reconnu ou si une dimension est nulle.
pub fn create_pattern_source(
    name: &str,
    width: u32,
    height: u32,
) -> anyhow::Result<Box<dyn Source>> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height }.into());
    }
    match Pattern::from_name(name) {
        Some(p) => Ok(Box::new(PatternSource::new(p, width, height))),
        None => anyhow::bail!("Motif inconnu : {name}. Supportés : gradient, checker, plasma"),
    }
}
