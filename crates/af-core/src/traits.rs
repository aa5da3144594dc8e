use std::sync::Arc;

use crate::frame::{AsciiGrid, PixelFrame};

/// Fournit des frames pixel au pipeline.
///
/// Implémenté par : `ImageSource`, `PatternSource`.
///
/// # Example
/// ```
/// use af_core::traits::Source;
/// use af_core::frame::PixelFrame;
/// use std::sync::Arc;
///
/// struct DummySource;
/// impl Source for DummySource {
///     fn next_frame(&mut self) -> Option<Arc<PixelFrame>> { None }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn is_live(&self) -> bool { false }
/// }
/// ```
pub trait Source: Send + 'static {
    /// Retourne la prochaine frame disponible.
    ///
    /// Retourne `None` si la source est épuisée.
    fn next_frame(&mut self) -> Option<Arc<PixelFrame>>;

    /// Dimensions natives de la source.
    fn native_size(&self) -> (u32, u32);

    /// Indique si la source change à chaque frame (pattern animé) ou non (fichier).
    fn is_live(&self) -> bool;
}

/// Sérialise une grille `(glyphe, r, g, b)` vers un format externe.
///
/// Un sérialiseur par format : la réduction n'est jamais dupliquée.
///
/// # Example
/// ```
/// use af_core::traits::GridSerializer;
/// use af_core::frame::AsciiGrid;
///
/// struct Count;
/// impl GridSerializer for Count {
///     fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize {
///         out.push(grid.cells.len() as u8);
///         1
///     }
///     fn name(&self) -> &'static str { "count" }
/// }
/// let mut out = Vec::new();
/// assert_eq!(Count.serialize(&AsciiGrid::new(2, 2), &mut out), 1);
/// ```
pub trait GridSerializer {
    /// Ajoute la représentation de `grid` à `out`, retourne le nombre d'octets écrits.
    fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize;

    /// Nom lisible pour le debug/CLI.
    fn name(&self) -> &'static str;
}
