//! Réduction des régions en cellules.
//!
//! Passe 1 (scalaire) : somme de rectangle par l'image intégrale, moyenne
//! par multiplication + décalage, stockée dans des plans `u16` contigus.
//! Passe 2 : luminance, saturation, tables. Deux implémentations au
//! résultat identique, choisies à l'exécution : [`AccelMode::Scalar`] et
//! [`AccelMode::Vectorized`] (voir [`crate::lanes`]).

use af_core::frame::AsciiCell;
use serde::Serialize;

use crate::integral::IntegralImage;
use crate::lut::LookupTables;
use crate::region::RegionMap;

/// Chemin de réduction utilisé pour la passe 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AccelMode {
    /// 4 cellules par itération sur des voies entières 32 bits.
    Vectorized,
    /// Une cellule à la fois.
    Scalar,
}

impl AccelMode {
    #[must_use]
    pub fn from_flag(vectorized: bool) -> Self {
        if vectorized { Self::Vectorized } else { Self::Scalar }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vectorized => "simd",
            Self::Scalar => "scalar",
        }
    }
}

/// Plans temporaires des moyennes par canal, une entrée par cellule.
///
/// Réutilisés d'une frame à l'autre ; ne font que croître.
#[derive(Debug, Default)]
pub struct ChannelPlanes {
    pub r: Vec<u16>,
    pub g: Vec<u16>,
    pub b: Vec<u16>,
}

impl ChannelPlanes {
    /// Garantit `cells` entrées par plan.
    pub fn ensure(&mut self, cells: usize) {
        if self.r.len() < cells {
            log::debug!("Plans temporaires agrandis : {cells} cellules");
            self.r.resize(cells, 0);
            self.g.resize(cells, 0);
            self.b.resize(cells, 0);
        }
    }

    /// Libère les plans.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

/// Passe 1 : moyenne RGB de chaque cellule, sans division.
///
/// `regions` doit avoir été construite pour les dimensions courantes et
/// `planes` dimensionné pour `cols × rows` cellules.
pub fn average_cells(integral: &IntegralImage, regions: &RegionMap, planes: &mut ChannelPlanes) {
    let width = regions.cols().len();
    for (row_idx, row) in regions.rows().iter().enumerate() {
        let row_offset = row_idx * width;
        for (col_idx, col) in regions.cols().iter().enumerate() {
            let idx = row_offset + col_idx;
            if regions.is_degenerate(idx) {
                planes.r[idx] = 0;
                planes.g[idx] = 0;
                planes.b[idx] = 0;
                continue;
            }
            let sums = integral.rect_sum(col.start, col.end, row.start, row.end);
            planes.r[idx] = regions.average(idx, sums.r).min(u32::from(u16::MAX)) as u16;
            planes.g[idx] = regions.average(idx, sums.g).min(u32::from(u16::MAX)) as u16;
            planes.b[idx] = regions.average(idx, sums.b).min(u32::from(u16::MAX)) as u16;
        }
    }
}

/// Sature une moyenne à un octet.
#[inline(always)]
#[must_use]
pub fn clamp_to_byte(v: u16) -> u8 {
    v.min(255) as u8
}

/// Réduit une couleur moyenne (non saturée) en cellule : l'oracle
/// commun aux deux chemins.
///
/// # Example
/// ```
/// use af_ascii::lut::LookupTables;
/// use af_ascii::reduce::reduce_region_to_cell;
/// let tables = LookupTables::default();
/// let cell = reduce_region_to_cell(&tables, 0, 0, 0);
/// assert_eq!((cell.ch, cell.fg), (' ', (0, 0, 0)));
/// ```
#[inline(always)]
#[must_use]
pub fn reduce_region_to_cell(tables: &LookupTables, r: u16, g: u16, b: u16) -> AsciiCell {
    tables.cell(clamp_to_byte(r), clamp_to_byte(g), clamp_to_byte(b))
}

/// Passe 2 scalaire.
pub fn map_cells_scalar(
    tables: &LookupTables,
    r: &[u16],
    g: &[u16],
    b: &[u16],
    out: &mut [AsciiCell],
) {
    for (i, cell) in out.iter_mut().enumerate() {
        *cell = reduce_region_to_cell(tables, r[i], g[i], b[i]);
    }
}

/// Passe 2 selon le mode. `out.len()` cellules sont écrites.
pub fn map_cells(mode: AccelMode, tables: &LookupTables, planes: &ChannelPlanes, out: &mut [AsciiCell]) {
    let n = out.len();
    let (r, g, b) = (&planes.r[..n], &planes.g[..n], &planes.b[..n]);
    match mode {
        AccelMode::Vectorized => crate::lanes::map_cells_lanes(tables, r, g, b, out),
        AccelMode::Scalar => map_cells_scalar(tables, r, g, b, out),
    }
}

/// Réduction complète d'une frame : intégrale → moyennes → cellules.
///
/// `regions` doit correspondre aux dimensions de `pixels` et de `out`.
pub fn reduce_frame(
    mode: AccelMode,
    tables: &LookupTables,
    regions: &RegionMap,
    integral: &mut IntegralImage,
    planes: &mut ChannelPlanes,
    pixels: &[u32],
    out: &mut [AsciiCell],
) {
    debug_assert!(regions.dims().is_some(), "carte de régions non construite");
    let Some((src_w, src_h, _, _)) = regions.dims() else {
        return;
    };
    integral.build(pixels, src_w, src_h);
    planes.ensure(out.len());
    average_cells(integral, regions, planes);
    map_cells(mode, tables, planes, out);
}
