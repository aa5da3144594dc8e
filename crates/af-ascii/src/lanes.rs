//! Passe 2 vectorielle : 4 cellules par itération sur `i32x4`.
//!
//! Luminance et saturations en parallèle, puis extraction voie par voie
//! pour les tables (accès indexés, intrinsèquement scalaires). Le reste
//! (`n % 4` cellules) passe par le chemin scalaire.

use af_core::color::{LUMA_B, LUMA_G, LUMA_R, LUMA_SHIFT};
use af_core::frame::AsciiCell;
use wide::i32x4;

use crate::lut::LookupTables;
use crate::reduce::map_cells_scalar;

/// Largeur des voies.
pub const LANES: usize = 4;

/// `true` si la cible dispose d'entiers 128 bits natifs.
///
/// Sans eux, `wide` émule les voies : même résultat, sans le gain.
#[must_use]
pub const fn is_vectorized_supported() -> bool {
    cfg!(any(
        target_feature = "sse2",
        target_feature = "neon",
        target_feature = "simd128"
    ))
}

#[inline(always)]
fn load(chunk: &[u16]) -> i32x4 {
    i32x4::new([
        i32::from(chunk[0]),
        i32::from(chunk[1]),
        i32::from(chunk[2]),
        i32::from(chunk[3]),
    ])
}

/// Passe 2 sur voies 32 bits, bit à bit identique à [`map_cells_scalar`].
pub fn map_cells_lanes(
    tables: &LookupTables,
    r: &[u16],
    g: &[u16],
    b: &[u16],
    out: &mut [AsciiCell],
) {
    let n = out.len();
    let split = n - n % LANES;
    let (head, tail) = out.split_at_mut(split);

    let coef_r = i32x4::splat(LUMA_R as i32);
    let coef_g = i32x4::splat(LUMA_G as i32);
    let coef_b = i32x4::splat(LUMA_B as i32);
    let v0 = i32x4::splat(0);
    let v255 = i32x4::splat(255);

    for (chunk_idx, cells) in head.chunks_exact_mut(LANES).enumerate() {
        let base = chunk_idx * LANES;
        let end = base + LANES;

        let rv = load(&r[base..end]).max(v0).min(v255);
        let gv = load(&g[base..end]).max(v0).min(v255);
        let bv = load(&b[base..end]).max(v0).min(v255);

        let lum = ((rv * coef_r + gv * coef_g + bv * coef_b) >> LUMA_SHIFT as i32)
            .max(v0)
            .min(v255);

        let (l, rs, gs, bs) = (lum.to_array(), rv.to_array(), gv.to_array(), bv.to_array());
        for (lane, cell) in cells.iter_mut().enumerate() {
            *cell = tables.finish(l[lane] as u8, rs[lane] as u8, gs[lane] as u8, bs[lane] as u8);
        }
    }

    map_cells_scalar(tables, &r[split..n], &g[split..n], &b[split..n], tail);
}
