//! Découpage de la source en régions par cellule de sortie.
//!
//! Chaque axe est partitionné par interpolation linéaire tronquée ;
//! chaque cellule reçoit l'inverse de son nombre de pixels en virgule
//! fixe 16 bits, ce qui remplace la division par une multiplication.

/// Bits fractionnaires des inverses.
pub const RECIP_SHIFT: u32 = 16;
/// `1.0` en virgule fixe.
pub const RECIP_ONE: u32 = 1 << RECIP_SHIFT;

/// Intervalle source demi-ouvert `[start, end)` couvert par une colonne ou ligne.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline(always)]
    #[must_use]
    pub fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Partitionne un axe source de longueur `source` en `output` intervalles.
///
/// `start = ⌊i·S/O⌋`, `end = ⌊(i+1)·S/O⌋`, élargi à 1 pixel si vide puis
/// borné à `S`. Quand `O > S`, des cellules voisines partagent un pixel.
///
/// # Example
/// ```
/// use af_ascii::region::{axis_spans, Span};
/// let spans = axis_spans(10, 4);
/// assert_eq!(spans[0], Span { start: 0, end: 2 });
/// assert_eq!(spans[3], Span { start: 7, end: 10 });
/// ```
#[must_use]
pub fn axis_spans(source: u32, output: u32) -> Vec<Span> {
    let s = u64::from(source);
    let o = u64::from(output.max(1));
    (0..o)
        .map(|i| {
            let start = (i * s / o) as u32;
            let mut end = ((i + 1) * s / o) as u32;
            if end <= start {
                end = start + 1;
            }
            Span {
                start,
                end: end.min(source),
            }
        })
        .collect()
}

/// Inverse 2^16 d'un nombre de pixels ; 0 pour une région vide.
///
/// Au-delà de 65 536 pixels l'inverse tronqué vaut 0 : ces régions passent
/// par une division entière (voir [`RegionMap::average`]).
#[inline(always)]
#[must_use]
pub fn reciprocal(count: u32) -> u32 {
    if count == 0 { 0 } else { RECIP_ONE / count }
}

/// Carte des régions source par cellule, reconstruite seulement quand
/// `(source_w, source_h, output_w, output_h)` change.
///
/// Une région est vide ssi son nombre de pixels est nul : c'est `counts`
/// qui porte cet invariant, pas l'inverse. Au-delà de 65 536 pixels
/// l'inverse vaut aussi 0 et [`Self::average`] divise.
///
/// # Example
/// ```
/// use af_ascii::region::RegionMap;
/// let mut map = RegionMap::new();
/// assert!(map.build(4, 4, 2, 2));
/// assert!(!map.build(4, 4, 2, 2));
/// assert_eq!(map.reciprocal_at(1, 1), 65536 / 4);
/// ```
#[derive(Debug, Default)]
pub struct RegionMap {
    cols: Vec<Span>,
    rows: Vec<Span>,
    counts: Vec<u32>,
    inv: Vec<u32>,
    dims: Option<(u32, u32, u32, u32)>,
}

impl RegionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)construit la carte si les dimensions ont changé.
    ///
    /// Returns `true` when the tables were rebuilt.
    pub fn build(&mut self, source_w: u32, source_h: u32, output_w: u32, output_h: u32) -> bool {
        let key = (source_w, source_h, output_w, output_h);
        if self.dims == Some(key) {
            return false;
        }

        self.cols = axis_spans(source_w, output_w);
        self.rows = axis_spans(source_h, output_h);

        self.counts.clear();
        self.inv.clear();
        for row in &self.rows {
            for col in &self.cols {
                let count = row.len() * col.len();
                self.counts.push(count);
                self.inv.push(reciprocal(count));
            }
        }

        self.dims = Some(key);
        log::debug!(
            "Carte de régions reconstruite : {source_w}×{source_h} → {output_w}×{output_h}"
        );
        true
    }

    /// Libère les tables et force une reconstruction au prochain `build`.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn cols(&self) -> &[Span] {
        &self.cols
    }

    #[must_use]
    pub fn rows(&self) -> &[Span] {
        &self.rows
    }

    /// Dimensions de la dernière construction.
    #[must_use]
    pub fn dims(&self) -> Option<(u32, u32, u32, u32)> {
        self.dims
    }

    #[inline(always)]
    #[must_use]
    pub fn reciprocal_at(&self, col: usize, row: usize) -> u32 {
        self.inv[row * self.cols.len() + col]
    }

    /// Moyenne d'une somme de canal sur la région de la cellule `index`.
    ///
    /// Multiplication + décalage ; 0 pour une région vide.
    #[inline(always)]
    #[must_use]
    pub fn average(&self, index: usize, sum: u64) -> u32 {
        let inv = self.inv[index];
        let avg = if inv != 0 {
            (sum * u64::from(inv)) >> RECIP_SHIFT
        } else {
            sum.checked_div(u64::from(self.counts[index])).unwrap_or(0)
        };
        avg.min(u64::from(u32::MAX)) as u32
    }

    /// Région vide : la cellule sort en glyphe le plus clair et noir.
    #[inline(always)]
    #[must_use]
    pub fn is_degenerate(&self, index: usize) -> bool {
        self.counts[index] == 0
    }
}
