use af_core::color::unpack_rgb;

/// Sommes d'un rectangle source par canal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelSums {
    pub r: u64,
    pub g: u64,
    pub b: u64,
}

/// Image intégrale (summed-area table) : trois plans `(w+1)×(h+1)`.
///
/// `I[x, y]` = somme du canal sur les pixels de colonne `< x` et ligne `< y`.
/// Ligne 0 et colonne 0 toujours nulles. L'allocation ne fait que croître.
///
/// Plans en `u64` : une frame entière de canaux à 255 dépasse 2^32 dès
/// ~16,8 M pixels, les sommes de rectangle restent exactes au-delà.
///
/// # Example
/// ```
/// use af_ascii::integral::IntegralImage;
/// let mut ii = IntegralImage::new();
/// ii.build(&[0xFF01_0203; 4], 2, 2);
/// let s = ii.rect_sum(0, 2, 0, 2);
/// assert_eq!((s.r, s.g, s.b), (4, 8, 12));
/// ```
#[derive(Debug, Default)]
pub struct IntegralImage {
    r: Vec<u64>,
    g: Vec<u64>,
    b: Vec<u64>,
    /// `source_w + 1`.
    stride: usize,
    /// `source_h + 1`.
    rows: usize,
}

impl IntegralImage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Garantit la capacité pour `(w+1)×(h+1)` ; ne rétrécit jamais.
    fn ensure_capacity(&mut self, w: usize, h: usize) {
        let stride = w + 1;
        let rows = h + 1;
        let needed = stride * rows;
        if needed > self.r.len() {
            log::debug!("Image intégrale agrandie : {w}×{h} ({needed} entrées/plan)");
            self.r.resize(needed, 0);
            self.g.resize(needed, 0);
            self.b.resize(needed, 0);
        }
        self.stride = stride;
        self.rows = rows;
    }

    /// Construit les trois plans depuis des pixels packés `0xAARRGGBB`.
    ///
    /// `pixels` doit contenir au moins `w × h` éléments (vérifié par l'appelant).
    pub fn build(&mut self, pixels: &[u32], w: u32, h: u32) {
        let (w, h) = (w as usize, h as usize);
        debug_assert!(pixels.len() >= w * h, "source plus courte que w×h");
        self.ensure_capacity(w, h);
        let stride = self.stride;

        self.r[..stride].fill(0);
        self.g[..stride].fill(0);
        self.b[..stride].fill(0);
        if w == 0 {
            return;
        }

        for (y, src_row) in pixels.chunks_exact(w).take(h).enumerate() {
            let prev = y * stride;
            let cur = (y + 1) * stride;
            self.r[cur] = 0;
            self.g[cur] = 0;
            self.b[cur] = 0;

            let (mut rsum, mut gsum, mut bsum) = (0u64, 0u64, 0u64);
            for (x, &px) in src_row.iter().enumerate() {
                let (r, g, b) = unpack_rgb(px);
                rsum += u64::from(r);
                gsum += u64::from(g);
                bsum += u64::from(b);
                self.r[cur + x + 1] = rsum + self.r[prev + x + 1];
                self.g[cur + x + 1] = gsum + self.g[prev + x + 1];
                self.b[cur + x + 1] = bsum + self.b[prev + x + 1];
            }
        }
    }

    /// Somme de `[x0, x1) × [y0, y1)` en quatre lectures par plan.
    #[inline(always)]
    #[must_use]
    pub fn rect_sum(&self, x0: u32, x1: u32, y0: u32, y1: u32) -> ChannelSums {
        let s = self.stride;
        let a = y0 as usize * s + x0 as usize;
        let b = y0 as usize * s + x1 as usize;
        let c = y1 as usize * s + x0 as usize;
        let d = y1 as usize * s + x1 as usize;
        let q = |p: &[u64]| p[d] + p[a] - p[c] - p[b];
        ChannelSums {
            r: q(&self.r),
            g: q(&self.g),
            b: q(&self.b),
        }
    }

    /// Dimensions logiques `(w+1, h+1)` du dernier build.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.stride, self.rows)
    }

    /// Entrées allouées par plan.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.r.len()
    }

    /// Libère les plans.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}
