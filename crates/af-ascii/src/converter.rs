use std::sync::Arc;

use af_core::clock::FrameClock;
use af_core::config::ConverterConfig;
use af_core::error::CoreError;
use af_core::frame::{AsciiCell, AsciiGrid, CELL_BYTES, PixelFrame};

use crate::bench::{BenchmarkStats, Instrumentation};
use crate::integral::IntegralImage;
use crate::lanes;
use crate::lut::LookupTables;
use crate::reduce::{self, AccelMode, ChannelPlanes};
use crate::region::RegionMap;

/// Raison d'une conversion ignorée (aucune écriture en sortie).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Slice source vide.
    NoSource,
    /// Une dimension source ou sortie est nulle.
    ZeroDimension,
    /// Moins de `source_w × source_h` pixels fournis.
    SourceTooShort,
    /// Le buffer de sortie ne contient pas `output_w × output_h` cellules.
    OutputTooSmall,
}

/// Résultat d'un appel à `convert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// `cells` cellules écrites.
    Converted { cells: usize },
    /// Entrée invalide : sortie laissée dans son état précédent.
    Skipped(SkipReason),
}

impl ConvertOutcome {
    #[must_use]
    pub fn is_converted(self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

/// Convertisseur pixel → grille ASCII. Possède tout l'état réutilisé
/// d'une frame à l'autre : tables, carte de régions, image intégrale,
/// plans temporaires, buffer de sortie, statistiques et compteurs.
///
/// Pas de verrou : un seul appelant à la fois (`&mut self`).
///
/// # Example
/// ```
/// use af_ascii::converter::AsciiConverter;
/// use af_core::config::ConverterConfig;
///
/// let mut conv = AsciiConverter::new(ConverterConfig::default()).unwrap();
/// conv.init();
/// let white = vec![0xFFFF_FFFF_u32; 16];
/// assert!(conv.convert(&white, 4, 4, 2, 2).is_converted());
/// assert!(conv.buffer().cells.iter().all(|c| c.ch == '@'));
/// ```
pub struct AsciiConverter {
    config: ConverterConfig,
    tables: Option<LookupTables>,
    initialized: bool,
    regions: RegionMap,
    integral: IntegralImage,
    planes: ChannelPlanes,
    grid: AsciiGrid,
    capacity: usize,
    vectorized: bool,
    bench: Instrumentation,
    clock: Arc<FrameClock>,
}

impl AsciiConverter {
    /// Crée un convertisseur. Le buffer de sortie est dimensionné par
    /// `output_width × output_height` de la configuration.
    ///
    /// # Errors
    /// Returns an error if the configured charset is not a valid palette.
    pub fn new(config: ConverterConfig) -> Result<Self, CoreError> {
        // Validation immédiate ; les tables elles-mêmes sont bâties par `init`.
        af_core::charset::Palette::new(&config.charset)?;
        let capacity = config.max_cells();
        let mut grid = AsciiGrid::new(config.output_width, config.output_height);
        grid.cells.reserve_exact(capacity.saturating_sub(grid.cells.len()));
        let mut bench = Instrumentation::new(config.warmup_frames);
        bench.set_enabled(config.benchmark);
        Ok(Self {
            vectorized: config.vectorized,
            config,
            tables: None,
            initialized: false,
            regions: RegionMap::new(),
            integral: IntegralImage::new(),
            planes: ChannelPlanes::default(),
            grid,
            capacity,
            bench,
            clock: Arc::new(FrameClock::new()),
        })
    }

    // === Cycle de vie ===

    /// Construit les tables et remet la sortie à zéro. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.ensure_tables();
        self.grid.clear();
        self.initialized = true;
        log::info!(
            "Convertisseur initialisé : {}×{} cellules, palette {:?}",
            self.config.output_width,
            self.config.output_height,
            self.config.charset
        );
    }

    /// Libère les buffers agrandis et oublie les dimensions en cache. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.integral.release();
        self.regions.release();
        self.planes.release();
        log::info!("Convertisseur arrêté, buffers libérés");
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_tables(&mut self) -> &LookupTables {
        let config = &self.config;
        self.tables.get_or_insert_with(|| {
            // Palette validée dans `new`/`set_palette` : le repli n'arrive pas.
            LookupTables::new(&config.charset, config.gamma).unwrap_or_default()
        })
    }

    /// Change palette et/ou gamma ; les tables ne sont reconstruites que si
    /// l'un des deux diffère.
    ///
    /// # Errors
    /// Returns an error if `charset` is not a valid palette; the current
    /// tables stay in use.
    pub fn set_palette(&mut self, charset: &str, gamma: f32) -> Result<(), CoreError> {
        match self.tables.as_mut() {
            Some(tables) => {
                tables.ensure(charset, gamma)?;
            }
            None => self.tables = Some(LookupTables::new(charset, gamma)?),
        }
        self.config.charset = charset.to_string();
        self.config.gamma = gamma;
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    // === Conversion ===

    /// Convertit `pixels` (`source_w × source_h`, packés `0xAARRGGBB`) dans
    /// le buffer interne redimensionné en `output_w × output_h`.
    ///
    /// Entrée invalide ou grille plus grande que la capacité : aucune écriture.
    pub fn convert(
        &mut self,
        pixels: &[u32],
        source_w: u32,
        source_h: u32,
        output_w: u16,
        output_h: u16,
    ) -> ConvertOutcome {
        let cells = usize::from(output_w) * usize::from(output_h);
        if cells > self.capacity {
            log::trace!("Conversion ignorée : {cells} cellules > capacité {}", self.capacity);
            return ConvertOutcome::Skipped(SkipReason::OutputTooSmall);
        }
        if let Err(reason) = validate(pixels, source_w, source_h, output_w, output_h, cells) {
            log::trace!("Conversion ignorée : {reason:?}");
            return ConvertOutcome::Skipped(reason);
        }
        self.grid.reshape(output_w, output_h);
        let mut grid = std::mem::take(&mut self.grid.cells);
        let outcome = self.run(pixels, source_w, source_h, output_w, output_h, &mut grid);
        self.grid.cells = grid;
        outcome
    }

    /// Convertit vers un buffer fourni par l'appelant (`output_w × output_h`
    /// premières cellules écrites).
    pub fn convert_into(
        &mut self,
        pixels: &[u32],
        source_w: u32,
        source_h: u32,
        out: &mut [AsciiCell],
        output_w: u16,
        output_h: u16,
    ) -> ConvertOutcome {
        let cells = usize::from(output_w) * usize::from(output_h);
        if let Err(reason) = validate(pixels, source_w, source_h, output_w, output_h, cells) {
            log::trace!("Conversion ignorée : {reason:?}");
            return ConvertOutcome::Skipped(reason);
        }
        if out.len() < cells {
            log::trace!("Conversion ignorée : sortie de {} cellules < {cells}", out.len());
            return ConvertOutcome::Skipped(SkipReason::OutputTooSmall);
        }
        self.run(pixels, source_w, source_h, output_w, output_h, &mut out[..cells])
    }

    /// Convertit une frame aux dimensions de grille configurées.
    pub fn convert_frame(&mut self, frame: &PixelFrame) -> ConvertOutcome {
        let (w, h) = (self.config.output_width, self.config.output_height);
        self.convert(&frame.data, frame.width, frame.height, w, h)
    }

    fn run(
        &mut self,
        pixels: &[u32],
        source_w: u32,
        source_h: u32,
        output_w: u16,
        output_h: u16,
        out: &mut [AsciiCell],
    ) -> ConvertOutcome {
        // Hors mesure : tables et carte de régions.
        self.ensure_tables();
        self.regions
            .build(source_w, source_h, u32::from(output_w), u32::from(output_h));

        let mode = self.accel_mode();
        let token = self.bench.begin();

        if let Some(tables) = self.tables.as_ref() {
            reduce::reduce_frame(
                mode,
                tables,
                &self.regions,
                &mut self.integral,
                &mut self.planes,
                pixels,
                out,
            );
        }

        if let Some(token) = token {
            self.bench.end(token, mode);
        }
        self.clock.tick();
        ConvertOutcome::Converted { cells: out.len() }
    }

    // === Buffer de sortie ===

    /// Vue de la dernière grille écrite par [`Self::convert`].
    #[must_use]
    pub fn buffer(&self) -> &AsciiGrid {
        &self.grid
    }

    /// Capacité du buffer de sortie en octets (cellules packées).
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.capacity * CELL_BYTES
    }

    /// Capacité en cellules.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // === Accélération ===

    pub fn set_vectorized(&mut self, enabled: bool) {
        if enabled && !lanes::is_vectorized_supported() {
            log::debug!("Voies SIMD émulées sur cette cible");
        }
        self.vectorized = enabled;
    }

    #[must_use]
    pub fn vectorized(&self) -> bool {
        self.vectorized
    }

    #[must_use]
    pub fn is_vectorized_supported(&self) -> bool {
        lanes::is_vectorized_supported()
    }

    #[must_use]
    pub fn accel_mode(&self) -> AccelMode {
        AccelMode::from_flag(self.vectorized)
    }

    // === Benchmark ===

    /// Active/désactive la mesure ; l'activation remet les stats à zéro.
    pub fn set_benchmark_mode(&mut self, enabled: bool) {
        self.bench.set_enabled(enabled);
    }

    #[must_use]
    pub fn benchmark_mode(&self) -> bool {
        self.bench.enabled()
    }

    pub fn reset_benchmark_stats(&mut self) {
        self.bench.reset();
    }

    /// Change le nombre de frames de chauffe ; effet sur les frames suivantes.
    pub fn set_warmup_frames(&mut self, warmup: u32) {
        self.config.warmup_frames = warmup;
        self.bench.set_warmup(warmup);
    }

    #[must_use]
    pub fn benchmark_stats(&self, mode: AccelMode) -> &BenchmarkStats {
        self.bench.stats(mode)
    }

    // === Compteurs ===

    #[must_use]
    pub fn frame_id(&self) -> u32 {
        self.clock.frame_id()
    }

    #[must_use]
    pub fn last_ms(&self) -> f64 {
        self.clock.last_ms()
    }

    /// Horloge partageable avec un thread de reporting.
    #[must_use]
    pub fn clock(&self) -> Arc<FrameClock> {
        Arc::clone(&self.clock)
    }
}

fn validate(
    pixels: &[u32],
    source_w: u32,
    source_h: u32,
    output_w: u16,
    output_h: u16,
    cells: usize,
) -> Result<(), SkipReason> {
    if pixels.is_empty() {
        return Err(SkipReason::NoSource);
    }
    if source_w == 0 || source_h == 0 || output_w == 0 || output_h == 0 || cells == 0 {
        return Err(SkipReason::ZeroDimension);
    }
    let needed = u64::from(source_w) * u64::from(source_h);
    if (pixels.len() as u64) < needed {
        return Err(SkipReason::SourceTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use af_core::color::pack_rgb;

    use super::*;

    fn converter() -> AsciiConverter {
        let mut conv = AsciiConverter::new(ConverterConfig::default()).unwrap();
        conv.init();
        conv
    }

    fn noise(len: usize) -> Vec<u32> {
        let mut s = 0x1234_5678_u32;
        (0..len)
            .map(|_| {
                s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                s
            })
            .collect()
    }

    #[test]
    fn solid_white_scenario() {
        let mut conv = converter();
        assert_eq!(
            conv.convert(&[0xFFFF_FFFF; 16], 4, 4, 2, 2),
            ConvertOutcome::Converted { cells: 4 }
        );
        let g = LookupTables::default().gamma(255);
        for cell in &conv.buffer().cells {
            assert_eq!(cell.ch, '@');
            assert_eq!(cell.fg, (g, g, g));
        }
    }

    #[test]
    fn solid_black_scenario() {
        let mut conv = converter();
        let black = vec![0xFF00_0000; 37 * 23];
        conv.convert(&black, 37, 23, 11, 7);
        assert!(conv.buffer().cells.iter().all(|c| c.ch == ' ' && c.fg == (0, 0, 0)));
    }

    #[test]
    fn invalid_input_leaves_buffer_untouched() {
        let mut conv = converter();
        conv.convert(&[0xFFFF_FFFF; 16], 4, 4, 2, 2);
        let before = conv.buffer().clone();
        let id = conv.frame_id();

        assert_eq!(
            conv.convert(&[], 4, 4, 2, 2),
            ConvertOutcome::Skipped(SkipReason::NoSource)
        );
        assert_eq!(
            conv.convert(&[0; 16], 0, 4, 2, 2),
            ConvertOutcome::Skipped(SkipReason::ZeroDimension)
        );
        assert_eq!(
            conv.convert(&[0; 16], 4, 4, 0, 2),
            ConvertOutcome::Skipped(SkipReason::ZeroDimension)
        );
        assert_eq!(
            conv.convert(&[0; 15], 4, 4, 2, 2),
            ConvertOutcome::Skipped(SkipReason::SourceTooShort)
        );
        assert_eq!(
            conv.convert(&[0; 16], 4, 4, 241, 80),
            ConvertOutcome::Skipped(SkipReason::OutputTooSmall)
        );
        assert_eq!(conv.buffer(), &before);
        assert_eq!(conv.frame_id(), id);
    }

    #[test]
    fn convert_is_idempotent() {
        let mut conv = converter();
        let px = noise(320 * 200);
        conv.convert(&px, 320, 200, 240, 80);
        let first = conv.buffer().clone();
        conv.convert(&px, 320, 200, 240, 80);
        assert_eq!(conv.buffer(), &first);
    }

    #[test]
    fn vectorized_and_scalar_are_identical() {
        let mut conv = converter();
        for &(sw, sh, ow, oh) in &[(320, 200, 240, 80), (97, 61, 13, 7), (5, 3, 9, 5), (8, 8, 4, 4)] {
            let px = noise((sw * sh) as usize);
            conv.set_vectorized(true);
            conv.convert(&px, sw, sh, ow, oh);
            let simd = conv.buffer().clone();
            conv.set_vectorized(false);
            conv.convert(&px, sw, sh, ow, oh);
            assert_eq!(conv.buffer(), &simd, "{sw}×{sh} → {ow}×{oh}");
        }
    }

    #[test]
    fn single_cell_over_frame_whose_sums_exceed_32_bits() {
        // 4110² pixels à 255 : somme par canal > 2^32.
        let side = 4110u32;
        assert!(u64::from(side) * u64::from(side) * 255 > u64::from(u32::MAX));
        let white = vec![0xFFFF_FFFF_u32; (side * side) as usize];
        let mut conv = converter();
        for vectorized in [true, false] {
            conv.set_vectorized(vectorized);
            assert!(conv.convert(&white, side, side, 1, 1).is_converted());
            let g = LookupTables::default().gamma(255);
            assert_eq!(conv.buffer().cells[0], AsciiCell { ch: '@', fg: (g, g, g) });
        }
    }

    #[test]
    fn upscaled_output_has_no_degenerate_cells() {
        let mut conv = converter();
        let px = vec![pack_rgb(255, 255, 255); 3 * 2];
        conv.convert(&px, 3, 2, 5, 4);
        assert_eq!(conv.buffer().cells.len(), 20);
        assert!(conv.buffer().cells.iter().all(|c| c.ch == '@'));
    }

    #[test]
    fn convert_into_caller_buffer() {
        let mut conv = converter();
        let mut out = vec![AsciiCell::default(); 10];
        let outcome = conv.convert_into(&[0xFFFF_FFFF; 16], 4, 4, &mut out, 3, 3);
        assert_eq!(outcome, ConvertOutcome::Converted { cells: 9 });
        assert!(out[..9].iter().all(|c| c.ch == '@'));
        assert_eq!(out[9], AsciiCell::default());
        assert_eq!(
            conv.convert_into(&[0; 16], 4, 4, &mut out, 4, 4),
            ConvertOutcome::Skipped(SkipReason::OutputTooSmall)
        );
    }

    #[test]
    fn benchmark_warmup_then_five_frames() {
        let mut conv = converter();
        conv.set_vectorized(false);
        conv.set_benchmark_mode(true);
        let px = noise(64 * 64);
        let warmup = conv.config().warmup_frames;
        for _ in 0..warmup + 5 {
            conv.convert(&px, 64, 64, 32, 16);
        }
        let stats = conv.benchmark_stats(AccelMode::Scalar);
        assert_eq!(stats.measured_frames(), 5);
        assert_eq!(stats.frame_count, warmup + 5);
        assert!((stats.avg_ms - stats.total_ms / 5.0).abs() < 1e-12);
        assert_eq!(conv.benchmark_stats(AccelMode::Vectorized).frame_count, 0);

        conv.reset_benchmark_stats();
        assert_eq!(conv.benchmark_stats(AccelMode::Scalar).frame_count, 0);
        assert!(conv.benchmark_mode());
    }

    #[test]
    fn frame_counter_advances_per_conversion() {
        let mut conv = converter();
        let clock = conv.clock();
        conv.convert(&[0; 4], 2, 2, 1, 1);
        conv.convert(&[0; 4], 2, 2, 1, 1);
        assert_eq!(clock.frame_id(), 2);
        assert!(conv.last_ms() > 0.0);
    }

    #[test]
    fn shutdown_forces_rebuild_and_is_idempotent() {
        let mut conv = converter();
        conv.convert(&[0xFFFF_FFFF; 16], 4, 4, 2, 2);
        conv.shutdown();
        conv.shutdown();
        assert!(!conv.is_initialized());
        assert!(conv.regions.dims().is_none());
        assert_eq!(conv.integral.capacity(), 0);
        // Utilisable sans réinitialisation explicite.
        assert!(conv.convert(&[0xFFFF_FFFF; 16], 4, 4, 2, 2).is_converted());
        conv.init();
        assert!(conv.buffer().cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn palette_change_rebuilds_tables() {
        let mut conv = converter();
        conv.set_palette(" #", 1.0).unwrap();
        conv.convert(&[0xFFFF_FFFF; 4], 2, 2, 1, 1);
        assert_eq!(conv.buffer().cells[0].ch, '#');
        assert_eq!(conv.buffer().cells[0].fg, (255, 255, 255));
        assert!(conv.set_palette("x", 1.0).is_err());
        assert_eq!(conv.config().charset, " #");
    }

    #[test]
    fn buffer_size_matches_capacity() {
        let conv = converter();
        assert_eq!(conv.buffer_size(), 240 * 80 * 4);
    }

    #[test]
    fn invalid_palette_is_rejected_at_construction() {
        let config = ConverterConfig {
            charset: String::new(),
            ..ConverterConfig::default()
        };
        assert!(AsciiConverter::new(config).is_err());
    }
}
