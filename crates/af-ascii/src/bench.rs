use std::time::{Duration, Instant};

use serde::Serialize;

use crate::reduce::AccelMode;

/// Statistiques de temps de conversion pour un mode d'accélération.
///
/// Les `warmup` premières frames après activation/reset sont comptées mais
/// exclues des agrégats.
///
/// # Example
/// ```
/// use af_ascii::bench::BenchmarkStats;
/// use std::time::Duration;
/// let mut stats = BenchmarkStats::default();
/// for _ in 0..4 {
///     stats.record(Duration::from_millis(2), 3);
/// }
/// assert_eq!(stats.frame_count, 4);
/// assert_eq!(stats.measured_frames(), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize)]
pub struct BenchmarkStats {
    /// Frames enregistrées, chauffe comprise.
    pub frame_count: u32,
    /// Frames de chauffe consommées.
    pub warmup_count: u32,
    /// Cumul des frames mesurées (ms).
    pub total_ms: f64,
    /// Plus courte frame mesurée (ms), 0.0 si aucune.
    pub min_ms: f64,
    /// Plus longue frame mesurée (ms).
    pub max_ms: f64,
    /// `total_ms / measured_frames`.
    pub avg_ms: f64,
    /// FPS sur la dernière fenêtre glissante d'une seconde.
    pub current_fps: f64,
    #[serde(skip)]
    fps_window_start: Option<Instant>,
    #[serde(skip)]
    fps_window_frames: u32,
}

impl BenchmarkStats {
    /// Enregistre une frame de durée `elapsed`.
    pub fn record(&mut self, elapsed: Duration, warmup: u32) {
        self.record_at(elapsed, warmup, Instant::now());
    }

    fn record_at(&mut self, elapsed: Duration, warmup: u32, now: Instant) {
        self.frame_count = self.frame_count.saturating_add(1);

        if self.warmup_count < warmup {
            self.warmup_count += 1;
        } else {
            let ms = elapsed.as_secs_f64() * 1000.0;
            let measured = self.measured_frames();
            self.total_ms += ms;
            if measured == 1 || ms < self.min_ms {
                self.min_ms = ms;
            }
            if ms > self.max_ms {
                self.max_ms = ms;
            }
            self.avg_ms = self.total_ms / f64::from(measured);
        }

        self.fps_window_frames += 1;
        match self.fps_window_start {
            None => self.fps_window_start = Some(now),
            Some(start) => {
                let window = now.duration_since(start).as_secs_f64();
                if window >= 1.0 {
                    self.current_fps = f64::from(self.fps_window_frames) / window;
                    self.fps_window_frames = 0;
                    self.fps_window_start = Some(now);
                }
            }
        }
    }

    /// Frames comptées dans les agrégats (hors chauffe).
    #[must_use]
    pub fn measured_frames(&self) -> u32 {
        self.frame_count - self.warmup_count
    }
}

/// Jeton de mesure retourné par [`Instrumentation::begin`].
#[derive(Clone, Copy, Debug)]
pub struct FrameToken(Instant);

/// Mesure optionnelle du temps de réduction, un jeu de stats par mode.
///
/// # Example
/// ```
/// use af_ascii::bench::Instrumentation;
/// use af_ascii::reduce::AccelMode;
/// let mut bench = Instrumentation::new(0);
/// bench.set_enabled(true);
/// let token = bench.begin().unwrap();
/// bench.end(token, AccelMode::Scalar);
/// assert_eq!(bench.stats(AccelMode::Scalar).measured_frames(), 1);
/// assert_eq!(bench.stats(AccelMode::Vectorized).frame_count, 0);
/// ```
#[derive(Debug)]
pub struct Instrumentation {
    enabled: bool,
    warmup: u32,
    vectorized: BenchmarkStats,
    scalar: BenchmarkStats,
}

impl Instrumentation {
    #[must_use]
    pub fn new(warmup: u32) -> Self {
        Self {
            enabled: false,
            warmup,
            vectorized: BenchmarkStats::default(),
            scalar: BenchmarkStats::default(),
        }
    }

    /// Active/désactive la mesure. L'activation remet les stats à zéro.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.reset();
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Change la chauffe ; s'applique aux frames suivantes.
    pub fn set_warmup(&mut self, warmup: u32) {
        self.warmup = warmup;
    }

    pub fn reset(&mut self) {
        self.vectorized = BenchmarkStats::default();
        self.scalar = BenchmarkStats::default();
    }

    /// Début de mesure ; `None` si la mesure est désactivée.
    #[must_use]
    pub fn begin(&self) -> Option<FrameToken> {
        self.enabled.then(|| FrameToken(Instant::now()))
    }

    /// Fin de mesure : enregistre dans les stats du mode et retourne la durée.
    pub fn end(&mut self, token: FrameToken, mode: AccelMode) -> Duration {
        let elapsed = token.0.elapsed();
        let warmup = self.warmup;
        self.stats_mut(mode).record(elapsed, warmup);
        elapsed
    }

    #[must_use]
    pub fn stats(&self, mode: AccelMode) -> &BenchmarkStats {
        match mode {
            AccelMode::Vectorized => &self.vectorized,
            AccelMode::Scalar => &self.scalar,
        }
    }

    fn stats_mut(&mut self, mode: AccelMode) -> &mut BenchmarkStats {
        match mode {
            AccelMode::Vectorized => &mut self.vectorized,
            AccelMode::Scalar => &mut self.scalar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_frames_are_excluded() {
        let mut stats = BenchmarkStats::default();
        let times = [50, 40, 30, 4, 2, 6, 3, 5];
        for ms in times {
            stats.record(Duration::from_millis(ms), 3);
        }
        assert_eq!(stats.frame_count, 8);
        assert_eq!(stats.measured_frames(), 5);
        assert!((stats.total_ms - 20.0).abs() < 1e-9);
        assert!((stats.avg_ms - stats.total_ms / 5.0).abs() < 1e-12);
        assert!((stats.min_ms - 2.0).abs() < 1e-9);
        assert!((stats.max_ms - 6.0).abs() < 1e-9);
    }

    #[test]
    fn disabled_instrumentation_yields_no_token() {
        let bench = Instrumentation::new(3);
        assert!(bench.begin().is_none());
    }

    #[test]
    fn modes_are_tracked_separately() {
        let mut bench = Instrumentation::new(1);
        bench.set_enabled(true);
        for _ in 0..3 {
            let t = bench.begin().unwrap();
            bench.end(t, AccelMode::Vectorized);
        }
        let t = bench.begin().unwrap();
        bench.end(t, AccelMode::Scalar);
        assert_eq!(bench.stats(AccelMode::Vectorized).measured_frames(), 2);
        assert_eq!(bench.stats(AccelMode::Scalar).measured_frames(), 0);
        assert_eq!(bench.stats(AccelMode::Scalar).warmup_count, 1);

        bench.set_enabled(true);
        assert_eq!(bench.stats(AccelMode::Vectorized).frame_count, 0);
    }

    #[test]
    fn fps_window_rolls_after_one_second() {
        let mut stats = BenchmarkStats::default();
        let t0 = Instant::now();
        stats.record_at(Duration::ZERO, 0, t0);
        for i in 1..=10 {
            stats.record_at(Duration::ZERO, 0, t0 + Duration::from_millis(i * 100));
        }
        assert!(stats.current_fps > 0.0);
        assert_eq!(stats.fps_window_frames, 0);
    }
}
