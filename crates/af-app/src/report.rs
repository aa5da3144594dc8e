use std::fmt::Write as _;

use af_ascii::bench::BenchmarkStats;
use af_ascii::reduce::AccelMode;
use serde::Serialize;

/// Statistiques d'un mode d'accélération dans le rapport.
#[derive(Debug, Serialize)]
pub struct ModeReport {
    pub mode: &'static str,
    pub measured_frames: u32,
    #[serde(flatten)]
    pub stats: BenchmarkStats,
}

impl ModeReport {
    #[must_use]
    pub fn new(mode: AccelMode, stats: &BenchmarkStats) -> Self {
        Self {
            mode: mode.label(),
            measured_frames: stats.measured_frames(),
            stats: stats.clone(),
        }
    }
}

/// Rapport de benchmark, rendu en texte ou en JSON.
#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub source: String,
    pub source_size: (u32, u32),
    pub grid: (u16, u16),
    pub frames: u32,
    pub warmup_frames: u32,
    pub vectorized_supported: bool,
    pub modes: Vec<ModeReport>,
    /// Temps moyen scalaire / temps moyen vectoriel.
    pub speedup: Option<f64>,
}

impl BenchReport {
    #[must_use]
    pub fn new(
        source: String,
        source_size: (u32, u32),
        grid: (u16, u16),
        frames: u32,
        warmup_frames: u32,
        vectorized_supported: bool,
        modes: Vec<ModeReport>,
    ) -> Self {
        let avg = |label: &str| {
            modes
                .iter()
                .find(|m| m.mode == label && m.measured_frames > 0)
                .map(|m| m.stats.avg_ms)
        };
        let speedup = match (
            avg(AccelMode::Scalar.label()),
            avg(AccelMode::Vectorized.label()),
        ) {
            (Some(scalar), Some(simd)) if simd > 0.0 => Some(scalar / simd),
            _ => None,
        };
        Self {
            source,
            source_size,
            grid,
            frames,
            warmup_frames,
            vectorized_supported,
            modes,
            speedup,
        }
    }

    /// Rapport lisible, une ligne par mode.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "source {} ({}×{}) → grille {}×{}, {} frames, chauffe {}",
            self.source,
            self.source_size.0,
            self.source_size.1,
            self.grid.0,
            self.grid.1,
            self.frames,
            self.warmup_frames
        );
        let _ = writeln!(
            s,
            "voies SIMD natives : {}",
            if self.vectorized_supported { "oui" } else { "non (émulées)" }
        );
        for m in &self.modes {
            let _ = writeln!(
                s,
                "{:>6} : {:>4} mesurées  avg {:>8.3} ms  min {:>8.3} ms  max {:>8.3} ms  total {:>9.3} ms  {:>7.1} fps",
                m.mode,
                m.measured_frames,
                m.stats.avg_ms,
                m.stats.min_ms,
                m.stats.max_ms,
                m.stats.total_ms,
                m.stats.current_fps
            );
        }
        if let Some(speedup) = self.speedup {
            let _ = writeln!(s, "accélération simd/scalar : ×{speedup:.2}");
        }
        s
    }

    /// Sérialisation JSON indentée.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
