use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{CHARSET_COMPACT, Palette};
use crate::color::DEFAULT_GAMMA;
use crate::error::CoreError;

/// Largeur de grille par défaut (colonnes).
pub const DEFAULT_OUTPUT_WIDTH: u16 = 240;
/// Hauteur de grille par défaut (lignes).
pub const DEFAULT_OUTPUT_HEIGHT: u16 = 80;
/// Frames de chauffe exclues des statistiques de benchmark.
pub const DEFAULT_WARMUP_FRAMES: u32 = 3;

/// Configuration du convertisseur.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use af_core::config::ConverterConfig;
/// let config = ConverterConfig::default();
/// assert_eq!(config.charset, " .:-=+*#%@");
/// assert_eq!(config.warmup_frames, 3);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ConverterConfig {
    // === Mapping ===
    /// Palette du plus clairsemé au plus dense.
    pub charset: String,
    /// Exposant gamma appliqué aux canaux de sortie.
    pub gamma: f32,

    // === Grille ===
    /// Colonnes de la grille ; fixe aussi la capacité du buffer de sortie.
    pub output_width: u16,
    /// Lignes de la grille.
    pub output_height: u16,

    // === Accélération & mesure ===
    /// Chemin vectoriel 4 voies activé.
    pub vectorized: bool,
    /// Mesure du temps de réduction par frame.
    pub benchmark: bool,
    /// Frames ignorées par les statistiques après activation/reset.
    pub warmup_frames: u32,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            charset: CHARSET_COMPACT.to_string(),
            gamma: DEFAULT_GAMMA,
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            vectorized: true,
            benchmark: false,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
        }
    }
}

impl ConverterConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        if !self.gamma.is_finite() {
            self.gamma = DEFAULT_GAMMA;
        }
        self.gamma = self.gamma.clamp(0.05, 4.0);
        self.output_width = self.output_width.clamp(1, 1024);
        self.output_height = self.output_height.clamp(1, 1024);
        self.warmup_frames = self.warmup_frames.min(1000);
        if Palette::new(&self.charset).is_err() {
            log::warn!("Palette invalide {:?}, retour à la palette compacte", self.charset);
            self.charset = CHARSET_COMPACT.to_string();
        }
    }

    /// Nombre de cellules du buffer de sortie.
    #[must_use]
    pub fn max_cells(&self) -> usize {
        usize::from(self.output_width) * usize::from(self.output_height)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    converter: ConverterSection,
}

/// Converter section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct ConverterSection {
    charset: Option<String>,
    gamma: Option<f32>,
    output_width: Option<u16>,
    output_height: Option<u16>,
    vectorized: Option<bool>,
    benchmark: Option<bool>,
    warmup_frames: Option<u32>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use af_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ConverterConfig> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse une configuration TOML en mémoire.
///
/// # Errors
/// Returns an error if the TOML is malformed or lacks a `[converter]` table.
///
/// # Example
/// ```
/// use af_core::config::parse_config;
/// let config = parse_config("[converter]\ngamma = 1.0\n").unwrap();
/// assert!((config.gamma - 1.0).abs() < f32::EPSILON);
/// assert_eq!(config.output_width, 240);
/// ```
pub fn parse_config(content: &str) -> Result<ConverterConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = ConverterConfig::default();

    let c = file.converter;
    if let Some(v) = c.charset {
        config.charset = v;
    }
    if let Some(v) = c.gamma {
        config.gamma = v;
    }
    if let Some(v) = c.output_width {
        config.output_width = v;
    }
    if let Some(v) = c.output_height {
        config.output_height = v;
    }
    if let Some(v) = c.vectorized {
        config.vectorized = v;
    }
    if let Some(v) = c.benchmark {
        config.benchmark = v;
    }
    if let Some(v) = c.warmup_frames {
        config.warmup_frames = v;
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[converter]\ncharset = \" .:#@\"\nwarmup_frames = 5").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.charset, " .:#@");
        assert_eq!(config.warmup_frames, 5);
        assert!(config.vectorized);
        assert_eq!(config.max_cells(), 240 * 80);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config =
            parse_config("[converter]\ngamma = 40.0\noutput_width = 0\ncharset = \"@\"").unwrap();
        assert!((config.gamma - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.output_width, 1);
        assert_eq!(config.charset, CHARSET_COMPACT);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = load_config(Path::new("/nonexistent/af.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { path }) if path.ends_with("af.toml")
        ));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config("[converter\ngamma = ").is_err());
    }
}
