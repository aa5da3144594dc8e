use std::io::Write;
use std::path::Path;

use af_ascii::converter::{AsciiConverter, ConvertOutcome};
use af_ascii::reduce::AccelMode;
use af_core::config::ConverterConfig;
use af_core::traits::{GridSerializer, Source};
use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::report::{BenchReport, ModeReport};

/// Resolve config: --config if present, defaults otherwise, then CLI overrides.
///
/// # Errors
/// Returns an error if the config file exists but cannot be parsed.
pub fn resolve_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut config = if cli.config.exists() {
        af_core::config::load_config(&cli.config)?
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        ConverterConfig::default()
    };
    apply_overrides(&mut config, cli);
    Ok(config)
}

/// Applique les options CLI par-dessus la configuration chargée.
pub fn apply_overrides(config: &mut ConverterConfig, cli: &Cli) {
    if let Some(w) = cli.width {
        config.output_width = w;
    }
    if let Some(h) = cli.height {
        config.output_height = h;
    }
    if let Some(ref charset) = cli.charset {
        config.charset = af_core::charset::charset_preset(charset)
            .map_or_else(|| charset.clone(), str::to_string);
    }
    if let Some(gamma) = cli.gamma {
        config.gamma = gamma;
    }
    if let Some(warmup) = cli.warmup {
        config.warmup_frames = warmup;
    }
    if cli.scalar {
        config.vectorized = false;
    }
    config.clamp_all();
}

/// Start the visual source selected on the command line.
///
/// # Errors
/// Returns an error if the image cannot be loaded or the pattern is unknown.
pub fn open_source(cli: &Cli) -> Result<(Box<dyn Source>, String)> {
    if let Some(ref path) = cli.image {
        let source = af_source::image::ImageSource::new(path)?;
        return Ok((Box::new(source), path.display().to_string()));
    }
    if let Some(ref name) = cli.pattern {
        let (w, h) = cli.pattern_size;
        let source = af_source::pattern::create_pattern_source(name, w, h)?;
        return Ok((source, format!("pattern:{name}")));
    }
    anyhow::bail!("Aucune source visuelle spécifiée.")
}

/// Convertit la prochaine frame de `source` et la sérialise.
///
/// # Errors
/// Returns an error if the source is exhausted or the frame is rejected.
pub fn convert_once(
    converter: &mut AsciiConverter,
    source: &mut dyn Source,
    serializer: &dyn GridSerializer,
) -> Result<Vec<u8>> {
    let frame = source.next_frame().context("Source épuisée")?;
    match converter.convert_frame(&frame) {
        ConvertOutcome::Converted { cells } => {
            log::debug!("{cells} cellules converties ({}×{})", frame.width, frame.height);
        }
        ConvertOutcome::Skipped(reason) => {
            anyhow::bail!(
                "Frame {}×{} rejetée : {reason:?}",
                frame.width,
                frame.height
            );
        }
    }
    let mut out = Vec::with_capacity(converter.buffer_size());
    let written = serializer.serialize(converter.buffer(), &mut out);
    log::debug!("Sortie {} : {written} octets", serializer.name());
    Ok(out)
}

/// Convertit `frames` frames avec chaque mode d'accélération, mesure activée.
///
/// Les statistiques sont remises à zéro une fois au début ; les deux modes
/// ont chacun leur propre chauffe.
pub fn run_benchmark(
    converter: &mut AsciiConverter,
    source: &mut dyn Source,
    source_name: &str,
    frames: u32,
) -> BenchReport {
    let initial_mode = converter.vectorized();
    converter.set_benchmark_mode(true);

    let mut source_size = source.native_size();
    for mode in [AccelMode::Vectorized, AccelMode::Scalar] {
        converter.set_vectorized(mode == AccelMode::Vectorized);
        for i in 0..frames {
            let Some(frame) = source.next_frame() else {
                log::warn!("Source épuisée après {i} frames ({})", mode.label());
                break;
            };
            source_size = (frame.width, frame.height);
            if !converter.convert_frame(&frame).is_converted() {
                log::warn!("Frame {i} rejetée ({})", mode.label());
            }
        }
        log::info!(
            "Benchmark {} : {:.3} ms/frame",
            mode.label(),
            converter.benchmark_stats(mode).avg_ms
        );
    }

    converter.set_benchmark_mode(false);
    converter.set_vectorized(initial_mode);

    let config = converter.config();
    let modes = [AccelMode::Vectorized, AccelMode::Scalar]
        .into_iter()
        .map(|mode| ModeReport::new(mode, converter.benchmark_stats(mode)))
        .collect();
    BenchReport::new(
        source_name.to_string(),
        source_size,
        (config.output_width, config.output_height),
        frames,
        config.warmup_frames,
        converter.is_vectorized_supported(),
        modes,
    )
}

/// Écrit `bytes` dans `path`, ou sur stdout si absent.
///
/// # Errors
/// Returns an error if the destination cannot be written.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Impossible d'écrire {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Écriture stdout")?;
            stdout.flush().context("Écriture stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use af_export::OutputFormat;
    use af_source::pattern::{Pattern, PatternSource};
    use clap::Parser;

    use super::*;

    fn converter(w: u16, h: u16) -> AsciiConverter {
        let config = ConverterConfig {
            output_width: w,
            output_height: h,
            ..ConverterConfig::default()
        };
        let mut conv = AsciiConverter::new(config).unwrap();
        conv.init();
        conv
    }

    #[test]
    fn overrides_are_clamped() {
        let cli = Cli::parse_from(["afconv", "--pattern", "checker", "--width", "5000", "--scalar"]);
        let mut config = ConverterConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.output_width, 1024);
        assert_eq!(config.output_height, 80);
        assert!(!config.vectorized);
    }

    #[test]
    fn charset_accepts_presets_and_literals() {
        let mut config = ConverterConfig::default();
        let cli = Cli::parse_from(["afconv", "--pattern", "checker", "--charset", "minimal"]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.charset, af_core::charset::CHARSET_MINIMAL);

        let cli = Cli::parse_from(["afconv", "--pattern", "checker", "--charset", " o0", "--gamma", "1"]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.charset, " o0");
        assert!((config.gamma - 1.0).abs() < f32::EPSILON);

        // Palette invalide : repli sur la palette compacte.
        let cli = Cli::parse_from(["afconv", "--pattern", "checker", "--charset", "x"]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.charset, af_core::charset::CHARSET_COMPACT);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let cli = Cli::parse_from([
            "afconv",
            "--pattern",
            "gradient",
            "--config",
            path.to_str().unwrap(),
        ]);
        assert_eq!(resolve_config(&cli).unwrap(), ConverterConfig::default());
    }

    #[test]
    fn config_file_is_merged_then_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afconv.toml");
        std::fs::write(&path, "[converter]\noutput_width = 100\nwarmup_frames = 7\n").unwrap();
        let cli = Cli::parse_from([
            "afconv",
            "--pattern",
            "gradient",
            "--warmup",
            "2",
            "--config",
            path.to_str().unwrap(),
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.output_width, 100);
        assert_eq!(config.warmup_frames, 2);
    }

    #[test]
    fn text_output_has_one_line_per_row() {
        let mut conv = converter(20, 6);
        let mut source = PatternSource::new(Pattern::Checker, 64, 48);
        let ser = OutputFormat::Text.serializer();
        let out = convert_once(&mut conv, &mut source, ser.as_ref()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().all(|l| l.chars().count() == 20));
    }

    #[test]
    fn benchmark_covers_both_modes() {
        let mut conv = converter(40, 20);
        conv.set_warmup_frames(2);
        let mut source = PatternSource::new(Pattern::Plasma, 80, 60);
        let report = run_benchmark(&mut conv, &mut source, "pattern:plasma", 6);
        assert_eq!(report.modes.len(), 2);
        for mode in &report.modes {
            assert_eq!(mode.stats.frame_count, 6);
            assert_eq!(mode.measured_frames, 4);
        }
        assert_eq!(report.grid, (40, 20));
        assert!(!conv.benchmark_mode());
        assert!(conv.vectorized());
    }
}
