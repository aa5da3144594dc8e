use std::path::PathBuf;

use clap::Parser;

/// afconv — convertit une image ou un motif synthétique en grille ASCII colorée.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source visuelle : chemin vers une image (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Motif synthétique : "gradient", "checker", "plasma".
    #[arg(long)]
    pub pattern: Option<String>,

    /// Taille du motif synthétique (pixels), format LxH.
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    pub pattern_size: (u32, u32),

    /// Colonnes de la grille de sortie (défaut : config).
    #[arg(long)]
    pub width: Option<u16>,

    /// Lignes de la grille de sortie (défaut : config).
    #[arg(long)]
    pub height: Option<u16>,

    /// Format de sortie : cells, text, html, ansi.
    #[arg(long, default_value = "ansi")]
    pub format: String,

    /// Fichier de sortie. Défaut : stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Palette : "compact", "standard", "minimal", ou glyphes littéraux
    /// du plus clairsemé au plus dense.
    #[arg(long)]
    pub charset: Option<String>,

    /// Exposant gamma des couleurs de sortie (défaut : config).
    #[arg(long)]
    pub gamma: Option<f32>,

    /// Forcer le chemin scalaire.
    #[arg(long, default_value_t = false)]
    pub scalar: bool,

    /// Benchmark sur N frames, pour chaque mode d'accélération.
    #[arg(long)]
    pub bench: Option<u32>,

    /// Frames de chauffe exclues des statistiques (défaut : config).
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Format du rapport de benchmark : text, json.
    #[arg(long, default_value = "text")]
    pub report: String,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one visual source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        let count = usize::from(self.image.is_some()) + usize::from(self.pattern.is_some());

        if count == 0 {
            anyhow::bail!("Aucune source visuelle spécifiée. Utilisez --image ou --pattern.");
        }
        if count > 1 {
            anyhow::bail!("Une seule source visuelle à la fois. Spécifiez --image OU --pattern.");
        }
        Ok(())
    }
}

/// Parse `LxH` (ex : `640x480`).
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("taille invalide « {s} », attendu LxH"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("largeur invalide : {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("hauteur invalide : {e}"))?;
    if w == 0 || h == 0 {
        return Err("dimensions nulles".to_string());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parser_accepts_both_separators() {
        assert_eq!(parse_size("320x200"), Ok((320, 200)));
        assert_eq!(parse_size("8X4"), Ok((8, 4)));
        assert!(parse_size("0x4").is_err());
        assert!(parse_size("320").is_err());
    }

    #[test]
    fn exactly_one_source_required() {
        let cli = Cli::parse_from(["afconv"]);
        assert!(cli.validate_source().is_err());
        let cli = Cli::parse_from(["afconv", "--pattern", "plasma", "--image", "a.png"]);
        assert!(cli.validate_source().is_err());
        let cli = Cli::parse_from(["afconv", "--pattern", "plasma", "--bench", "20"]);
        assert!(cli.validate_source().is_ok());
        assert_eq!(cli.bench, Some(20));
        assert_eq!(cli.pattern_size, (640, 480));
    }
}
