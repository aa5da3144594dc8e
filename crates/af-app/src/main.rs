use anyhow::{Context, Result};
use clap::Parser;

pub mod cli;
pub mod pipeline;
pub mod report;

use af_ascii::converter::AsciiConverter;
use af_export::OutputFormat;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source et le format
    cli.validate_source()?;
    let format = OutputFormat::from_name(&cli.format).with_context(|| {
        format!(
            "Format inconnu : {}. Supportés : cells, text, html, ansi",
            cli.format
        )
    })?;

    // 4. Charger la config (+ overrides CLI)
    let config = pipeline::resolve_config(&cli)?;

    // 5. Source et convertisseur
    let (mut source, source_name) = pipeline::open_source(&cli)?;
    let mut converter = AsciiConverter::new(config)?;
    converter.init();

    // 6. Benchmark optionnel
    if let Some(frames) = cli.bench {
        let report = pipeline::run_benchmark(&mut converter, source.as_mut(), &source_name, frames);
        let rendered = match cli.report.as_str() {
            "json" => report.to_json().context("Sérialisation du rapport")?,
            "text" => report.to_text(),
            other => anyhow::bail!("Format de rapport inconnu : {other}. Supportés : text, json"),
        };
        // Le rapport va sur stderr quand la grille occupe stdout.
        if cli.out.is_some() {
            println!("{rendered}");
        } else {
            eprintln!("{rendered}");
        }
    }

    // 7. Conversion et sortie
    let serializer = format.serializer();
    let bytes = pipeline::convert_once(&mut converter, source.as_mut(), serializer.as_ref())?;
    pipeline::write_output(cli.out.as_deref(), &bytes)?;

    converter.shutdown();
    Ok(())
}
