//! Sérialiseurs de grilles ASCII.
//!
//! Tous consomment la même grille uniforme `(glyphe, r, g, b)` produite par
//! le convertisseur ; aucun ne refait la réduction.

pub mod ansi;
pub mod cells;
pub mod html;
pub mod text;

use af_core::traits::GridSerializer;

pub use ansi::AnsiSerializer;
pub use cells::CellBytes;
pub use html::HtmlSerializer;
pub use text::PlainText;

/// Format de sortie sélectionnable par nom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Cells,
    Text,
    Html,
    Ansi,
}

impl OutputFormat {
    /// Parse un nom de format (`cells`, `text`, `html`, `ansi`).
    ///
    /// # Example
    /// ```
    /// use af_export::OutputFormat;
    /// assert_eq!(OutputFormat::from_name("HTML"), Some(OutputFormat::Html));
    /// assert_eq!(OutputFormat::from_name("svg"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cells" | "bytes" => Some(Self::Cells),
            "text" | "txt" => Some(Self::Text),
            "html" => Some(Self::Html),
            "ansi" => Some(Self::Ansi),
            _ => None,
        }
    }

    /// Sérialiseur par défaut pour ce format.
    #[must_use]
    pub fn serializer(self) -> Box<dyn GridSerializer> {
        match self {
            Self::Cells => Box::new(CellBytes),
            Self::Text => Box::new(PlainText),
            Self::Html => Box::new(HtmlSerializer::default()),
            Self::Ansi => Box::new(AnsiSerializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use af_core::frame::{AsciiCell, AsciiGrid};

    use super::*;

    #[test]
    fn every_format_serializes_the_same_grid() {
        let mut grid = AsciiGrid::new(3, 2);
        grid.set(1, 1, AsciiCell { ch: '#', fg: (200, 10, 10) });
        for format in [OutputFormat::Cells, OutputFormat::Text, OutputFormat::Html, OutputFormat::Ansi] {
            let ser = format.serializer();
            let mut out = Vec::new();
            let n = ser.serialize(&grid, &mut out);
            assert_eq!(n, out.len(), "{}", ser.name());
            assert!(n > 0);
        }
    }
}
