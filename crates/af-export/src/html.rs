use std::fmt::Write as _;

use af_core::frame::AsciiGrid;
use af_core::traits::GridSerializer;

/// Capacité par défaut : assez pour une grille 240×80 de couleurs toutes distinctes.
pub const DEFAULT_HTML_CAPACITY: usize = 240 * 80 * 48;

/// Balisage coloré : spans `color:rgb(...)` fusionnant les cellules
/// consécutives de même couleur, `<br>` en fin de rangée.
///
/// Borné par `capacity` octets : un span n'est jamais émis partiellement,
/// la sortie s'arrête au premier fragment qui ne tient plus.
///
/// # Example
/// ```
/// use af_core::frame::{AsciiCell, AsciiGrid};
/// use af_core::traits::GridSerializer;
/// use af_export::html::HtmlSerializer;
///
/// let mut grid = AsciiGrid::new(2, 1);
/// grid.set(0, 0, AsciiCell { ch: '<', fg: (255, 0, 0) });
/// grid.set(1, 0, AsciiCell { ch: '@', fg: (255, 0, 0) });
/// let mut out = Vec::new();
/// HtmlSerializer::default().serialize(&grid, &mut out);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "<span style=\"color:rgb(255,0,0)\">&lt;@</span><br>"
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HtmlSerializer {
    capacity: usize,
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HTML_CAPACITY)
    }
}

impl HtmlSerializer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Ajoute `ch` échappé à `dst`.
fn push_escaped(dst: &mut String, ch: char) {
    match ch {
        '&' => dst.push_str("&amp;"),
        '<' => dst.push_str("&lt;"),
        '>' => dst.push_str("&gt;"),
        '"' => dst.push_str("&quot;"),
        '\'' => dst.push_str("&#39;"),
        _ => dst.push(ch),
    }
}

impl GridSerializer for HtmlSerializer {
    fn serialize(&self, grid: &AsciiGrid, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        let mut written = 0usize;
        // Fragment courant : un span complet, réutilisé.
        let mut span = String::with_capacity(64);

        'rows: for row in grid.rows() {
            let mut i = 0;
            while i < row.len() {
                let fg = row[i].fg;
                span.clear();
                // Écriture dans une String : infaillible.
                let _ = write!(span, "<span style=\"color:rgb({},{},{})\">", fg.0, fg.1, fg.2);
                while i < row.len() && row[i].fg == fg {
                    push_escaped(&mut span, row[i].ch);
                    i += 1;
                }
                span.push_str("</span>");
                if written + span.len() > self.capacity {
                    log::debug!("Sortie HTML tronquée à {written} octets");
                    break 'rows;
                }
                out.extend_from_slice(span.as_bytes());
                written += span.len();
            }
            if written + 4 > self.capacity {
                log::debug!("Sortie HTML tronquée à {written} octets");
                break;
            }
            out.extend_from_slice(b"<br>");
            written += 4;
        }
        out.len() - start
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use af_core::frame::AsciiCell;

    use super::*;

    fn render(ser: HtmlSerializer, grid: &AsciiGrid) -> String {
        let mut out = Vec::new();
        let n = ser.serialize(grid, &mut out);
        assert_eq!(n, out.len());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn escapes_markup_characters() {
        let mut grid = AsciiGrid::new(5, 1);
        for (x, ch) in "&<>\"'".chars().enumerate() {
            grid.set(x as u16, 0, AsciiCell { ch, fg: (1, 1, 1) });
        }
        let html = render(HtmlSerializer::default(), &grid);
        assert!(html.contains("&amp;&lt;&gt;&quot;&#39;"));
    }

    #[test]
    fn color_change_opens_new_span() {
        let mut grid = AsciiGrid::new(3, 2);
        grid.set(2, 0, AsciiCell { ch: '#', fg: (0, 255, 0) });
        let html = render(HtmlSerializer::default(), &grid);
        assert_eq!(html.matches("<span").count(), 3);
        assert_eq!(html.matches("<br>").count(), 2);
        assert!(html.ends_with("</span><br>"));
    }

    #[test]
    fn capacity_never_cuts_a_span() {
        let mut grid = AsciiGrid::new(4, 4);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            cell.fg = (i as u8, 0, 0);
        }
        let full = render(HtmlSerializer::default(), &grid);
        for cap in [0, 10, 40, 100, 333] {
            let html = render(HtmlSerializer::with_capacity(cap), &grid);
            assert!(html.len() <= cap);
            assert!(full.starts_with(&html));
            assert_eq!(html.matches("<span").count(), html.matches("</span>").count());
        }
        assert_eq!(render(HtmlSerializer::with_capacity(full.len()), &grid), full);
    }
}
