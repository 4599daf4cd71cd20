use std::io::Write;

use citefetch_core::agent::{CitationRow, UNAVAILABLE_TEXT};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the rendered citation row, `Citations: 42 (Google Scholar)` style.
pub fn print_citation_row(
    w: &mut dyn Write,
    row: &CitationRow,
    color: ColorMode,
) -> std::io::Result<()> {
    if !color.enabled() {
        return writeln!(w, "{}", row);
    }

    if row.value == UNAVAILABLE_TEXT {
        writeln!(w, "{} {}", row.label.bold(), row.value.red())
    } else if let Some((count, source)) = row.value.split_once(' ') {
        writeln!(
            w,
            "{} {} {}",
            row.label.bold(),
            count.green().bold(),
            source.dimmed()
        )
    } else {
        writeln!(w, "{} {}", row.label.bold(), row.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citefetch_core::CitationCount;

    #[test]
    fn plain_output_matches_row_display() {
        let row = CitationRow::from_count(CitationCount::Count(42));
        let mut buf = Vec::new();
        print_citation_row(&mut buf, &row, ColorMode(false)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Citations: 42 (Google Scholar)\n"
        );
    }

    #[test]
    fn plain_output_unavailable() {
        let row = CitationRow::from_count(CitationCount::Unavailable);
        let mut buf = Vec::new();
        print_citation_row(&mut buf, &row, ColorMode(false)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Citations: Service unavailable\n"
        );
    }
}
