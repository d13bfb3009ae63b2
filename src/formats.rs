//! Single-file renderers for plain text and fixed-layout PDF.
//! The EPUB renderer lives in [crate::epub]; [crate::export] dispatches between them.

use crate::epub::EpubError;
use crate::model::PARAGRAPH_SEPARATOR;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the format writers. Each export format reports its own.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render PDF: {0}")]
    Pdf(String),

    #[error(transparent)]
    Epub(#[from] EpubError),
}

/// Write `"{title}\n\n{full_text}"` as UTF-8.
pub fn write_text(title: &str, full_text: &str, path: &Path) -> Result<(), FormatError> {
    let content = format!("{}{}{}", title, PARAGRAPH_SEPARATOR, full_text);
    std::fs::write(path, content.as_bytes()).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

// A4 portrait, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

// Helvetica advance widths in 1/1000 em for ' '..='~', from the Adobe core font metrics.
const FIRST_GLYPH: usize = 0x20;
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    text: String,
    size: f32,
    bold: bool,
    /// Baseline, measured from the bottom edge.
    y: f32,
}

fn line_height(size: f32) -> f32 {
    size * LINE_SPACING * PT_TO_MM
}

/// Advance width of `c` in 1/1000 em. Characters outside the table measure as `?`.
fn glyph_units(c: char, bold: bool) -> u32 {
    let table = if bold {
        &HELVETICA_BOLD_WIDTHS
    } else {
        &HELVETICA_WIDTHS
    };
    let index = (c as usize)
        .checked_sub(FIRST_GLYPH)
        .filter(|i| *i < table.len())
        .unwrap_or('?' as usize - FIRST_GLYPH);
    u32::from(table[index])
}

fn units_to_mm(units: u32, size: f32) -> f32 {
    units as f32 / 1000.0 * size * PT_TO_MM
}

fn text_width_mm(text: &str, size: f32, bold: bool) -> f32 {
    units_to_mm(text.chars().map(|c| glyph_units(c, bold)).sum(), size)
}

/// Greedy word wrap to lines no wider than `max_width` millimetres at `size` points.
/// Words wider than a whole line are split between characters.
fn wrap(text: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let fits = |units: u32| units_to_mm(units, size) <= max_width;
    let space = glyph_units(' ', bold);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_units = 0;
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        let mut word_units: u32 = word.chars().map(|c| glyph_units(c, bold)).sum();
        if !fits(word_units) {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_units = 0;
            }
            let mut piece = String::new();
            let mut piece_units = 0;
            for c in word.chars() {
                let w = glyph_units(c, bold);
                if !piece.is_empty() && !fits(piece_units + w) {
                    lines.push(std::mem::take(&mut piece));
                    piece_units = 0;
                }
                piece.push(c);
                piece_units += w;
            }
            word = piece;
            word_units = piece_units;
        }
        if !current.is_empty() && !fits(current_units + space + word_units) {
            lines.push(std::mem::take(&mut current));
            current_units = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_units += space;
        }
        current.push_str(&word);
        current_units += word_units;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Map text onto the built-in font's safe range: typographic punctuation becomes ASCII,
/// anything else outside printable ASCII becomes `?`.
fn pdf_safe_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' => out.push(' '),
            c if c.is_ascii_graphic() || c == ' ' || c == '\n' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Lay out the title block and paragraphs into pages, breaking when the bottom margin is hit.
fn layout(title: &str, full_text: &str) -> Vec<Vec<PlacedLine>> {
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let top = PAGE_HEIGHT - MARGIN;
    let mut cursor = top;

    let place = |pages: &mut Vec<Vec<PlacedLine>>, cursor: &mut f32, text: String, size: f32, bold: bool| {
        let h = line_height(size);
        if *cursor - h < MARGIN {
            pages.push(Vec::new());
            *cursor = top;
        }
        *cursor -= h;
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine {
                text,
                size,
                bold,
                y: *cursor,
            });
        }
    };

    for line in wrap(&pdf_safe_text(title), TEXT_WIDTH, TITLE_SIZE, true) {
        place(&mut pages, &mut cursor, line, TITLE_SIZE, true);
    }
    // Gap after the heading.
    cursor -= line_height(TITLE_SIZE);

    for paragraph in full_text.split(PARAGRAPH_SEPARATOR) {
        let lines = wrap(&pdf_safe_text(paragraph), TEXT_WIDTH, BODY_SIZE, false);
        if lines.is_empty() {
            continue;
        }
        for line in lines {
            place(&mut pages, &mut cursor, line, BODY_SIZE, false);
        }
        cursor -= line_height(BODY_SIZE);
    }
    pages
}

fn pdf_err(e: impl std::fmt::Debug) -> FormatError {
    FormatError::Pdf(format!("{:?}", e))
}

fn render(title: &str, pages: &[Vec<PlacedLine>]) -> Result<PdfDocumentReference, FormatError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Text");
    let regular: IndirectFontRef = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    for (i, lines) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Text");
            doc.get_page(page).get_layer(layer)
        };
        for line in lines {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(line.text.as_str(), line.size, Mm(MARGIN), Mm(line.y), font);
        }
    }
    Ok(doc)
}

/// Write a paginated PDF: bold title heading, then each paragraph as a wrapped block followed
/// by a blank line. Pages are added as needed.
pub fn write_pdf(title: &str, full_text: &str, path: &Path) -> Result<(), FormatError> {
    let pages = layout(title, full_text);
    let doc = render(title, &pages)?;
    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    std::fs::write(path, bytes).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
