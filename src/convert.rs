//! PDF to EPUB conversion: pull paragraphs out of a PDF, repair line-break hyphenation,
//! and package the result with the same EPUB writer the story export uses.

use crate::epub::{write_epub, EpubBook, EpubError, EpubOptions};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Converted PDF";
pub const DEFAULT_AUTHOR: &str = "Auto-Converted";
pub const DEFAULT_OUTPUT: &str = "output.epub";
const CHAPTER_TITLE: &str = "Chapter 1";
const LANGUAGE: &str = "en";

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)-\s+(\w+)").expect("hyphen break regex"));

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to extract text from {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    #[error("No text found in {0}; the PDF may be scanned images only")]
    EmptyDocument(PathBuf),

    #[error(transparent)]
    Epub(#[from] EpubError),
}

/// Reads a document as an ordered list of text blocks.
pub trait ParagraphSource {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, ConvertError>;
}

/// [ParagraphSource] backed by `pdf-extract`. Blocks are separated by blank lines in the
/// extracted text; lines inside a block are joined with a space.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl ParagraphSource for PdfTextSource {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, ConvertError> {
        let text = pdf_extract::extract_text(path).map_err(|e| ConvertError::Extract {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(split_blocks(&text))
    }
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !lines.is_empty() {
                paragraphs.push(lines.join(" "));
                lines.clear();
            }
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        paragraphs.push(lines.join(" "));
    }
    paragraphs
}

/// Join words split across a line break: `"inter- national"` becomes `"international"`.
///
/// One output per input, in order. Any hyphen followed by whitespace between two word runs
/// is removed, so genuine hyphenated compounds that happened to wrap are merged as well.
pub fn repair_hyphenation(paragraphs: Vec<String>) -> Vec<String> {
    paragraphs
        .into_iter()
        .map(|p| HYPHEN_BREAK.replace_all(&p, "$1$2").into_owned())
        .collect()
}

/// Metadata and packaging for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub title: String,
    pub author: String,
    pub epub: EpubOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            epub: EpubOptions::default(),
        }
    }
}

/// Convert `input` into a one-chapter EPUB at `output`. Returns the paragraph count.
pub fn convert_pdf_to_epub<S: ParagraphSource + ?Sized>(
    source: &S,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<usize, ConvertError> {
    let paragraphs = source.extract_paragraphs(input)?;
    tracing::debug!(input = %input.display(), blocks = paragraphs.len(), "Extracted text blocks");
    let paragraphs = repair_hyphenation(paragraphs);
    if paragraphs.iter().all(|p| p.trim().is_empty()) {
        return Err(ConvertError::EmptyDocument(input.to_path_buf()));
    }

    let identifier = input
        .file_stem()
        .map(|s| format!("urn:pdf2epub:{}", s.to_string_lossy()))
        .unwrap_or_else(|| "urn:pdf2epub:document".to_string());
    let count = paragraphs.len();
    let book = EpubBook {
        title: options.title.clone(),
        author: options.author.clone(),
        identifier,
        language: LANGUAGE.to_string(),
        chapter_title: CHAPTER_TITLE.to_string(),
        heading: None,
        paragraphs,
    };
    write_epub(&book, output, options.epub)?;
    tracing::info!(output = %output.display(), paragraphs = count, "EPUB created");
    Ok(count)
}
