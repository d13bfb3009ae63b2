//! Data model for a crawled story and the export formats it can be written to.
//!
//! The crawl loop is the only producer of [StoryDocument] and [PageText]; the export
//! pipeline consumes the title and the joined text.

use std::fmt;
use std::path::PathBuf;

/// Separator between paragraphs within a page and between pages in the full text.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// One fetched page's body text: paragraphs joined with a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    url: String,
    body: String,
}

impl PageText {
    /// Build a page from its extracted paragraphs.
    pub(crate) fn from_paragraphs(url: impl Into<String>, paragraphs: &[String]) -> Self {
        Self {
            url: url.into(),
            body: paragraphs.join(PARAGRAPH_SEPARATOR),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A whole story: title captured from the first page plus every page in crawl order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDocument {
    pub title: String,
    pub pages: Vec<PageText>,
}

impl StoryDocument {
    /// Join of every page body in page order. Recomputed on each call so it never
    /// diverges from `pages`.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(PageText::body)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }

    /// URL of the first page, used as the EPUB identifier.
    pub fn source_url(&self) -> Option<&str> {
        self.pages.first().map(PageText::url)
    }
}

/// A single output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExportFormat {
    /// Plain UTF-8 text.
    Text,
    /// Fixed-layout paginated document.
    Pdf,
    /// Reflowable e-book.
    Epub,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Text, ExportFormat::Pdf, ExportFormat::Epub];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Epub => "epub",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportFormat::Text => "TXT",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Epub => "EPUB",
        };
        f.write_str(label)
    }
}

/// The user-facing output choice: one format or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    Text,
    Pdf,
    Epub,
    All,
}

impl FormatChoice {
    pub fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatChoice::Text => vec![ExportFormat::Text],
            FormatChoice::Pdf => vec![ExportFormat::Pdf],
            FormatChoice::Epub => vec![ExportFormat::Epub],
            FormatChoice::All => ExportFormat::ALL.to_vec(),
        }
    }
}

/// Where and how a finished story should be written.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub title: String,
    pub full_text: String,
    pub target_formats: std::collections::BTreeSet<ExportFormat>,
    pub output_directory: PathBuf,
    /// Origin URL, used as the EPUB identifier when present.
    pub source_url: Option<String>,
}

impl ExportRequest {
    pub fn from_story(
        story: &StoryDocument,
        formats: impl IntoIterator<Item = ExportFormat>,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: story.title.clone(),
            full_text: story.full_text(),
            target_formats: formats.into_iter().collect(),
            output_directory: output_directory.into(),
            source_url: story.source_url().map(String::from),
        }
    }
}
