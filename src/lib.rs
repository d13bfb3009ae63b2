//! storyscrape: CLI scraper for multi-page web stories, outputting text, PDF, or EPUB, plus a
//! PDF to EPUB converter.

pub mod cli;
pub mod config;
pub mod convert;
pub mod epub;
pub mod export;
pub mod filename;
pub mod formats;
pub mod input;
pub mod logging;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use convert::{convert_pdf_to_epub, repair_hyphenation, ConvertError, ParagraphSource};
pub use epub::{paragraphs_to_markup, write_epub, EpubError, EpubOptions, EpubVersion};
pub use export::{export, ExportOptions, ExportOutcome, ExportReport};
pub use filename::sanitize_filename;
pub use formats::{write_pdf, write_text, FormatError};
pub use model::{ExportFormat, ExportRequest, FormatChoice, PageText, StoryDocument};
pub use scraper::{
    crawl, is_valid_story_url, CrawlAborted, CrawlOptions, HttpClient, HttpClientBuilder,
    Literotica, PageExtractor, ScraperError, Transport,
};
