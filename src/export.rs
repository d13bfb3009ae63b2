//! Export pipeline: write one finished story into each requested format.
//!
//! Formats are independent. A failure in one is logged and recorded in the report; the
//! remaining formats still run.

use crate::epub::{write_epub, EpubBook, EpubOptions};
use crate::filename::output_basename;
use crate::formats::{write_pdf, write_text, FormatError};
use crate::model::{ExportFormat, ExportRequest, PARAGRAPH_SEPARATOR};
use std::path::{Path, PathBuf};

const EPUB_AUTHOR: &str = "Unknown";
const EPUB_LANGUAGE: &str = "en";
const FALLBACK_IDENTIFIER: &str = "urn:storyscrape:story";

/// Options that apply to individual formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub epub: EpubOptions,
}

/// Result of writing one format.
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub result: Result<(), FormatError>,
}

/// Every outcome of an [export] call, in format order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<ExportOutcome>,
}

impl ExportReport {
    /// Paths that were written successfully.
    pub fn written(&self) -> impl Iterator<Item = &ExportOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExportOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// True when formats were requested and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.written().next().is_none()
    }
}

/// Target path for `format` under `dir`, named after the sanitized title.
pub fn output_path(dir: &Path, title: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", output_basename(title), format.extension()))
}

/// Write `request` into every target format. Never fails as a whole; inspect the report.
pub fn export(request: &ExportRequest, options: &ExportOptions) -> ExportReport {
    let mut report = ExportReport::default();
    let dir_result = std::fs::create_dir_all(&request.output_directory);

    for &format in &request.target_formats {
        let path = output_path(&request.output_directory, &request.title, format);
        let result = match &dir_result {
            Err(e) => Err(FormatError::Io {
                path: request.output_directory.clone(),
                source: std::io::Error::new(e.kind(), e.to_string()),
            }),
            Ok(()) => write_format(request, options, format, &path),
        };
        match &result {
            Ok(()) => tracing::info!(%format, path = %path.display(), "Export written"),
            Err(e) => tracing::error!(%format, path = %path.display(), error = %e, "Export failed"),
        }
        report.outcomes.push(ExportOutcome {
            format,
            path,
            result,
        });
    }
    report
}

fn write_format(
    request: &ExportRequest,
    options: &ExportOptions,
    format: ExportFormat,
    path: &Path,
) -> Result<(), FormatError> {
    match format {
        ExportFormat::Text => write_text(&request.title, &request.full_text, path),
        ExportFormat::Pdf => write_pdf(&request.title, &request.full_text, path),
        ExportFormat::Epub => {
            let book = story_book(request);
            write_epub(&book, path, options.epub)?;
            Ok(())
        }
    }
}

fn story_book(request: &ExportRequest) -> EpubBook {
    EpubBook {
        title: request.title.clone(),
        author: EPUB_AUTHOR.to_string(),
        identifier: request
            .source_url
            .clone()
            .unwrap_or_else(|| FALLBACK_IDENTIFIER.to_string()),
        language: EPUB_LANGUAGE.to_string(),
        chapter_title: request.title.clone(),
        heading: Some(request.title.clone()),
        paragraphs: request
            .full_text
            .split(PARAGRAPH_SEPARATOR)
            .map(String::from)
            .collect(),
    }
}
