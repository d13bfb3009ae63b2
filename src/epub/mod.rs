//! EPUB writer. Packages one chapter of paragraphs as EPUB 2 or EPUB 3 (mimetype, container,
//! OPF, nav/NCX, chapter). Used by the story export and by the PDF converter.

use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTAINER_XML: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n  <rootfiles>\n    <rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n  </rootfiles>\n</container>";

const MIMETYPE: &[u8] = b"application/epub+zip";
const OEBPS_PREFIX: &str = "OEBPS/";
const CHAPTER_FILE: &str = "chapter-1.xhtml";

/// EPUB format version.
///
/// Default is EPUB 3 (OPF 3.0, nav.xhtml, HTML5 chapter). Use `Epub2` for legacy readers (OPF 2.0, NCX, XHTML 1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpubVersion {
    #[default]
    Epub3,
    Epub2,
}

/// Packaging options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpubOptions {
    pub version: EpubVersion,
    /// Include toc.ncx in EPUB 3 for legacy readers. EPUB 2 always has one.
    pub include_ncx: bool,
}

impl Default for EpubOptions {
    fn default() -> Self {
        Self {
            version: EpubVersion::Epub3,
            include_ncx: true,
        }
    }
}

/// A single-chapter book.
#[derive(Debug, Clone)]
pub struct EpubBook {
    pub title: String,
    pub author: String,
    pub identifier: String,
    pub language: String,
    /// Label of the chapter in the table of contents.
    pub chapter_title: String,
    /// Optional `<h1>` at the top of the chapter.
    pub heading: Option<String>,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Error)]
pub enum EpubError {
    #[error("Cannot write EPUB: book title is empty.")]
    EmptyTitle,

    #[error("Cannot write EPUB: book author is empty.")]
    EmptyAuthor,

    #[error("Failed to create EPUB file: {path}: {source}")]
    CreateFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write EPUB archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<std::io::Error> for EpubError {
    fn from(e: std::io::Error) -> Self {
        EpubError::Zip(zip::result::ZipError::Io(e))
    }
}

/// Write `book` to an EPUB file at `path`.
pub fn write_epub(book: &EpubBook, path: &Path, options: EpubOptions) -> Result<(), EpubError> {
    validate_book(book)?;
    let file = std::fs::File::create(path).map_err(|e| EpubError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_epub_to(book, file, options)
}

/// Write `book` as an EPUB archive into any seekable writer.
pub fn write_epub_to<W: Write + Seek>(
    book: &EpubBook,
    writer: W,
    options: EpubOptions,
) -> Result<(), EpubError> {
    validate_book(book)?;
    let mut zip = ZipWriter::new(writer);

    let options_stored = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);
    let options_deflate = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    // Mimetype first, uncompressed.
    zip.start_file("mimetype", options_stored)?;
    zip.write_all(MIMETYPE)?;

    zip.start_file("META-INF/container.xml", options_deflate)?;
    zip.write_all(CONTAINER_XML)?;

    match options.version {
        EpubVersion::Epub3 => {
            write_opf(book, EpubVersion::Epub3, options.include_ncx, &mut zip, options_deflate)?;
            write_nav_xhtml(book, &mut zip, options_deflate)?;
            if options.include_ncx {
                write_ncx(book, &mut zip, options_deflate)?;
            }
            write_chapter(book, EpubVersion::Epub3, &mut zip, options_deflate)?;
        }
        EpubVersion::Epub2 => {
            write_opf(book, EpubVersion::Epub2, true, &mut zip, options_deflate)?;
            write_ncx(book, &mut zip, options_deflate)?;
            write_chapter(book, EpubVersion::Epub2, &mut zip, options_deflate)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn validate_book(book: &EpubBook) -> Result<(), EpubError> {
    if book.title.trim().is_empty() {
        return Err(EpubError::EmptyTitle);
    }
    if book.author.trim().is_empty() {
        return Err(EpubError::EmptyAuthor);
    }
    Ok(())
}

/// One `<p>` per non-blank paragraph, text escaped.
pub fn paragraphs_to_markup<S: AsRef<str>>(paragraphs: &[S]) -> String {
    paragraphs
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", xml_escape(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_opf(
    book: &EpubBook,
    version: EpubVersion,
    include_ncx: bool,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let mut manifest = String::new();
    if version == EpubVersion::Epub3 {
        manifest.push_str(
            r#"    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
"#,
        );
    }
    if include_ncx {
        manifest.push_str(
            r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
"#,
        );
    }
    manifest.push_str(&format!(
        r#"    <item id="chapter-1" href="{}" media-type="application/xhtml+xml"/>
"#,
        CHAPTER_FILE
    ));

    let (package_version, spine_open) = match version {
        EpubVersion::Epub3 if include_ncx => ("3.0", r#"<spine toc="ncx">"#),
        EpubVersion::Epub3 => ("3.0", "<spine>"),
        EpubVersion::Epub2 => ("2.0", r#"<spine toc="ncx">"#),
    };

    let modified = match version {
        EpubVersion::Epub3 => format!(
            "    <meta property=\"dcterms:modified\">{}</meta>\n",
            utc_timestamp(unix_now())
        ),
        EpubVersion::Epub2 => String::new(),
    };

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="book-id" version="{package_version}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{id}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:creator>{creator}</dc:creator>
    <dc:language>{language}</dc:language>
{modified}  </metadata>
  <manifest>
{manifest}  </manifest>
  {spine_open}
    <itemref idref="chapter-1"/>
  </spine>
</package>
"#,
        package_version = package_version,
        id = xml_escape(&book.identifier),
        title = xml_escape(&book.title),
        creator = xml_escape(&book.author),
        language = xml_escape(&book.language),
        modified = modified,
        manifest = manifest,
        spine_open = spine_open,
    );

    zip.start_file(format!("{}content.opf", OEBPS_PREFIX), options)?;
    zip.write_all(opf.as_bytes())?;
    Ok(())
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `YYYY-MM-DDThh:mm:ssZ` for seconds since the Unix epoch.
fn utc_timestamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    // Civil date from day count (proleptic Gregorian, 400-year eras starting 0000-03-01).
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3_600,
        rem % 3_600 / 60,
        rem % 60
    )
}

fn write_nav_xhtml(
    book: &EpubBook,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let nav = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
  <meta charset="UTF-8"/>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>Contents</h1>
    <ol>
      <li><a href="{href}">{label}</a></li>
    </ol>
  </nav>
</body>
</html>
"#,
        lang = xml_escape(&book.language),
        title = xml_escape(&book.title),
        href = CHAPTER_FILE,
        label = xml_escape(&book.chapter_title),
    );
    zip.start_file(format!("{}nav.xhtml", OEBPS_PREFIX), options)?;
    zip.write_all(nav.as_bytes())?;
    Ok(())
}

fn write_ncx(
    book: &EpubBook,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let ncx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{uid}"/>
  </head>
  <docTitle>
    <text>{title}</text>
  </docTitle>
  <navMap>
    <navPoint id="navpoint-1" playOrder="1">
      <navLabel><text>{label}</text></navLabel>
      <content src="{href}"/>
    </navPoint>
  </navMap>
</ncx>
"#,
        uid = xml_escape(&book.identifier),
        title = xml_escape(&book.title),
        label = xml_escape(&book.chapter_title),
        href = CHAPTER_FILE,
    );
    zip.start_file(format!("{}toc.ncx", OEBPS_PREFIX), options)?;
    zip.write_all(ncx.as_bytes())?;
    Ok(())
}

fn write_chapter(
    book: &EpubBook,
    version: EpubVersion,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let doctype = match version {
        EpubVersion::Epub3 => "<!DOCTYPE html>",
        EpubVersion::Epub2 => {
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#
        }
    };
    let heading = book
        .heading
        .as_deref()
        .map(|h| format!("<h1>{}</h1>\n", xml_escape(h)))
        .unwrap_or_default();
    let html = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
{doctype}
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
  <meta http-equiv="Content-Type" content="application/xhtml+xml; charset=utf-8"/>
  <title>{title}</title>
</head>
<body>
{heading}{body}
</body>
</html>
"#,
        doctype = doctype,
        lang = xml_escape(&book.language),
        title = xml_escape(&book.chapter_title),
        heading = heading,
        body = paragraphs_to_markup(&book.paragraphs),
    );
    zip.start_file(format!("{}{}", OEBPS_PREFIX, CHAPTER_FILE), options)?;
    zip.write_all(html.as_bytes())?;
    Ok(())
}

pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
