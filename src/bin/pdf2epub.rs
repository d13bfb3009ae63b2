//! Convert a PDF into a single-chapter EPUB.

use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use storyscrape::convert::{
    convert_pdf_to_epub, ConvertOptions, PdfTextSource, DEFAULT_AUTHOR, DEFAULT_OUTPUT,
    DEFAULT_TITLE,
};
use storyscrape::epub::{EpubOptions, EpubVersion};

#[derive(Parser, Debug)]
#[command(name = "pdf2epub")]
#[command(about = "Convert a PDF into an EPUB, repairing words hyphenated across line breaks")]
struct Args {
    /// Input PDF. `~` is expanded.
    input: String,

    /// Output EPUB. `~` is expanded.
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: String,

    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    #[arg(long, default_value = DEFAULT_AUTHOR)]
    author: String,

    /// Generate EPUB 2 instead of EPUB 3.
    #[arg(long)]
    epub_2: bool,

    #[arg(long)]
    verbose: bool,
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = storyscrape::logging::level_for(false, args.verbose);
    storyscrape::logging::init(level, None)?;

    let input = expand_home(&args.input);
    let output = expand_home(&args.output);
    let options = ConvertOptions {
        title: args.title,
        author: args.author,
        epub: EpubOptions {
            version: if args.epub_2 {
                EpubVersion::Epub2
            } else {
                EpubVersion::Epub3
            },
            ..EpubOptions::default()
        },
    };

    convert_pdf_to_epub(&PdfTextSource, &input, &output, &options)
        .with_context(|| format!("convert {}", input.display()))?;
    println!("EPUB created: {}", output.display());
    Ok(())
}
