//! Where the run's inputs come from: command-line values only, or an interactive console
//! that fills in whatever the command line left out.

use crate::model::FormatChoice;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("No story URL given. Pass it as the first argument.")]
    MissingUrl,

    #[error("Invalid or unreachable story URL: {0}")]
    InvalidUrl(String),

    #[error("Input closed before a value was entered")]
    Closed,

    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies the story URL, output format and output directory.
pub trait InputProvider {
    /// A URL accepted by `is_valid`.
    fn story_url(&mut self, is_valid: &mut dyn FnMut(&str) -> bool) -> Result<String, InputError>;

    fn format_choice(&mut self) -> Result<FormatChoice, InputError>;

    fn output_dir(&mut self) -> Result<PathBuf, InputError>;
}

/// Values fixed up front. Used in non-interactive runs and as the preset for [PromptInput].
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pub url: Option<String>,
    pub format: Option<FormatChoice>,
    pub output_dir: Option<PathBuf>,
}

impl InputProvider for ScriptedInput {
    fn story_url(&mut self, is_valid: &mut dyn FnMut(&str) -> bool) -> Result<String, InputError> {
        let url = self.url.clone().ok_or(InputError::MissingUrl)?;
        if is_valid(&url) {
            Ok(url)
        } else {
            Err(InputError::InvalidUrl(url))
        }
    }

    fn format_choice(&mut self) -> Result<FormatChoice, InputError> {
        Ok(self.format.unwrap_or(FormatChoice::Epub))
    }

    fn output_dir(&mut self) -> Result<PathBuf, InputError> {
        Ok(self.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")))
    }
}

/// Map a menu answer (`1`-`4`) to a choice.
pub fn parse_menu_choice(answer: &str) -> Option<FormatChoice> {
    match answer.trim() {
        "1" => Some(FormatChoice::Text),
        "2" => Some(FormatChoice::Pdf),
        "3" => Some(FormatChoice::Epub),
        "4" => Some(FormatChoice::All),
        _ => None,
    }
}

/// Console prompter. Preset values are used without asking; a preset URL that fails
/// validation is reported and then prompted for.
pub struct PromptInput<R, W> {
    reader: R,
    writer: W,
    preset: ScriptedInput,
}

impl<R: BufRead, W: Write> PromptInput<R, W> {
    pub fn new(reader: R, writer: W, preset: ScriptedInput) -> Self {
        Self {
            reader,
            writer,
            preset,
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, InputError> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(InputError::Closed);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> InputProvider for PromptInput<R, W> {
    fn story_url(&mut self, is_valid: &mut dyn FnMut(&str) -> bool) -> Result<String, InputError> {
        let mut candidate = self.preset.url.take().unwrap_or_default();
        loop {
            if !candidate.is_empty() {
                if is_valid(&candidate) {
                    return Ok(candidate);
                }
                writeln!(self.writer, "Invalid or unreachable URL. Try again.")?;
            }
            candidate = self.ask("Enter story URL: ")?;
        }
    }

    fn format_choice(&mut self) -> Result<FormatChoice, InputError> {
        if let Some(choice) = self.preset.format {
            return Ok(choice);
        }
        writeln!(self.writer, "\nSelect output format:")?;
        writeln!(self.writer, "1) TXT")?;
        writeln!(self.writer, "2) PDF")?;
        writeln!(self.writer, "3) EPUB")?;
        writeln!(self.writer, "4) All")?;
        loop {
            let answer = self.ask("Enter choice (1/2/3/4): ")?;
            if let Some(choice) = parse_menu_choice(&answer) {
                return Ok(choice);
            }
        }
    }

    fn output_dir(&mut self) -> Result<PathBuf, InputError> {
        if let Some(dir) = self.preset.output_dir.clone() {
            return Ok(dir);
        }
        let answer = self.ask("Output directory (Enter for current): ")?;
        if answer.is_empty() {
            Ok(PathBuf::from("."))
        } else {
            Ok(PathBuf::from(answer))
        }
    }
}
