//! Streaming charset conversion with a strict or lenient error policy

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Charset;
use crate::bom;
use crate::session::{ConversionSession, Step};
use crate::{Error, Result};

/// Options controlling a conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Abort on the first illegal sequence instead of skipping it
    pub strict: bool,
    /// Remove the source charset's byte order mark from the input, if present
    pub handle_from_bom: bool,
    /// Prepend the target charset's byte order mark to the output
    pub handle_to_bom: bool,
}

impl ConversionOptions {
    /// Lenient conversion without any BOM handling
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Strip the source BOM before converting
    pub fn handle_from_bom(mut self, handle: bool) -> Self {
        self.handle_from_bom = handle;
        self
    }

    /// Emit the target BOM before the converted bytes
    pub fn handle_to_bom(mut self, handle: bool) -> Self {
        self.handle_to_bom = handle;
        self
    }
}

/// Converter between two named charsets
///
/// Creating a transcoder checks that the backend supports both charsets;
/// every [`Transcoder::convert`] call then runs its own conversion session.
#[derive(Debug, Clone)]
pub struct Transcoder {
    from_name: String,
    to_name: String,
    from: Charset,
    to: Charset,
    options: ConversionOptions,
}

impl Transcoder {
    /// Create a transcoder from `from` to `to`
    pub fn new(from: &str, to: &str, options: ConversionOptions) -> Result<Self> {
        let unsupported = |reason: String| Error::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
            reason,
        };
        let source = Charset::resolve(from).map_err(unsupported)?;
        let target = Charset::resolve(to).map_err(unsupported)?;

        Ok(Self {
            from_name: from.to_string(),
            to_name: to.to_string(),
            from: source,
            to: target,
            options,
        })
    }

    /// Source charset name, as given
    pub fn from_charset(&self) -> &str {
        &self.from_name
    }

    /// Target charset name, as given
    pub fn to_charset(&self) -> &str {
        &self.to_name
    }

    /// Options in effect
    pub fn options(&self) -> ConversionOptions {
        self.options
    }

    /// Convert `input` and return the converted bytes.
    ///
    /// In strict mode the first illegal sequence aborts with
    /// [`Error::IllegalSequence`] and no output. In lenient mode an illegal
    /// source byte is skipped and conversion resumes at the next byte, and a
    /// character the target cannot represent is dropped; neither is reported.
    pub fn convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut input = input;
        if self.options.handle_from_bom {
            let from_bom = bom::lookup_by_charset(&self.from_name);
            if !from_bom.is_empty() && input.starts_with(from_bom) {
                input = &input[from_bom.len()..];
            }
        }

        let mut output = Vec::with_capacity(input.len());
        if self.options.handle_to_bom {
            output.extend_from_slice(bom::lookup_by_charset(&self.to_name));
        }

        let mut session = ConversionSession::new(self.from, self.to, input);
        loop {
            match session.step(&mut output) {
                Step::Progress => {}
                Step::Finished => break,
                Step::Illegal { offset } => {
                    if self.options.strict {
                        return Err(Error::IllegalSequence { offset: Some(offset) });
                    }
                    debug!(offset, byte = ?input.get(offset), "skipping illegal byte");
                    session.resume_at(offset + 1);
                }
                Step::Unmappable { character } => {
                    if self.options.strict {
                        return Err(Error::IllegalSequence { offset: None });
                    }
                    debug!(%character, to = %self.to_name, "dropping unmappable character");
                }
            }
        }

        Ok(output)
    }
}
