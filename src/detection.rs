//! Encoding detection
//!
//! Detection runs a fixed cascade, stopping at the first stage that answers:
//!
//! 1. empty input is UTF-8
//! 2. a registered byte order mark names the charset
//! 3. input that is strictly valid UTF-8 is UTF-8
//! 4. a statistical [`Classifier`] guesses from byte frequencies
//!
//! Strict UTF-8 validation runs before the classifier because it is exact,
//! while frequency heuristics are known to misjudge UTF-8 now and then.

use std::marker::PhantomData;

use serde::Serialize;
use tracing::debug;

use crate::bom;
use crate::utf8;
use crate::{Error, Result};

/// Which stage of the cascade produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// The input was empty
    Empty,
    /// A byte order mark was matched
    Bom,
    /// The input validated as UTF-8
    Utf8,
    /// The statistical classifier guessed
    Statistical,
}

/// A detected charset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Charset name, usable as a conversion charset
    pub charset: String,
    /// Whether the input starts with the charset's byte order mark
    pub had_bom: bool,
    /// Stage that produced the answer
    pub method: DetectionMethod,
}

impl Detection {
    fn new(charset: impl Into<String>, had_bom: bool, method: DetectionMethod) -> Self {
        Self {
            charset: charset.into(),
            had_bom,
            method,
        }
    }

    /// Length of the byte order mark at the start of the input, if any.
    ///
    /// Slicing the input past it gives the text without the mark.
    pub fn bom_len(&self) -> usize {
        if self.had_bom {
            bom::lookup_by_charset(&self.charset).len()
        } else {
            0
        }
    }
}

/// A statistical charset classifier
///
/// One classifier is created for each detection: all bytes are fed, then
/// [`Classifier::finish`] is called once to read the best guess.
pub trait Classifier {
    /// Feed more bytes
    fn feed(&mut self, bytes: &[u8]);

    /// Finalize and return the best-guess charset name, if any
    fn finish(&mut self) -> Option<String>;
}

/// [`Classifier`] backed by `chardetng`
pub struct ChardetClassifier {
    detector: chardetng::EncodingDetector,
    finished: bool,
}

impl Default for ChardetClassifier {
    fn default() -> Self {
        Self {
            detector: chardetng::EncodingDetector::new(),
            finished: false,
        }
    }
}

impl Classifier for ChardetClassifier {
    fn feed(&mut self, bytes: &[u8]) {
        if !self.finished {
            self.detector.feed(bytes, false);
        }
    }

    fn finish(&mut self) -> Option<String> {
        if !self.finished {
            self.detector.feed(&[], true);
            self.finished = true;
        }
        // UTF-8 was already ruled out by the validator
        let encoding = self.detector.guess(None, false);
        Some(encoding.name().to_string())
    }
}

/// Encoding detector
///
/// Generic over the statistical classifier used as the last resort; the
/// default is [`ChardetClassifier`].
pub struct EncodingDetector<C = ChardetClassifier> {
    classifier: PhantomData<fn() -> C>,
}

impl<C> Default for EncodingDetector<C> {
    fn default() -> Self {
        Self {
            classifier: PhantomData,
        }
    }
}

impl EncodingDetector {
    /// Create a detector using `chardetng` as its classifier
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Classifier + Default> EncodingDetector<C> {
    /// Create a detector with a custom classifier type
    pub fn with_classifier() -> Self {
        Self::default()
    }

    /// Detect the charset of `data`
    ///
    /// Fails with [`Error::DetectionFailed`] only when there is no byte order
    /// mark, the data is not valid UTF-8 and the classifier has no answer.
    pub fn detect(&self, data: &[u8]) -> Result<Detection> {
        if data.is_empty() {
            return Ok(Detection::new("UTF-8", false, DetectionMethod::Empty));
        }

        if let Some((charset, bom_len)) = bom::match_prefix(data) {
            debug!(charset, bom_len, "byte order mark found");
            return Ok(Detection::new(charset, true, DetectionMethod::Bom));
        }

        if utf8::is_valid_utf8(data) {
            debug!(len = data.len(), "input is valid UTF-8");
            return Ok(Detection::new("UTF-8", false, DetectionMethod::Utf8));
        }

        let mut classifier = C::default();
        classifier.feed(data);
        match classifier.finish() {
            Some(charset) if !charset.is_empty() => {
                debug!(charset = %charset, "statistical classifier guessed");
                Ok(Detection::new(charset, false, DetectionMethod::Statistical))
            }
            _ => {
                debug!(len = data.len(), "statistical classifier gave no answer");
                Err(Error::DetectionFailed)
            }
        }
    }

    /// Detect the charset from at most the first `limit` bytes of `data`
    ///
    /// A UTF-8 sequence cut in half by the limit is left out of the sample,
    /// so a valid UTF-8 buffer still detects as UTF-8.
    pub fn detect_sample(&self, data: &[u8], limit: usize) -> Result<Detection> {
        if limit >= data.len() {
            return self.detect(data);
        }
        let sample = utf8::trim_incomplete_tail(&data[..limit]);
        debug!(limit, sample_len = sample.len(), "detecting from a sample");
        self.detect(sample)
    }
}
