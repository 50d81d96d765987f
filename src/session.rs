//! Conversion sessions
//!
//! A session binds one (from, to) charset pair to one input buffer and
//! advances through it a step at a time, much like `iconv(3)`: each step
//! either makes progress, reports an illegal sequence, or finishes.

use tracing::trace;

use crate::backend::{Charset, DecodeStatus, Decoder, EncodeStatus, Encoder};

/// Size of the input chunks fed to the decoder and of the output buffer
pub(crate) const CHUNK_SIZE: usize = 4096;

/// Result of one [`ConversionSession::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Some input was decoded or some output produced
    Progress,
    /// Input exhausted and encoder flushed
    Finished,
    /// A malformed source sequence starts at this input offset. Everything
    /// before it has been converted.
    Illegal { offset: usize },
    /// The target charset cannot represent this character; it was dropped
    Unmappable { character: char },
}

/// Single-use conversion state for one input buffer
pub(crate) struct ConversionSession<'a> {
    from: Charset,
    to: Charset,
    input: &'a [u8],
    decoder: Decoder,
    encoder: Encoder,
    /// Decoded text waiting to be encoded
    decoded: String,
    decoded_pos: usize,
    /// Next input offset to feed the decoder
    position: usize,
    fault: Option<usize>,
    decoder_done: bool,
    flushed: bool,
    buffer: Box<[u8]>,
}

impl<'a> ConversionSession<'a> {
    pub(crate) fn new(from: Charset, to: Charset, input: &'a [u8]) -> Self {
        trace!(from = from.name(), to = to.name(), len = input.len(), "conversion session opened");
        Self {
            from,
            to,
            input,
            decoder: from.new_decoder(),
            encoder: to.new_encoder(),
            decoded: String::with_capacity(CHUNK_SIZE),
            decoded_pos: 0,
            position: 0,
            fault: None,
            decoder_done: false,
            flushed: false,
            buffer: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Advance the conversion, appending any produced bytes to `output`
    pub(crate) fn step(&mut self, output: &mut Vec<u8>) -> Step {
        if self.decoded_pos < self.decoded.len() {
            let (status, read, written) = self.encoder.encode_from_str(
                &self.decoded[self.decoded_pos..],
                &mut self.buffer,
                false,
            );
            self.decoded_pos += read;
            output.extend_from_slice(&self.buffer[..written]);
            return match status {
                EncodeStatus::Unmappable(character) => Step::Unmappable { character },
                EncodeStatus::InputEmpty | EncodeStatus::OutputFull => Step::Progress,
            };
        }

        if let Some(offset) = self.fault {
            return Step::Illegal { offset };
        }

        if !self.decoder_done {
            let end = (self.position + CHUNK_SIZE).min(self.input.len());
            let last = end == self.input.len();

            self.decoded.clear();
            self.decoded_pos = 0;
            let (status, read) =
                self.decoder
                    .decode_to_string(&self.input[self.position..end], &mut self.decoded, last);

            match status {
                DecodeStatus::InputEmpty => {
                    self.position = end;
                    self.decoder_done = last;
                }
                DecodeStatus::Malformed { len, after } => {
                    let consumed = self.position + read;
                    self.position = consumed;
                    self.fault = Some(consumed.saturating_sub(len + after));
                }
            }
            return Step::Progress;
        }

        if !self.flushed {
            let (_, _, written) = self.encoder.encode_from_str("", &mut self.buffer, true);
            output.extend_from_slice(&self.buffer[..written]);
            self.flushed = true;
            return Step::Progress;
        }

        Step::Finished
    }

    /// Restart decoding at `offset` with fresh decoder state, discarding a
    /// reported illegal sequence. Encoder state is kept.
    pub(crate) fn resume_at(&mut self, offset: usize) {
        self.decoder = self.from.new_decoder();
        self.decoded.clear();
        self.decoded_pos = 0;
        self.position = offset.min(self.input.len());
        self.fault = None;
        self.decoder_done = false;
    }
}

impl Drop for ConversionSession<'_> {
    fn drop(&mut self) {
        trace!(
            from = self.from.name(),
            to = self.to.name(),
            position = self.position,
            "conversion session closed"
        );
    }
}
