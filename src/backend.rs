//! Conversion backend
//!
//! Resolves charset names and drives the decoder/encoder pair behind a
//! conversion session. WHATWG encodings come from `encoding_rs`; UTF-16
//! encoding, UTF-32, ISO-8859-1 and US-ASCII come from [`crate::multibyte`].

use encoding_rs::{DecoderResult, EncoderResult, Encoding, REPLACEMENT, UTF_16BE, UTF_16LE};

use crate::multibyte::{ByteForm, Endian, WideDecoder, WideEncoder, WideForm};

/// Outcome of one decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeStatus {
    /// All input was consumed
    InputEmpty,
    /// A malformed sequence of `len` bytes was found, followed by `after`
    /// consumed bytes that are not part of it
    Malformed { len: usize, after: usize },
}

/// Outcome of one encode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EncodeStatus {
    InputEmpty,
    OutputFull,
    /// The character cannot be represented; it has been consumed
    Unmappable(char),
}

/// A charset the backend knows how to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Charset {
    Web(&'static Encoding),
    Wide(WideForm),
    Byte(ByteForm),
}

impl Charset {
    /// Resolve a charset name, or describe why the backend cannot.
    pub(crate) fn resolve(name: &str) -> std::result::Result<Self, String> {
        if let Some(form) = WideForm::utf32_from_name(name) {
            return Ok(Charset::Wide(form));
        }
        // iconv names that encoding_rs would treat as windows-1252
        if let Some(form) = ByteForm::from_name(name) {
            return Ok(Charset::Byte(form));
        }

        match Encoding::for_label(name.as_bytes()) {
            // encoding_rs decodes UTF-16 itself but encodes it to UTF-8
            Some(encoding) if encoding == UTF_16LE => Ok(Charset::Wide(WideForm::Utf16(Endian::Little))),
            Some(encoding) if encoding == UTF_16BE => Ok(Charset::Wide(WideForm::Utf16(Endian::Big))),
            Some(encoding) if encoding == REPLACEMENT => Err(format!("unsupported charset: {}", name)),
            Some(encoding) => Ok(Charset::Web(encoding)),
            None => Err(format!("unsupported charset: {}", name)),
        }
    }

    /// Canonical backend name
    pub(crate) fn name(self) -> &'static str {
        match self {
            Charset::Web(encoding) => encoding.name(),
            Charset::Wide(form) => form.name(),
            Charset::Byte(form) => form.name(),
        }
    }

    /// A fresh decoder; byte order marks are left in the text as U+FEFF
    pub(crate) fn new_decoder(self) -> Decoder {
        match self {
            Charset::Web(encoding) => Decoder::Web(encoding.new_decoder_without_bom_handling()),
            Charset::Wide(form) => Decoder::Wide(WideDecoder::new(form)),
            Charset::Byte(form) => Decoder::Byte(form),
        }
    }

    pub(crate) fn new_encoder(self) -> Encoder {
        match self {
            Charset::Web(encoding) => Encoder::Web(encoding.new_encoder()),
            Charset::Wide(form) => Encoder::Wide(WideEncoder::new(form)),
            Charset::Byte(form) => Encoder::Byte(form),
        }
    }
}

/// Bytes → Unicode half of a conversion
pub(crate) enum Decoder {
    Web(encoding_rs::Decoder),
    Wide(WideDecoder),
    Byte(ByteForm),
}

impl Decoder {
    /// Decode `src` onto the end of `dst`, returning the status and the
    /// number of bytes consumed.
    pub(crate) fn decode_to_string(
        &mut self,
        src: &[u8],
        dst: &mut String,
        last: bool,
    ) -> (DecodeStatus, usize) {
        match self {
            Decoder::Web(decoder) => {
                let mut read = 0;
                loop {
                    let needed = decoder
                        .max_utf8_buffer_length_without_replacement(src.len() - read)
                        .unwrap_or(0)
                        .max(16);
                    dst.reserve(needed);

                    let (result, consumed) =
                        decoder.decode_to_string_without_replacement(&src[read..], dst, last);
                    read += consumed;

                    match result {
                        DecoderResult::InputEmpty => return (DecodeStatus::InputEmpty, read),
                        DecoderResult::Malformed(len, after) => {
                            return (
                                DecodeStatus::Malformed {
                                    len: len as usize,
                                    after: after as usize,
                                },
                                read,
                            );
                        }
                        DecoderResult::OutputFull => continue,
                    }
                }
            }
            Decoder::Wide(decoder) => decoder.decode_to_string(src, dst, last),
            Decoder::Byte(form) => form.decode_to_string(src, dst),
        }
    }
}

/// Unicode → bytes half of a conversion
pub(crate) enum Encoder {
    Web(encoding_rs::Encoder),
    Wide(WideEncoder),
    Byte(ByteForm),
}

impl Encoder {
    /// Encode as much of `src` as fits into `dst`, returning the status,
    /// bytes read and bytes written. `last` flushes encoder state and must
    /// be passed at most once.
    pub(crate) fn encode_from_str(
        &mut self,
        src: &str,
        dst: &mut [u8],
        last: bool,
    ) -> (EncodeStatus, usize, usize) {
        match self {
            Encoder::Web(encoder) => {
                let (result, read, written) =
                    encoder.encode_from_utf8_without_replacement(src, dst, last);
                let status = match result {
                    EncoderResult::InputEmpty => EncodeStatus::InputEmpty,
                    EncoderResult::OutputFull => EncodeStatus::OutputFull,
                    EncoderResult::Unmappable(ch) => EncodeStatus::Unmappable(ch),
                };
                (status, read, written)
            }
            Encoder::Wide(encoder) => encoder.encode_from_str(src, dst),
            Encoder::Byte(form) => form.encode_from_str(src, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_names() {
        assert_eq!(Charset::resolve("UTF-8").unwrap().name(), "UTF-8");
        assert_eq!(Charset::resolve("GB18030").unwrap().name(), "gb18030");
        assert_eq!(Charset::resolve("Shift_JIS").unwrap().name(), "Shift_JIS");
        assert_eq!(Charset::resolve("windows-1252").unwrap().name(), "windows-1252");
        assert_eq!(
            Charset::resolve("UTF-16LE").unwrap(),
            Charset::Wide(WideForm::Utf16(Endian::Little))
        );
        assert_eq!(
            Charset::resolve("UTF-16BE").unwrap(),
            Charset::Wide(WideForm::Utf16(Endian::Big))
        );
        assert_eq!(
            Charset::resolve("UTF-32LE").unwrap(),
            Charset::Wide(WideForm::Utf32(Endian::Little))
        );
    }

    #[test]
    fn test_resolve_iconv_single_byte_names() {
        assert_eq!(Charset::resolve("ISO-8859-1").unwrap(), Charset::Byte(ByteForm::Latin1));
        assert_eq!(Charset::resolve("latin1").unwrap().name(), "ISO-8859-1");
        assert_eq!(Charset::resolve("US-ASCII").unwrap(), Charset::Byte(ByteForm::Ascii));
        // Only the WHATWG name itself means windows-1252
        assert_eq!(Charset::resolve("cp1252").unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_resolve_unknown_names() {
        assert_eq!(
            Charset::resolve("bogus-charset-xyz"),
            Err("unsupported charset: bogus-charset-xyz".to_string())
        );
        assert!(Charset::resolve("UTF-7").is_err());
        assert!(Charset::resolve("").is_err());
        // Labels of the WHATWG replacement encoding cannot round-trip
        assert!(Charset::resolve("ISO-2022-KR").is_err());
    }

    #[test]
    fn test_web_decoder_reports_malformed() {
        let mut decoder = Charset::resolve("UTF-8").unwrap().new_decoder();
        let mut out = String::new();
        let (status, read) = decoder.decode_to_string(b"ab\xFFcd", &mut out, true);
        match status {
            DecodeStatus::Malformed { len, after } => assert_eq!(read - len - after, 2),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_web_encoder_reports_unmappable() {
        let mut encoder = Charset::resolve("windows-1252").unwrap().new_encoder();
        let mut out = [0u8; 16];
        let (status, read, written) = encoder.encode_from_str("a中b", &mut out, false);
        assert_eq!(status, EncodeStatus::Unmappable('中'));
        assert_eq!(read, 1 + '中'.len_utf8());
        assert_eq!(&out[..written], b"a");
    }
}
