//! UTF-16, UTF-32, ISO-8859-1 and US-ASCII codecs
//!
//! `encoding_rs` decodes UTF-16 but only ever encodes to UTF-8, and has no
//! UTF-32 support at all. Its labels for ISO-8859-1 and US-ASCII resolve to
//! windows-1252, which differs from both in the C1 range and above 0x7F.
//! These streaming codecs fill the gap with the same calling conventions as
//! the `encoding_rs` decoders and encoders, so the backend can drive all
//! kinds uniformly.

use crate::backend::{DecodeStatus, EncodeStatus};

/// Byte order of a wide code unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

/// A fixed-width Unicode encoding form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WideForm {
    Utf16(Endian),
    Utf32(Endian),
}

impl WideForm {
    /// Resolve the UTF-32 names `encoding_rs` does not know about
    pub(crate) fn utf32_from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("UTF-32LE") {
            Some(WideForm::Utf32(Endian::Little))
        } else if name.eq_ignore_ascii_case("UTF-32BE") {
            Some(WideForm::Utf32(Endian::Big))
        } else {
            None
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            WideForm::Utf16(Endian::Little) => "UTF-16LE",
            WideForm::Utf16(Endian::Big) => "UTF-16BE",
            WideForm::Utf32(Endian::Little) => "UTF-32LE",
            WideForm::Utf32(Endian::Big) => "UTF-32BE",
        }
    }

    fn unit_len(self) -> usize {
        match self {
            WideForm::Utf16(_) => 2,
            WideForm::Utf32(_) => 4,
        }
    }

    fn read_unit(self, bytes: &[u8; 4]) -> u32 {
        match self {
            WideForm::Utf16(Endian::Little) => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
            WideForm::Utf16(Endian::Big) => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
            WideForm::Utf32(Endian::Little) => u32::from_le_bytes(*bytes),
            WideForm::Utf32(Endian::Big) => u32::from_be_bytes(*bytes),
        }
    }

    fn encoded_len(self, ch: char) -> usize {
        match self {
            WideForm::Utf16(_) => ch.len_utf16() * 2,
            WideForm::Utf32(_) => 4,
        }
    }

    /// Write `ch` to the front of `dst`, which must hold `encoded_len(ch)` bytes
    fn write_char(self, ch: char, dst: &mut [u8]) -> usize {
        match self {
            WideForm::Utf16(endian) => {
                let mut units = [0u16; 2];
                let mut written = 0;
                for unit in ch.encode_utf16(&mut units) {
                    let bytes = match endian {
                        Endian::Little => unit.to_le_bytes(),
                        Endian::Big => unit.to_be_bytes(),
                    };
                    dst[written..written + 2].copy_from_slice(&bytes);
                    written += 2;
                }
                written
            }
            WideForm::Utf32(endian) => {
                let bytes = match endian {
                    Endian::Little => (ch as u32).to_le_bytes(),
                    Endian::Big => (ch as u32).to_be_bytes(),
                };
                dst[..4].copy_from_slice(&bytes);
                4
            }
        }
    }
}

/// A single-byte charset whose bytes are the first code points of Unicode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteForm {
    /// ISO-8859-1: every byte maps to U+0000..U+00FF
    Latin1,
    /// US-ASCII: bytes and characters above 0x7F are illegal
    Ascii,
}

const LATIN1_NAMES: [&str; 8] = [
    "ISO-8859-1", "ISO_8859-1", "ISO8859-1", "LATIN1", "L1", "CP819", "IBM819", "ISO-IR-100",
];

const ASCII_NAMES: [&str; 7] = [
    "US-ASCII", "ASCII", "ANSI_X3.4-1968", "ISO646-US", "US", "CP367", "IBM367",
];

impl ByteForm {
    /// Resolve the names `encoding_rs` would map onto windows-1252
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        if LATIN1_NAMES.iter().any(|known| name.eq_ignore_ascii_case(known)) {
            Some(ByteForm::Latin1)
        } else if ASCII_NAMES.iter().any(|known| name.eq_ignore_ascii_case(known)) {
            Some(ByteForm::Ascii)
        } else {
            None
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            ByteForm::Latin1 => "ISO-8859-1",
            ByteForm::Ascii => "US-ASCII",
        }
    }

    fn max(self) -> u32 {
        match self {
            ByteForm::Latin1 => 0xFF,
            ByteForm::Ascii => 0x7F,
        }
    }

    /// Decode `src` onto the end of `dst`; stateless, so `last` is not needed
    pub(crate) fn decode_to_string(self, src: &[u8], dst: &mut String) -> (DecodeStatus, usize) {
        dst.reserve(src.len());
        for (read, &byte) in src.iter().enumerate() {
            if byte as u32 > self.max() {
                return (DecodeStatus::Malformed { len: 1, after: 0 }, read + 1);
            }
            dst.push(char::from(byte));
        }
        (DecodeStatus::InputEmpty, src.len())
    }

    /// Encode as much of `src` as fits into `dst`. An unrepresentable
    /// character is consumed and reported.
    pub(crate) fn encode_from_str(self, src: &str, dst: &mut [u8]) -> (EncodeStatus, usize, usize) {
        let mut read = 0;
        let mut written = 0;

        for ch in src.chars() {
            if ch as u32 > self.max() {
                read += ch.len_utf8();
                return (EncodeStatus::Unmappable(ch), read, written);
            }
            if written == dst.len() {
                return (EncodeStatus::OutputFull, read, written);
            }
            dst[written] = ch as u8;
            written += 1;
            read += ch.len_utf8();
        }

        (EncodeStatus::InputEmpty, read, written)
    }
}

/// Streaming decoder for a [`WideForm`]
///
/// Code units split across calls are buffered; a high surrogate waits for
/// its partner in the next call when it arrives last.
#[derive(Debug)]
pub(crate) struct WideDecoder {
    form: WideForm,
    partial: [u8; 4],
    partial_len: usize,
    high_surrogate: Option<u16>,
}

impl WideDecoder {
    pub(crate) fn new(form: WideForm) -> Self {
        Self {
            form,
            partial: [0; 4],
            partial_len: 0,
            high_surrogate: None,
        }
    }

    /// Decode `src` onto the end of `dst`.
    ///
    /// Returns the status and the number of bytes of `src` consumed. As with
    /// `encoding_rs`, a malformed sequence reports its length and the number
    /// of bytes consumed after it, and may begin in an earlier call's input.
    pub(crate) fn decode_to_string(
        &mut self,
        src: &[u8],
        dst: &mut String,
        last: bool,
    ) -> (DecodeStatus, usize) {
        let unit_len = self.form.unit_len();
        let mut read = 0;

        loop {
            while self.partial_len < unit_len && read < src.len() {
                self.partial[self.partial_len] = src[read];
                self.partial_len += 1;
                read += 1;
            }

            if self.partial_len < unit_len {
                if last && (self.partial_len > 0 || self.high_surrogate.is_some()) {
                    let dangling = if self.high_surrogate.take().is_some() { 2 } else { 0 };
                    let len = dangling + self.partial_len;
                    self.partial_len = 0;
                    return (DecodeStatus::Malformed { len, after: 0 }, read);
                }
                return (DecodeStatus::InputEmpty, read);
            }

            let value = self.form.read_unit(&self.partial);
            self.partial_len = 0;

            match self.form {
                WideForm::Utf32(_) => match char::from_u32(value) {
                    Some(ch) => dst.push(ch),
                    None => return (DecodeStatus::Malformed { len: 4, after: 0 }, read),
                },
                WideForm::Utf16(_) => {
                    let unit = value as u16;
                    if let Some(high) = self.high_surrogate.take() {
                        if !(0xDC00..=0xDFFF).contains(&unit) {
                            // The unit after the lone high surrogate is not part of the error
                            return (DecodeStatus::Malformed { len: 2, after: 2 }, read);
                        }
                        let scalar =
                            0x10000 + (((high as u32) - 0xD800) << 10) + ((unit as u32) - 0xDC00);
                        match char::from_u32(scalar) {
                            Some(ch) => dst.push(ch),
                            None => return (DecodeStatus::Malformed { len: 4, after: 0 }, read),
                        }
                    } else if (0xD800..=0xDBFF).contains(&unit) {
                        self.high_surrogate = Some(unit);
                    } else if (0xDC00..=0xDFFF).contains(&unit) {
                        return (DecodeStatus::Malformed { len: 2, after: 0 }, read);
                    } else {
                        // Not a surrogate, so always a scalar value
                        if let Some(ch) = char::from_u32(unit as u32) {
                            dst.push(ch);
                        }
                    }
                }
            }
        }
    }
}

/// Encoder for a [`WideForm`]; every scalar value is representable
#[derive(Debug)]
pub(crate) struct WideEncoder {
    form: WideForm,
}

impl WideEncoder {
    pub(crate) fn new(form: WideForm) -> Self {
        Self { form }
    }

    /// Encode as much of `src` as fits into `dst`.
    ///
    /// Returns the status, bytes read from `src` and bytes written to `dst`.
    pub(crate) fn encode_from_str(&mut self, src: &str, dst: &mut [u8]) -> (EncodeStatus, usize, usize) {
        let mut read = 0;
        let mut written = 0;

        for ch in src.chars() {
            if dst.len() - written < self.form.encoded_len(ch) {
                return (EncodeStatus::OutputFull, read, written);
            }
            written += self.form.write_char(ch, &mut dst[written..]);
            read += ch.len_utf8();
        }

        (EncodeStatus::InputEmpty, read, written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(form: WideForm, input: &[u8]) -> (String, DecodeStatus, usize) {
        let mut decoder = WideDecoder::new(form);
        let mut out = String::new();
        let (status, read) = decoder.decode_to_string(input, &mut out, true);
        (out, status, read)
    }

    fn encode_all(form: WideForm, input: &str) -> Vec<u8> {
        let mut encoder = WideEncoder::new(form);
        let mut out = vec![0u8; input.len() * 4];
        let (status, read, written) = encoder.encode_from_str(input, &mut out);
        assert_eq!(status, EncodeStatus::InputEmpty);
        assert_eq!(read, input.len());
        out.truncate(written);
        out
    }

    #[test]
    fn test_utf16_endianness() {
        assert_eq!(encode_all(WideForm::Utf16(Endian::Little), "Hi"), [0x48, 0x00, 0x69, 0x00]);
        assert_eq!(encode_all(WideForm::Utf16(Endian::Big), "Hi"), [0x00, 0x48, 0x00, 0x69]);
    }

    #[test]
    fn test_utf16_surrogate_pair() {
        let form = WideForm::Utf16(Endian::Little);
        let bytes = encode_all(form, "🌍");
        assert_eq!(bytes, [0x3C, 0xD8, 0x0D, 0xDF]);

        let (text, status, read) = decode_all(form, &bytes);
        assert_eq!(text, "🌍");
        assert_eq!(status, DecodeStatus::InputEmpty);
        assert_eq!(read, 4);
    }

    #[test]
    fn test_utf16_lone_low_surrogate() {
        let (text, status, read) = decode_all(WideForm::Utf16(Endian::Little), &[0x41, 0x00, 0x00, 0xDC]);
        assert_eq!(text, "A");
        assert_eq!(status, DecodeStatus::Malformed { len: 2, after: 0 });
        assert_eq!(read, 4);
    }

    #[test]
    fn test_utf16_high_surrogate_without_partner() {
        let (text, status, read) =
            decode_all(WideForm::Utf16(Endian::Big), &[0x00, 0x41, 0xD8, 0x00, 0x00, 0x42]);
        assert_eq!(text, "A");
        assert_eq!(status, DecodeStatus::Malformed { len: 2, after: 2 });
        // The error starts at offset 2
        assert_eq!(read - 2 - 2, 2);
    }

    #[test]
    fn test_truncated_input_at_end() {
        let (text, status, _) = decode_all(WideForm::Utf16(Endian::Little), &[0x41, 0x00, 0x42]);
        assert_eq!(text, "A");
        assert_eq!(status, DecodeStatus::Malformed { len: 1, after: 0 });

        let (_, status, _) = decode_all(WideForm::Utf16(Endian::Little), &[0x3C, 0xD8]);
        assert_eq!(status, DecodeStatus::Malformed { len: 2, after: 0 });
    }

    #[test]
    fn test_units_split_across_calls() {
        let mut decoder = WideDecoder::new(WideForm::Utf32(Endian::Big));
        let mut out = String::new();
        let bytes = [0x00, 0x01, 0xF3, 0x0D, 0x00, 0x00, 0x00, 0x21];

        let (status, read) = decoder.decode_to_string(&bytes[..3], &mut out, false);
        assert_eq!((status, read), (DecodeStatus::InputEmpty, 3));
        assert!(out.is_empty());

        let (status, read) = decoder.decode_to_string(&bytes[3..], &mut out, true);
        assert_eq!((status, read), (DecodeStatus::InputEmpty, 5));
        assert_eq!(out, "🌍!");
    }

    #[test]
    fn test_utf32_rejects_invalid_scalars() {
        let form = WideForm::Utf32(Endian::Little);
        let (_, status, _) = decode_all(form, &[0x00, 0x00, 0x11, 0x00]); // above U+10FFFF
        assert_eq!(status, DecodeStatus::Malformed { len: 4, after: 0 });
        let (_, status, _) = decode_all(form, &[0x00, 0xD8, 0x00, 0x00]); // surrogate
        assert_eq!(status, DecodeStatus::Malformed { len: 4, after: 0 });
    }

    #[test]
    fn test_encoder_reports_output_full() {
        let mut encoder = WideEncoder::new(WideForm::Utf32(Endian::Little));
        let mut out = [0u8; 6];
        let (status, read, written) = encoder.encode_from_str("ab", &mut out);
        assert_eq!(status, EncodeStatus::OutputFull);
        assert_eq!((read, written), (1, 4));
    }

    #[test]
    fn test_utf32_names() {
        assert_eq!(WideForm::utf32_from_name("UTF-32LE"), Some(WideForm::Utf32(Endian::Little)));
        assert_eq!(WideForm::utf32_from_name("utf-32be"), Some(WideForm::Utf32(Endian::Big)));
        assert_eq!(WideForm::utf32_from_name("UTF-32"), None);
    }

    #[test]
    fn test_byte_form_names() {
        assert_eq!(ByteForm::from_name("ISO-8859-1"), Some(ByteForm::Latin1));
        assert_eq!(ByteForm::from_name("latin1"), Some(ByteForm::Latin1));
        assert_eq!(ByteForm::from_name("US-ASCII"), Some(ByteForm::Ascii));
        assert_eq!(ByteForm::from_name("ascii"), Some(ByteForm::Ascii));
        assert_eq!(ByteForm::from_name("windows-1252"), None);
        assert_eq!(ByteForm::from_name("ISO-8859-15"), None);
    }

    #[test]
    fn test_latin1_is_identity_on_code_points() {
        let mut out = String::new();
        let (status, read) = ByteForm::Latin1.decode_to_string(&[0x41, 0x80, 0x85, 0xFF], &mut out);
        assert_eq!((status, read), (DecodeStatus::InputEmpty, 4));
        assert_eq!(out, "A\u{80}\u{85}\u{FF}");

        let mut buf = [0u8; 8];
        let (status, read, written) = ByteForm::Latin1.encode_from_str("\u{85}ÿ", &mut buf);
        assert_eq!(status, EncodeStatus::InputEmpty);
        assert_eq!(read, 4);
        assert_eq!(&buf[..written], &[0x85, 0xFF]);

        let (status, read, written) = ByteForm::Latin1.encode_from_str("a€", &mut buf);
        assert_eq!(status, EncodeStatus::Unmappable('€'));
        assert_eq!((read, written), (4, 1));
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let mut out = String::new();
        let (status, read) = ByteForm::Ascii.decode_to_string(b"caf\xE9", &mut out);
        assert_eq!(status, DecodeStatus::Malformed { len: 1, after: 0 });
        assert_eq!(read, 4);
        assert_eq!(out, "caf");

        let mut buf = [0u8; 8];
        let (status, _, written) = ByteForm::Ascii.encode_from_str("é", &mut buf);
        assert_eq!(status, EncodeStatus::Unmappable('é'));
        assert_eq!(written, 0);
    }

    #[test]
    fn test_byte_encoder_reports_output_full() {
        let mut buf = [0u8; 2];
        let (status, read, written) = ByteForm::Ascii.encode_from_str("abc", &mut buf);
        assert_eq!(status, EncodeStatus::OutputFull);
        assert_eq!((read, written), (2, 2));
    }
}
