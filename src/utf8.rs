//! Strict UTF-8 validation
//!
//! A table-driven deterministic automaton after Bjoern Hoehrmann's UTF-8
//! decoder (<http://bjoern.hoehrmann.de/utf-8/decoder/dfa/>), reduced to
//! validation: no code points are assembled.
//!
//! The automaton rejects:
//!
//! - overlong encodings (`C0`, `C1`, `E0 80..9F`, `F0 80..8F`)
//! - UTF-16 surrogate halves (`ED A0..BF`)
//! - code points above U+10FFFF (`F4 90..BF`, `F5..FF`)
//! - continuation bytes without a lead byte
//! - a multi-byte sequence truncated at end of input
//!
//! Its verdict therefore agrees with [`std::str::from_utf8`] on every input.

const ACCEPT: u8 = 0;
const REJECT: u8 = 1;

/// Byte classes (first 256 entries) followed by the transition table,
/// indexed as `256 + state * 16 + class`.
#[rustfmt::skip]
static UTF8D: [u8; 400] = [
    // 00..7f
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
    // 80..9f
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
    // a0..bf
    7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
    // c0..df
    8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
    // e0..ef
    0xa,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x3,0x4,0x3,0x3,
    // f0..ff
    0xb,0x6,0x6,0x6,0x5,0x8,0x8,0x8,0x8,0x8,0x8,0x8,0x8,0x8,0x8,0x8,
    // s0
    0x0,0x1,0x2,0x3,0x5,0x8,0x7,0x1,0x1,0x1,0x4,0x6,0x1,0x1,0x1,0x1,
    // s1..s2
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,1,1,0,1,0,1,1,1,1,1,1,
    // s3..s4
    1,2,1,1,1,1,1,2,1,2,1,1,1,1,1,1,1,1,1,1,1,1,1,2,1,1,1,1,1,1,1,1,
    // s5..s6
    1,2,1,1,1,1,1,1,1,2,1,1,1,1,1,1,1,1,1,1,1,1,1,3,1,3,1,1,1,1,1,1,
    // s7..s8
    1,3,1,1,1,1,1,3,1,3,1,1,1,1,1,1,1,3,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
];

/// Where the validator stands after the bytes fed so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    /// Every sequence seen so far is complete and well formed
    Accept,
    /// An ill-formed sequence was seen; the input is rejected for good
    Reject,
    /// In the middle of a multi-byte sequence
    Incomplete,
}

/// Incremental UTF-8 validator
///
/// Bytes may be fed in arbitrary pieces; a sequence split across two calls
/// is validated as if it had been fed at once.
#[derive(Debug, Clone)]
pub struct Utf8Validator {
    state: u8,
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self { state: ACCEPT }
    }
}

impl Utf8Validator {
    /// Create a validator in the accepting state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes, stopping early once the input is rejected
    pub fn feed(&mut self, bytes: &[u8]) -> ValidatorState {
        let mut state = self.state;
        for &byte in bytes {
            if state == REJECT {
                break;
            }
            let class = UTF8D[byte as usize];
            state = UTF8D[256 + state as usize * 16 + class as usize];
        }
        self.state = state;
        self.state()
    }

    /// Current state without feeding anything
    pub fn state(&self) -> ValidatorState {
        match self.state {
            ACCEPT => ValidatorState::Accept,
            REJECT => ValidatorState::Reject,
            _ => ValidatorState::Incomplete,
        }
    }

    /// Whether the input fed so far is complete, valid UTF-8.
    ///
    /// A sequence still in progress counts as invalid.
    pub fn is_valid(&self) -> bool {
        self.state == ACCEPT
    }
}

/// Check whether `bytes` is strictly valid UTF-8. The empty input is valid.
pub fn is_valid_utf8(bytes: &[u8]) -> bool {
    let mut validator = Utf8Validator::new();
    validator.feed(bytes);
    validator.is_valid()
}

/// Drop a multi-byte sequence left incomplete at the end of `bytes`.
///
/// For cutting a sample out of a larger buffer. Input that is invalid
/// before its last three bytes is returned unchanged.
pub fn trim_incomplete_tail(bytes: &[u8]) -> &[u8] {
    let head = bytes.len().saturating_sub(3);
    let mut validator = Utf8Validator::new();
    if validator.feed(&bytes[..head]) == ValidatorState::Reject {
        return bytes;
    }

    let mut complete = validator.is_valid().then_some(head);
    for (i, byte) in bytes[head..].iter().enumerate() {
        match validator.feed(std::slice::from_ref(byte)) {
            ValidatorState::Reject => return bytes,
            ValidatorState::Accept => complete = Some(head + i + 1),
            ValidatorState::Incomplete => {}
        }
    }

    match complete {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
