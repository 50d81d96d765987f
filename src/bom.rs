//! Byte order mark registry
//!
//! A fixed, process-wide table pairing charset names with their byte order
//! mark signatures. Lookups are case-sensitive exact matches on the name.

/// A charset name paired with the byte sequence that marks it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomSignature {
    /// Charset name as understood by the conversion backend
    pub charset: &'static str,
    /// Signature bytes (2 to 4 bytes long)
    pub bytes: &'static [u8],
}

impl BomSignature {
    const fn new(charset: &'static str, bytes: &'static [u8]) -> Self {
        Self { charset, bytes }
    }

    /// Length of the signature in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the signature has no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Registered signatures in match priority order.
///
/// UTF-32LE (`FF FE 00 00`) must come before UTF-16LE (`FF FE`).
pub static BOM_TABLE: [BomSignature; 10] = [
    BomSignature::new("UTF-8", &[0xEF, 0xBB, 0xBF]),
    BomSignature::new("UTF-32LE", &[0xFF, 0xFE, 0x00, 0x00]),
    BomSignature::new("UTF-32BE", &[0x00, 0x00, 0xFE, 0xFF]),
    BomSignature::new("UTF-16LE", &[0xFF, 0xFE]),
    BomSignature::new("UTF-16BE", &[0xFE, 0xFF]),
    BomSignature::new("GB18030", &[0x84, 0x31, 0x95, 0x33]),
    BomSignature::new("UTF-7", &[0x2B, 0x2F, 0x76, 0x38]),
    BomSignature::new("UTF-7", &[0x2B, 0x2F, 0x76, 0x39]),
    BomSignature::new("UTF-7", &[0x2B, 0x2F, 0x76, 0x2B]),
    BomSignature::new("UTF-7", &[0x2B, 0x2F, 0x76, 0x2F]),
];

/// Get the byte order mark for `charset`, or an empty slice if it has none.
///
/// For UTF-7 the first registered variant (`2B 2F 76 38`) is returned.
pub fn lookup_by_charset(charset: &str) -> &'static [u8] {
    BOM_TABLE
        .iter()
        .find(|sig| sig.charset == charset)
        .map(|sig| sig.bytes)
        .unwrap_or(&[])
}

/// Match the start of `data` against the registry.
///
/// Returns the charset of the first signature in priority order that `data`
/// begins with, together with the signature length.
pub fn match_prefix(data: &[u8]) -> Option<(&'static str, usize)> {
    BOM_TABLE
        .iter()
        .find(|sig| data.starts_with(sig.bytes))
        .map(|sig| (sig.charset, sig.len()))
}

/// Byte order mark for `charset`; empty when none is registered
pub fn bom_for(charset: &str) -> &'static [u8] {
    lookup_by_charset(charset)
}
