use fast_charset::bom::{BOM_TABLE, match_prefix};
use fast_charset::{ConversionOptions, DetectionMethod, Error, bom, convert, detect, is_valid_utf8};
use proptest::prelude::*;

fn strict() -> ConversionOptions {
    ConversionOptions::new().strict(true)
}

proptest! {
    #[test]
    fn validator_agrees_with_std(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(is_valid_utf8(&bytes), std::str::from_utf8(&bytes).is_ok());
    }

    #[test]
    fn valid_utf8_without_bom_detects_as_utf8(text in any::<String>()) {
        prop_assume!(match_prefix(text.as_bytes()).is_none());
        let detection = detect(text.as_bytes()).unwrap();
        prop_assert_eq!(detection.charset, "UTF-8");
        prop_assert!(!detection.had_bom);
    }

    #[test]
    fn bom_prefix_always_wins(index in 0..BOM_TABLE.len(), tail in proptest::collection::vec(any::<u8>(), 0..32)) {
        let sig = &BOM_TABLE[index];
        // FF FE 00 00 belongs to UTF-32LE
        prop_assume!(!(sig.charset == "UTF-16LE" && tail.starts_with(&[0x00, 0x00])));
        let mut data = sig.bytes.to_vec();
        data.extend_from_slice(&tail);

        let detection = detect(&data).unwrap();
        prop_assert_eq!(detection.charset.as_str(), sig.charset);
        prop_assert!(detection.had_bom);
        prop_assert_eq!(detection.method, DetectionMethod::Bom);
        prop_assert_eq!(match_prefix(&data), Some((sig.charset, sig.len())));
        if sig.charset != "UTF-7" {
            prop_assert_eq!(bom(sig.charset), sig.bytes);
        }
    }

    #[test]
    fn unicode_roundtrip(
        text in any::<String>(),
        charset in prop::sample::select(vec!["UTF-16LE", "UTF-16BE", "UTF-32LE", "UTF-32BE"]),
    ) {
        let encoded = convert(charset, "UTF-8", text.as_bytes(), strict()).unwrap();
        let decoded = convert("UTF-8", charset, &encoded, strict()).unwrap();
        prop_assert_eq!(decoded, text.into_bytes());
    }

    #[test]
    fn legacy_charset_roundtrip(
        (charset, text) in prop_oneof![
            "[ -~àéüßñ€™Œ]{0,120}".prop_map(|text| ("windows-1252", text)),
            "[ -~あいうえおアイウエオ日本語漢字]{0,120}".prop_map(|text| ("Shift_JIS", text)),
            "[ -~中文编码转换简体字]{0,120}".prop_map(|text| ("GB18030", text)),
            "[ -~\u{80}-\u{FF}]{0,120}".prop_map(|text| ("ISO-8859-1", text)),
        ],
    ) {
        let encoded = convert(charset, "UTF-8", text.as_bytes(), strict()).unwrap();
        let decoded = convert("UTF-8", charset, &encoded, strict()).unwrap();
        prop_assert_eq!(decoded, text.into_bytes());
    }

    #[test]
    fn lenient_equals_strict_on_clean_input(text in "[ -~éü€中]{0,200}") {
        let strict_out = convert("UTF-16BE", "UTF-8", text.as_bytes(), strict()).unwrap();
        let lenient_out = convert("UTF-16BE", "UTF-8", text.as_bytes(), ConversionOptions::new()).unwrap();
        prop_assert_eq!(strict_out, lenient_out);
    }

    #[test]
    fn lenient_omits_exactly_the_illegal_byte(
        prefix in "[a-z ]{0,40}",
        suffix in "[a-z ]{0,40}",
        bad in prop::sample::select(vec![0x80u8, 0xBF, 0xC0, 0xC1, 0xF5, 0xFE, 0xFF]),
    ) {
        let mut input = prefix.clone().into_bytes();
        input.push(bad);
        input.extend_from_slice(suffix.as_bytes());

        prop_assert_eq!(
            convert("UTF-16LE", "UTF-8", &input, strict()),
            Err(Error::IllegalSequence { offset: Some(prefix.len()) })
        );

        let lenient = convert("UTF-16LE", "UTF-8", &input, ConversionOptions::new()).unwrap();
        let clean = format!("{}{}", prefix, suffix);
        let expected = convert("UTF-16LE", "UTF-8", clean.as_bytes(), strict()).unwrap();
        prop_assert_eq!(lenient, expected);
    }
}
