use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::borrow::Cow;

/// Decode text exported by spreadsheets: BOM first, then UTF-8, then Windows-1252.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return (text, encoding);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), UTF_8),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            (text, WINDOWS_1252)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let (text, encoding) = decode_text(b"LSD\n7-27-72-3 W4\n");
        assert_eq!(text, "LSD\n7-27-72-3 W4\n");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let (text, encoding) = decode_text(b"\xEF\xBB\xBFLSD\n");
        assert_eq!(text, "LSD\n");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // e-acute as written by a Windows spreadsheet
        let (text, encoding) = decode_text(b"Site\nCaf\xE9\n");
        assert_eq!(text, "Site\nCaf\u{e9}\n");
        assert_eq!(encoding, WINDOWS_1252);
    }
}
