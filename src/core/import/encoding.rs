use crate::utils::error::{CizError, Result};
use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// 判斷上傳檔案的文字編碼並轉成 UTF-8
///
/// 順序: BOM -> 合法 UTF-8 -> fallback (預設 Shift_JIS) -> EUC-JP。
/// 試算表軟體在日文環境下預設輸出 Shift_JIS，所以 fallback 放在 EUC-JP 之前。
pub fn decode_bytes(bytes: &[u8], fallback_label: &str) -> Result<DecodedText> {
    if bytes.is_empty() {
        return Err(CizError::EncodingError {
            message: "ファイルが空です".to_string(),
        });
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_strict(encoding, &bytes[bom_len..]).ok_or_else(undetectable);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
        });
    }

    let fallback = Encoding::for_label(fallback_label.as_bytes()).unwrap_or(SHIFT_JIS);
    let mut candidates = vec![fallback];
    for extra in [SHIFT_JIS, EUC_JP] {
        if !candidates.contains(&extra) {
            candidates.push(extra);
        }
    }

    for encoding in candidates {
        if let Some(decoded) = decode_strict(encoding, bytes) {
            return Ok(decoded);
        }
        tracing::debug!("Input is not valid {}", encoding.name());
    }

    Err(undetectable())
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<DecodedText> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return None;
    }
    Some(DecodedText {
        text: text.into_owned(),
        encoding: encoding.name(),
    })
}

fn undetectable() -> CizError {
    CizError::EncodingError {
        message: "文字コードを判別できません".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "社員番号,氏名,メールアドレス,性別\n";

    #[test]
    fn test_plain_utf8() {
        let decoded = decode_bytes(HEADER.as_bytes(), "shift_jis").unwrap();
        assert_eq!(decoded.text, HEADER);
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(HEADER.as_bytes());
        let decoded = decode_bytes(&bytes, "shift_jis").unwrap();
        assert_eq!(decoded.text, HEADER);
    }

    #[test]
    fn test_shift_jis_fallback() {
        let (bytes, _, had_errors) = SHIFT_JIS.encode(HEADER);
        assert!(!had_errors);
        let decoded = decode_bytes(&bytes, "shift_jis").unwrap();
        assert_eq!(decoded.text, HEADER);
        assert_eq!(decoded.encoding, "Shift_JIS");
    }

    #[test]
    fn test_configured_fallback_is_tried_first() {
        let (bytes, _, _) = EUC_JP.encode("山田 太郎");
        let decoded = decode_bytes(&bytes, "euc-jp").unwrap();
        assert_eq!(decoded.text, "山田 太郎");
        assert_eq!(decoded.encoding, "EUC-JP");
    }

    #[test]
    fn test_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "氏名".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_bytes(&bytes, "shift_jis").unwrap();
        assert_eq!(decoded.text, "氏名");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn test_utf16be_with_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "社員番号".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let decoded = decode_bytes(&bytes, "shift_jis").unwrap();
        assert_eq!(decoded.text, "社員番号");
        assert_eq!(decoded.encoding, "UTF-16BE");
    }

    #[test]
    fn test_bytes_invalid_in_every_candidate() {
        // 0x81 0xFF: Shift_JIS 第二位元組不合法，EUC-JP 也不接受 0x81 開頭
        let bytes = [0x81, 0xFF, 0xFE, 0x80];
        for fallback in ["shift_jis", "euc-jp"] {
            let err = decode_bytes(&bytes, fallback).unwrap_err();
            assert!(matches!(err, CizError::EncodingError { .. }));
            assert_eq!(err.user_friendly_message(), "文字コードを判別できません");
        }
    }

    #[test]
    fn test_empty_input() {
        let err = decode_bytes(&[], "shift_jis").unwrap_err();
        assert_eq!(err.user_friendly_message(), "ファイルが空です");
    }
}
