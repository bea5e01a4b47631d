// 日文輸入常見的全形字元處理

const IDEOGRAPHIC_SPACE: char = '\u{3000}';

pub fn is_space(c: char) -> bool {
    c.is_whitespace() || c == IDEOGRAPHIC_SPACE
}

/// 去掉前後的半形與全形空白
pub fn trim_spaces(s: &str) -> &str {
    s.trim_matches(is_space)
}

/// 全形英數字與符號 (U+FF01..U+FF5E) 轉半形，全形空白轉半形空白
pub fn fold_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            IDEOGRAPHIC_SPACE => ' ',
            _ => c,
        })
        .collect()
}
