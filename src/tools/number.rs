//! 數值字串判斷
//!
//! ffprobe 回報的長度可能是 "12.345000"、"N/A" 或根本不存在，
//! 只有純數字（最多一個小數點）才視為可判定的長度。

use regex::Regex;
use std::sync::LazyLock;

static REGEX_PLAIN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("Invalid regex"));

/// 判斷字串是否為非負的十進位數字
///
/// 不接受正負號、指數或前後空白。
#[must_use]
pub fn is_plain_number(raw: &str) -> bool {
    REGEX_PLAIN_NUMBER.is_match(raw)
}

/// 解析為秒數，非純數字時回傳 `None`
#[must_use]
pub fn parse_seconds(raw: &str) -> Option<f64> {
    if !is_plain_number(raw) {
        return None;
    }
    raw.parse::<f64>().ok()
}
