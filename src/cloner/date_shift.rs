use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// 內文中日期字串的樣式︰四位數年份、分隔符號、1~2 位月份、分隔符號、1~2 位日期
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})([-/.])(\d{1,2})([-/.])(\d{1,2})")
        .expect("Failed to compile date token regex")
});

/// 將內文中每一個合法的日期字串往後平移指定天數，並保留原本的文字格式。
///
/// - 分隔符號沿用原字串（`-`、`/` 或 `.`），月日兩側的分隔符號必須相同。
/// - 月、日是否補零，分別依照原字串的位數各自決定，年份固定輸出四位數。
/// - 跨月、跨年以日曆運算處理，例如 2026-02-26 加七天會得到 2026-03-05。
/// - 無法安全解讀的字串（分隔符號不一致、日曆上不存在的日期）原樣保留。
///
/// 此函式為純函式且不會失敗，任何輸入都能得到輸出。
pub fn shift_all_dates(body: &str, offset_days: i64) -> String {
    DATE_TOKEN
        .replace_all(body, |caps: &Captures| {
            shift_token(caps, offset_days).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// 平移單一日期字串，無法安全解讀時回傳 None
fn shift_token(caps: &Captures, offset_days: i64) -> Option<String> {
    let sep = &caps[2];
    if sep != &caps[4] {
        return None;
    }

    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[3].parse::<u32>().ok()?;
    let day = caps[5].parse::<u32>().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let shifted = date.checked_add_signed(Duration::days(offset_days))?;

    Some(format!(
        "{:04}{}{}{}{}",
        shifted.year(),
        sep,
        render_part(shifted.month(), caps[3].len()),
        sep,
        render_part(shifted.day(), caps[5].len())
    ))
}

/// 依照原字串的位數決定是否補零
fn render_part(value: u32, original_len: usize) -> String {
    if original_len == 2 {
        format!("{:02}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_rolls_over_month() {
        assert_eq!(shift_all_dates("2026-02-26", 7), "2026-03-05");
    }

    #[test]
    fn test_shift_rolls_over_year() {
        assert_eq!(shift_all_dates("2025-12-28", 7), "2026-01-04");
    }

    #[test]
    fn test_preserves_separator() {
        assert_eq!(shift_all_dates("2025/09/12", 7), "2025/09/19");
        assert_eq!(shift_all_dates("2025.09.12", 7), "2025.09.19");
        assert_eq!(shift_all_dates("2025-09-12", 7), "2025-09-19");
    }

    #[test]
    fn test_preserves_zero_padding_per_field() {
        // 原字串有補零，輸出也要補零
        assert_eq!(shift_all_dates("2025-09-05", 7), "2025-09-12");
        // 原字串沒補零，輸出也不補零
        assert_eq!(shift_all_dates("2025-9-5", 7), "2025-9-12");
        // 月日的補零各自獨立
        assert_eq!(shift_all_dates("2025-09-5", 7), "2025-09-12");
        assert_eq!(shift_all_dates("2026-2-26", 7), "2026-3-05");
    }

    #[test]
    fn test_invalid_calendar_date_untouched() {
        assert_eq!(shift_all_dates("2026-02-30", 7), "2026-02-30");
        assert_eq!(shift_all_dates("2025-13-01", 7), "2025-13-01");
    }

    #[test]
    fn test_mismatched_separators_untouched() {
        assert_eq!(shift_all_dates("2026-02/26", 7), "2026-02/26");
        assert_eq!(shift_all_dates("2026.02-26", 7), "2026.02-26");
    }

    #[test]
    fn test_prose_without_dates_unchanged() {
        let body = "本週進度與下週計畫，無任何日期。";
        assert_eq!(shift_all_dates(body, 7), body);
    }

    #[test]
    fn test_multiple_tokens_in_markup() {
        let body = "<p>週期︰2025-09-05 至 2025/09/11</p><p>結帳日 2026-02-30</p>";
        assert_eq!(
            shift_all_dates(body, 7),
            "<p>週期︰2025-09-12 至 2025/09/18</p><p>結帳日 2026-02-30</p>"
        );
    }

    #[test]
    fn test_negative_offset() {
        assert_eq!(shift_all_dates("2026-01-04", -7), "2025-12-28");
    }

    #[test]
    fn test_zero_offset_is_identity_for_valid_tokens() {
        assert_eq!(shift_all_dates("2025-09-12", 0), "2025-09-12");
    }
}
