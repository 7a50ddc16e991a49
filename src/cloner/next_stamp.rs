use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{declare::Cadence, util::datetime};

/// 標題內嵌的 8 位數日期戳
static TITLE_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{8}").expect("Failed to compile title stamp regex"));

/// 取出標題內嵌日期戳所代表的日期，沒有日期戳或不是合法日期時回傳 None。
pub fn embedded_stamp_date(title: &str) -> Option<NaiveDate> {
    TITLE_STAMP
        .find(title)
        .and_then(|m| datetime::parse_stamp(m.as_str()))
}

/// 由來源頁面的標題推算下一期的日期戳（YYYYMMDD）。
///
/// 標題內找不到 8 位數日期戳、或該日期戳不是合法日期時，改用後備規則︰
/// 自 `today`（含當日）起最近的 `fallback_weekday` 作為目標日期。
/// 此函式必定回傳合法的日期戳，不會失敗。
pub fn calculate_next_stamp(
    title: &str,
    cadence: Cadence,
    fallback_weekday: Weekday,
    today: NaiveDate,
) -> String {
    let next = match embedded_stamp_date(title) {
        Some(date) => cadence.advance(date),
        None => datetime::upcoming_weekday(today, fallback_weekday),
    };

    datetime::format_stamp(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_weekly_stamp_from_title() {
        assert_eq!(
            calculate_next_stamp(
                "WeeklyReport_20250912",
                Cadence::Weekly,
                Weekday::Fri,
                day(2025, 9, 15)
            ),
            "20250919"
        );
    }

    #[test]
    fn test_weekly_stamp_rolls_over_year() {
        assert_eq!(
            calculate_next_stamp(
                "WeeklyReport_20251226",
                Cadence::Weekly,
                Weekday::Fri,
                day(2025, 12, 29)
            ),
            "20260102"
        );
    }

    #[test]
    fn test_monthly_stamp_from_title() {
        assert_eq!(
            calculate_next_stamp(
                "MonthlyReport_20250131",
                Cadence::Monthly,
                Weekday::Fri,
                day(2025, 2, 1)
            ),
            "20250228"
        );
    }

    #[test]
    fn test_fallback_when_no_stamp() {
        // 2025-09-13 是週六，最近的週五是下週的 09-19
        assert_eq!(
            calculate_next_stamp(
                "WeeklyReport_NoDateHere",
                Cadence::Weekly,
                Weekday::Fri,
                day(2025, 9, 13)
            ),
            "20250919"
        );
    }

    #[test]
    fn test_fallback_includes_today() {
        // 今天就是週五時，取本週而不是下週
        assert_eq!(
            calculate_next_stamp("WeeklyReport_", Cadence::Weekly, Weekday::Fri, day(2025, 9, 12)),
            "20250912"
        );
    }

    #[test]
    fn test_fallback_honours_configured_weekday() {
        // 後備的星期幾可以設定，不是寫死的週五
        assert_eq!(
            calculate_next_stamp("WeeklyReport_", Cadence::Weekly, Weekday::Mon, day(2025, 9, 13)),
            "20250915"
        );
    }

    #[test]
    fn test_fallback_when_stamp_is_invalid_date() {
        // 20250230 不是合法日期，走後備規則
        assert_eq!(
            calculate_next_stamp(
                "WeeklyReport_20250230",
                Cadence::Weekly,
                Weekday::Fri,
                day(2025, 9, 8)
            ),
            "20250912"
        );
    }

    #[test]
    fn test_embedded_stamp_date() {
        assert_eq!(
            embedded_stamp_date("WeeklyReport_20250912"),
            Some(day(2025, 9, 12))
        );
        assert_eq!(embedded_stamp_date("WeeklyReport_NoDateHere"), None);
        assert_eq!(embedded_stamp_date("WeeklyReport_20250230"), None);
    }
}
