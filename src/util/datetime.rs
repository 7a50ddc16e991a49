use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 將 YYYYMMDD 格式的日期戳解析成日期，格式錯誤或日期不存在時回傳 None。
pub fn parse_stamp(stamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

/// 將日期格式化成 YYYYMMDD 的日期戳。
pub fn format_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 自指定日期起（含當日）最近的指定星期幾。
///
/// `from` 當天就是 `weekday` 時回傳 `from` 本身，而不是下一週。
pub fn upcoming_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);

    from + Duration::days(days_ahead)
}

/// 解析設定檔中的星期幾名稱（如 "Fri"、"friday"）。
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.parse::<Weekday>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stamp() {
        assert_eq!(
            parse_stamp("20250912"),
            NaiveDate::from_ymd_opt(2025, 9, 12)
        );
        assert_eq!(parse_stamp("20250230"), None);
        assert_eq!(parse_stamp("2025091"), None);
    }

    #[test]
    fn test_format_stamp() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(format_stamp(date), "20260104");
    }

    #[test]
    fn test_upcoming_weekday() {
        // 2025-09-12 是週五
        let friday = NaiveDate::from_ymd_opt(2025, 9, 12).unwrap();
        assert_eq!(upcoming_weekday(friday, Weekday::Fri), friday);

        // 週六往後找，應該是下週五
        let saturday = NaiveDate::from_ymd_opt(2025, 9, 13).unwrap();
        assert_eq!(
            upcoming_weekday(saturday, Weekday::Fri),
            NaiveDate::from_ymd_opt(2025, 9, 19).unwrap()
        );

        // 週一往後找本週五
        let monday = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        assert_eq!(
            upcoming_weekday(monday, Weekday::Fri),
            NaiveDate::from_ymd_opt(2025, 9, 12).unwrap()
        );
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Fri"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("noday"), None);
    }
}
