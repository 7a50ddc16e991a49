use chrono::{Months, NaiveDate};
use thiserror::Error;

/// 報告頁的循環週期
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cadence {
    /// 每週一期
    Weekly,
    /// 每月一期
    Monthly,
}

impl Cadence {
    /// 由設定檔內的文字表示轉回列舉，無法辨識時回傳 None
    pub fn from_name(name: &str) -> Option<Cadence> {
        match name.to_lowercase().as_str() {
            "weekly" | "week" => Some(Cadence::Weekly),
            "monthly" | "month" => Some(Cadence::Monthly),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }

    /// 排程用的 cron 表達式（UTC 時間）
    pub fn cron_expr(&self) -> &'static str {
        match self {
            // 09:00 建立下一週的報告頁
            Cadence::Weekly => "0 0 1 * * Fri",
            // 每月一日 09:00 建立下一個月的報告頁
            Cadence::Monthly => "0 0 1 1 * *",
        }
    }

    /// 將日期往後推進一個週期，月週期會將超出的日號限縮到當月最後一天
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Cadence::Weekly => date
                .checked_add_signed(chrono::Duration::days(7))
                .unwrap_or(date),
            Cadence::Monthly => date.checked_add_months(Months::new(1)).unwrap_or(date),
        }
    }

    /// 來源標題沒有日期戳可供比對時，內文日期平移的預設天數
    pub fn fallback_offset_days(&self) -> i64 {
        match self {
            Cadence::Weekly => 7,
            Cadence::Monthly => 30,
        }
    }
}

/// 複製作業的兩種正常結束狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// 新頁面建立完成
    Created { id: String, link: String },
    /// 目標頁面已存在，重複執行視為正常的 no-op
    AlreadyExists(String),
}

/// 複製作業的失敗原因
#[derive(Debug, Error)]
pub enum CloneError {
    /// 找不到任何符合命名規則的來源頁面，沒有東西可以複製
    #[error("no document matching the title prefix {0:?} was found")]
    SourceNotFound(String),
    /// 文件庫建立頁面失敗，攜帶底層的傳輸錯誤
    #[error("failed to create {title} because: {source:?}")]
    CreationFailed {
        title: String,
        #[source]
        source: anyhow::Error,
    },
    /// 查詢文件庫（搜尋或存在檢查）失敗
    #[error(transparent)]
    StoreUnavailable(#[from] anyhow::Error),
}
