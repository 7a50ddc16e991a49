//! # 報告頁複製器
//!
//! 找出最近一期的報告頁、推算下一期的標題、把內文的日期平移一個週期後
//! 建立新頁面。三步驟的協定固定為「找最新 → 推算目標 → 不存在才建立」，
//! 重複執行必須是安全的︰目標頁已存在時視為正常結束，不會建立第二份。

use chrono::{Local, NaiveDate, Weekday};

use crate::{
    declare::{Cadence, CloneError, CloneOutcome},
    logging,
    store::{DocumentStore, ShiftedDocument},
    util::datetime,
};

pub mod date_shift;
pub mod next_stamp;

/// 複製作業的設定值，由呼叫端明確傳入
#[derive(Debug, Clone)]
pub struct CloneConfig {
    pub title_prefix: String,
    pub cadence: Cadence,
    pub fallback_weekday: Weekday,
    /// 新頁面的父頁面，未設定時沿用來源頁面的父頁面
    pub ancestor_id: Option<String>,
}

/// 複製最近一期的報告頁成為下一期。
///
/// 後備規則以本地時間的今天為基準，測試時請改用 [`clone_if_absent_on`]。
pub async fn clone_if_absent<S: DocumentStore>(
    store: &S,
    cfg: &CloneConfig,
) -> Result<CloneOutcome, CloneError> {
    clone_if_absent_on(store, cfg, Local::now().date_naive()).await
}

/// 與 [`clone_if_absent`] 相同，但由呼叫端指定「今天」的日期。
pub async fn clone_if_absent_on<S: DocumentStore>(
    store: &S,
    cfg: &CloneConfig,
    today: NaiveDate,
) -> Result<CloneOutcome, CloneError> {
    let source = store
        .find_latest(&cfg.title_prefix)
        .await?
        .ok_or_else(|| CloneError::SourceNotFound(cfg.title_prefix.clone()))?;

    logging::debug_file_async(format!(
        "來源頁面 id:{} title:{} space:{}",
        source.id, source.title, source.space_key
    ));

    let next_stamp =
        next_stamp::calculate_next_stamp(&source.title, cfg.cadence, cfg.fallback_weekday, today);
    let target_title = format!("{}{}", cfg.title_prefix, next_stamp);

    if store.exists(&target_title).await? {
        logging::info_file_async(format!("{} 已存在，不需再建立", target_title));
        return Ok(CloneOutcome::AlreadyExists(target_title));
    }

    let offset_days = body_offset_days(&source.title, cfg.cadence, &next_stamp);
    let shifted = ShiftedDocument {
        title: target_title.clone(),
        body: date_shift::shift_all_dates(&source.body, offset_days),
    };
    // 設定檔指定的父頁面優先，否則掛回來源頁面的父頁面之下
    let ancestor_id = cfg
        .ancestor_id
        .as_deref()
        .or(source.ancestor_id.as_deref());

    match store.create(&shifted, ancestor_id).await {
        Ok(created) => {
            logging::info_file_async(format!("已建立 {} ({})", shifted.title, created.link));
            Ok(CloneOutcome::Created {
                id: created.id,
                link: created.link,
            })
        }
        Err(why) => Err(CloneError::CreationFailed {
            title: target_title,
            source: why,
        }),
    }
}

/// 內文日期的平移天數。
///
/// 以新舊日期戳的實際差距為準，月週期時才能正確處理 28~31 天的月份。
/// 來源標題沒有日期戳可供比對時，退回週期的預設天數。
fn body_offset_days(source_title: &str, cadence: Cadence, next_stamp: &str) -> i64 {
    match (
        next_stamp::embedded_stamp_date(source_title),
        datetime::parse_stamp(next_stamp),
    ) {
        (Some(old), Some(new)) => new.signed_duration_since(old).num_days(),
        _ => cadence.fallback_offset_days(),
    }
}
