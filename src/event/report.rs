use std::fmt::Write;

use anyhow::Result;

use crate::{
    bot,
    cloner::{self, CloneConfig},
    config::SETTINGS,
    declare::{CloneError, CloneOutcome},
    logging,
    store::confluence::Confluence,
};

/// 複製最近一期的報告頁成為下一期，並以 LINE 回報結果。
///
/// 目標頁已存在時視為正常結束，排程重複觸發不會建立第二份。
pub async fn execute() -> Result<()> {
    let store = Confluence::new(
        &SETTINGS.confluence.base_url,
        &SETTINGS.confluence.username,
        &SETTINGS.confluence.api_token,
        &SETTINGS.confluence.space_key,
    )?;
    let cfg = CloneConfig {
        title_prefix: SETTINGS.report.title_prefix.clone(),
        cadence: SETTINGS.report.cadence(),
        fallback_weekday: SETTINGS.report.fallback_weekday(),
        ancestor_id: SETTINGS.confluence.ancestor_id(),
    };

    let outcome = cloner::clone_if_absent(&store, &cfg).await;
    let mut msg = String::with_capacity(256);

    match &outcome {
        Ok(CloneOutcome::Created { id, link }) => {
            logging::info_file_async(format!("report page created id:{} link:{}", id, link));
            let _ = writeln!(&mut msg, "已建立下一期的報告頁︰\r\n{}", link);
        }
        Ok(CloneOutcome::AlreadyExists(title)) => {
            let _ = writeln!(&mut msg, "{} 已存在，本次不需建立", title);
        }
        Err(CloneError::SourceNotFound(prefix)) => {
            logging::warn_file_async(format!(
                "no source page matching {:?} was found",
                prefix
            ));
            let _ = writeln!(&mut msg, "找不到標題為 {}* 的來源頁面，無法複製", prefix);
        }
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to clone the report page because: {:?}",
                why
            ));
            let _ = writeln!(&mut msg, "報告頁複製失敗︰{}", why);
        }
    }

    bot::line::send(&msg).await?;

    outcome.map(|_| ()).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use crate::logging;

    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_execute() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 execute".to_string());

        match execute().await {
            Ok(_) => {}
            Err(why) => {
                logging::debug_file_async(format!("Failed to execute because {:?}", why));
            }
        }

        logging::debug_file_async("結束 execute".to_string());
    }
}
