use std::{env, future::Future};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{bot, config::SETTINGS, event, logging};

/// 啟動排程
pub async fn start(sched: &JobScheduler) -> Result<()> {
    let cadence = SETTINGS.report.cadence();

    let jobs = vec![
        // 依設定的週期建立下一期的報告頁
        create_job(cadence.cron_expr(), event::report::execute),
    ];

    for job in jobs.into_iter().flatten() {
        sched.add(job).await?;
    }

    sched.start().await?;

    let msg = format!(
        "WikiCloner 已啟動 ({})\r\nRust OS/Arch: {}/{}\r\n",
        cadence.name(),
        env::consts::OS,
        env::consts::ARCH
    );

    bot::line::send(&msg).await
}

fn create_job<F, Fut>(cron_expr: &'static str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    cron_expr, why
                ));
            }
        })
    })?)
}
