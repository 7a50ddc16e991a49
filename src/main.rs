pub mod bot;
pub mod cloner;
pub mod config;
pub mod declare;
pub mod event;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod util;

use anyhow::Result;
use tokio_cron_scheduler::JobScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let sched = JobScheduler::new().await?;
    scheduler::start(&sched).await?;

    logging::info_console("wiki_cloner 已啟動，等待排程觸發".to_string());

    tokio::signal::ctrl_c().await?;

    logging::info_console("收到中斷訊號，wiki_cloner 結束".to_string());

    Ok(())
}
