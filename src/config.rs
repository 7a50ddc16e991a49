use std::{collections::HashMap, env, path::PathBuf};

use anyhow::Result;
use chrono::Weekday;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{declare::Cadence, logging, util::datetime};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    pub confluence: Confluence,
    pub report: Report,
    pub bot: Bot,
}

const CONFLUENCE_BASE_URL: &str = "CONFLUENCE_BASE_URL";
const CONFLUENCE_USER: &str = "CONFLUENCE_USER";
const CONFLUENCE_API_TOKEN: &str = "CONFLUENCE_API_TOKEN";
const CONFLUENCE_SPACE_KEY: &str = "CONFLUENCE_SPACE_KEY";
const CONFLUENCE_ANCESTOR_ID: &str = "CONFLUENCE_ANCESTOR_ID";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Confluence {
    /// 例︰https://example.atlassian.net/wiki
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub space_key: String,
    /// 新頁面的父頁面，留空時掛在來源頁面的父頁面之下
    #[serde(default)]
    pub ancestor_id: String,
}

impl Confluence {
    /// 設定檔指定的父頁面，留空視為未設定
    pub fn ancestor_id(&self) -> Option<String> {
        if self.ancestor_id.is_empty() {
            None
        } else {
            Some(self.ancestor_id.clone())
        }
    }
}

const REPORT_TITLE_PREFIX: &str = "REPORT_TITLE_PREFIX";
const REPORT_CADENCE: &str = "REPORT_CADENCE";
const REPORT_FALLBACK_WEEKDAY: &str = "REPORT_FALLBACK_WEEKDAY";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    /// 報告頁的標題前綴，後面接 YYYYMMDD 的日期戳
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// weekly 或 monthly
    #[serde(default = "default_cadence")]
    pub cadence: String,
    /// 標題內沒有日期戳時，以最近的這個星期幾當作目標日期
    #[serde(default = "default_fallback_weekday")]
    pub fallback_weekday: String,
}

fn default_title_prefix() -> String {
    "WeeklyReport_".to_string()
}

fn default_cadence() -> String {
    Cadence::Weekly.name().to_string()
}

fn default_fallback_weekday() -> String {
    "Fri".to_string()
}

impl Default for Report {
    fn default() -> Self {
        Report {
            title_prefix: default_title_prefix(),
            cadence: default_cadence(),
            fallback_weekday: default_fallback_weekday(),
        }
    }
}

impl Report {
    /// 設定值無法辨識時退回每週
    pub fn cadence(&self) -> Cadence {
        Cadence::from_name(&self.cadence).unwrap_or_else(|| {
            logging::warn_file_async(format!(
                "Unknown cadence {:?}, falling back to weekly",
                self.cadence
            ));
            Cadence::Weekly
        })
    }

    /// 設定值無法辨識時退回週五
    pub fn fallback_weekday(&self) -> Weekday {
        datetime::parse_weekday(&self.fallback_weekday).unwrap_or_else(|| {
            logging::warn_file_async(format!(
                "Unknown fallback weekday {:?}, falling back to Friday",
                self.fallback_weekday
            ));
            Weekday::Fri
        })
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Bot {
    pub line: Line,
}

const LINE_CHANNEL_TOKEN: &str = "LINE_CHANNEL_TOKEN";
const LINE_ALLOWED: &str = "LINE_ALLOWED";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Line {
    /// 收件人清單，key 為 LINE 的 user id、value 為備註名稱
    pub allowed: HashMap<String, String>,
    pub channel_token: String,
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::from_env())
    }

    /// 從 env 中讀取設定值
    fn from_env() -> Self {
        let line_allowed = env::var(LINE_ALLOWED).unwrap_or_default();
        let mut allowed_list: HashMap<String, String> = Default::default();
        if !line_allowed.is_empty() {
            if let Ok(allowed) = serde_json::from_str::<HashMap<String, String>>(&line_allowed) {
                allowed_list = allowed;
            }
        }

        App {
            confluence: Confluence {
                base_url: env::var(CONFLUENCE_BASE_URL).expect(CONFLUENCE_BASE_URL),
                username: env::var(CONFLUENCE_USER).expect(CONFLUENCE_USER),
                api_token: env::var(CONFLUENCE_API_TOKEN).expect(CONFLUENCE_API_TOKEN),
                space_key: env::var(CONFLUENCE_SPACE_KEY).expect(CONFLUENCE_SPACE_KEY),
                ancestor_id: env::var(CONFLUENCE_ANCESTOR_ID).unwrap_or_default(),
            },
            report: Report {
                title_prefix: env::var(REPORT_TITLE_PREFIX)
                    .unwrap_or_else(|_| default_title_prefix()),
                cadence: env::var(REPORT_CADENCE).unwrap_or_else(|_| default_cadence()),
                fallback_weekday: env::var(REPORT_FALLBACK_WEEKDAY)
                    .unwrap_or_else(|_| default_fallback_weekday()),
            },
            bot: Bot {
                line: Line {
                    allowed: allowed_list,
                    channel_token: env::var(LINE_CHANNEL_TOKEN).expect(LINE_CHANNEL_TOKEN),
                },
            },
        }
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(base_url) = env::var(CONFLUENCE_BASE_URL) {
            self.confluence.base_url = base_url;
        }

        if let Ok(username) = env::var(CONFLUENCE_USER) {
            self.confluence.username = username;
        }

        if let Ok(api_token) = env::var(CONFLUENCE_API_TOKEN) {
            self.confluence.api_token = api_token;
        }

        if let Ok(space_key) = env::var(CONFLUENCE_SPACE_KEY) {
            self.confluence.space_key = space_key;
        }

        if let Ok(ancestor_id) = env::var(CONFLUENCE_ANCESTOR_ID) {
            self.confluence.ancestor_id = ancestor_id;
        }

        if let Ok(title_prefix) = env::var(REPORT_TITLE_PREFIX) {
            self.report.title_prefix = title_prefix;
        }

        if let Ok(cadence) = env::var(REPORT_CADENCE) {
            self.report.cadence = cadence;
        }

        if let Ok(fallback_weekday) = env::var(REPORT_FALLBACK_WEEKDAY) {
            self.report.fallback_weekday = fallback_weekday;
        }

        if let Ok(channel_token) = env::var(LINE_CHANNEL_TOKEN) {
            self.bot.line.channel_token = channel_token;
        }

        if let Ok(line_allowed) = env::var(LINE_ALLOWED) {
            match serde_json::from_str::<HashMap<String, String>>(&line_allowed) {
                Ok(allowed) => {
                    self.bot.line.allowed = allowed;
                }
                Err(why) => {
                    logging::error_file_async(format!(
                        "Failed to serde_json because: {:?} \r\n {}",
                        why, &line_allowed
                    ));
                }
            }
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_cadence() {
        let mut report = Report::default();
        assert_eq!(report.cadence(), Cadence::Weekly);

        report.cadence = "monthly".to_string();
        assert_eq!(report.cadence(), Cadence::Monthly);
    }

    #[test]
    fn test_confluence_ancestor_id() {
        let mut confluence = Confluence::default();
        assert_eq!(confluence.ancestor_id(), None);

        confluence.ancestor_id = "42".to_string();
        assert_eq!(confluence.ancestor_id(), Some("42".to_string()));
    }

    #[test]
    fn test_report_fallback_weekday() {
        let mut report = Report::default();
        assert_eq!(report.fallback_weekday(), Weekday::Fri);

        report.fallback_weekday = "monday".to_string();
        assert_eq!(report.fallback_weekday(), Weekday::Mon);

        report.fallback_weekday = "someday".to_string();
        assert_eq!(report.fallback_weekday(), Weekday::Fri);
    }

    #[tokio::test]
    #[ignore]
    async fn test_init() {
        dotenv::dotenv().ok();
        logging::debug_file_async(format!(
            "SETTINGS.confluence: {:#?}\r\nSETTINGS.report: {:#?}\r\n",
            SETTINGS.confluence, SETTINGS.report
        ));
    }
}
