use anyhow::{anyhow, Result};
use futures::future::join_all;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::{config::SETTINGS, util::http};

const PUSH_MESSAGE_URL: &str = "https://api.line.me/v2/bot/message/push";

static LINE: OnceCell<Line> = OnceCell::new();

struct Line {
    auth_header: HeaderValue,
}

impl Line {
    pub fn new() -> Result<Self> {
        Self::with_token(&SETTINGS.bot.line.channel_token)
    }

    /// channel token 含有無法放進 header 的字元時回報錯誤，而不是默默降級
    fn with_token(channel_token: &str) -> Result<Self> {
        let bearer = format!("Bearer {}", channel_token);
        let auth_header = HeaderValue::from_str(&bearer)
            .map_err(|why| anyhow!("Failed to build authorization header because: {:?}", why))?;

        Ok(Self { auth_header })
    }

    pub async fn send(&self, message: &str) -> Result<()> {
        let futures: Vec<_> = SETTINGS
            .bot
            .line
            .allowed
            .keys()
            .map(|to| self.push_message(PushMessageRequest::new(to, message)))
            .collect();

        join_all(futures)
            .await
            .into_iter()
            .find(|res| res.is_err())
            .unwrap_or_else(|| Ok(()))
    }

    async fn push_message(&self, payload: PushMessageRequest<'_>) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth_header.clone());

        http::post_use_json::<PushMessageRequest, PushMessageResponse>(
            PUSH_MESSAGE_URL,
            Some(headers),
            Some(&payload),
        )
        .await
        .map_err(|err| anyhow!("Failed to push_message because: {:?}", err))?;

        Ok(())
    }
}

fn get_client() -> Result<&'static Line> {
    LINE.get_or_try_init(Line::new)
}

#[derive(Serialize)]
pub struct PushMessageRequest<'a> {
    pub to: &'a str,
    pub messages: Vec<TextMessage<'a>>,
}

impl<'a> PushMessageRequest<'a> {
    pub fn new(to: &'a str, text: &'a str) -> PushMessageRequest<'a> {
        PushMessageRequest {
            to,
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        }
    }
}

#[derive(Serialize)]
pub struct TextMessage<'a> {
    #[serde(rename = "type")]
    pub message_type: &'a str,
    pub text: &'a str,
}

#[derive(Serialize, Deserialize)]
struct PushMessageResponse {
    #[serde(default, rename = "sentMessages")]
    sent_messages: Vec<SentMessage>,
}

#[derive(Serialize, Deserialize)]
struct SentMessage {
    id: String,
}

/// 將訊息推播給設定檔內允許的每一位收件人，任一收件人失敗即回報錯誤
pub async fn send(msg: &str) -> Result<()> {
    get_client()?.send(msg).await
}
