//! # Confluence 文件庫
//!
//! 以 Confluence REST API 實作 `DocumentStore`︰
//!
//! - `find_latest`︰以 CQL 搜尋指定前綴的頁面，依建立時間取最新的一筆。
//! - `exists`︰以空間加標題查詢，作為重複建立的防呆。
//! - `create`︰`POST /rest/api/content` 一次完成建立，內文使用 storage 格式。
//!
//! 認證使用 email + API token 的 basic auth。

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use concat_string::concat_string;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::{
    store::{CreatedDocument, DocumentStore, ShiftedDocument, SourceDocument},
    util::http,
};

pub struct Confluence {
    base_url: String,
    space_key: String,
    auth_header: HeaderValue,
}

impl Confluence {
    pub fn new(base_url: &str, username: &str, api_token: &str, space_key: &str) -> Result<Self> {
        let token = STANDARD.encode(format!("{}:{}", username, api_token));
        let auth_header = HeaderValue::from_str(&concat_string!("Basic ", token))
            .map_err(|why| anyhow!("Failed to build authorization header because: {:?}", why))?;

        Ok(Confluence {
            base_url: base_url.trim_end_matches('/').to_string(),
            space_key: space_key.to_string(),
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }
}

#[async_trait]
impl DocumentStore for Confluence {
    async fn find_latest(&self, title_prefix: &str) -> Result<Option<SourceDocument>> {
        let cql = format!(
            r#"space = "{}" and type = page and title ~ "{}*" order by created desc"#,
            self.space_key, title_prefix
        );
        let url = concat_string!(
            self.base_url,
            "/rest/api/content/search?limit=1&expand=body.storage,ancestors&cql=",
            urlencoding::encode(&cql)
        );

        let res = http::get_json::<PageListResponse>(&url, Some(self.headers())).await?;
        let page = match res.results.into_iter().next() {
            Some(page) => page,
            None => return Ok(None),
        };

        Ok(Some(SourceDocument {
            ancestor_id: page.parent_id(),
            body: page
                .body
                .and_then(|b| b.storage)
                .map(|s| s.value)
                .unwrap_or_default(),
            id: page.id,
            title: page.title,
            space_key: self.space_key.clone(),
        }))
    }

    async fn exists(&self, title: &str) -> Result<bool> {
        let url = concat_string!(
            self.base_url,
            "/rest/api/content?limit=1&spaceKey=",
            urlencoding::encode(&self.space_key),
            "&title=",
            urlencoding::encode(title)
        );

        let res = http::get_json::<PageListResponse>(&url, Some(self.headers())).await?;

        Ok(!res.results.is_empty())
    }

    async fn create(
        &self,
        doc: &ShiftedDocument,
        ancestor_id: Option<&str>,
    ) -> Result<CreatedDocument> {
        let url = concat_string!(self.base_url, "/rest/api/content");
        let req = CreatePageRequest {
            content_type: "page",
            title: &doc.title,
            space: SpaceRef {
                key: &self.space_key,
            },
            ancestors: ancestor_id
                .map(|id| vec![AncestorRef { id }])
                .unwrap_or_default(),
            body: CreateBody {
                storage: CreateStorage {
                    value: &doc.body,
                    representation: "storage",
                },
            },
        };

        let page =
            http::post_use_json::<CreatePageRequest, Page>(&url, Some(self.headers()), Some(&req))
                .await?;
        let link = match page.links {
            Some(links) if !links.webui.is_empty() => concat_string!(self.base_url, links.webui),
            _ => concat_string!(self.base_url, "/pages/", page.id),
        };

        Ok(CreatedDocument { id: page.id, link })
    }
}

#[derive(Deserialize)]
struct PageListResponse {
    #[serde(default)]
    results: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    id: String,
    title: String,
    #[serde(default)]
    body: Option<PageBody>,
    #[serde(default)]
    ancestors: Vec<Ancestor>,
    #[serde(default, rename = "_links")]
    links: Option<Links>,
}

impl Page {
    /// ancestors 依層級由上而下排序，最後一筆是直屬的父頁面
    fn parent_id(&self) -> Option<String> {
        self.ancestors.last().map(|a| a.id.clone())
    }
}

#[derive(Deserialize)]
struct PageBody {
    #[serde(default)]
    storage: Option<Storage>,
}

#[derive(Deserialize)]
struct Storage {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct Ancestor {
    id: String,
}

#[derive(Deserialize)]
struct Links {
    #[serde(default)]
    webui: String,
}

#[derive(Serialize)]
struct CreatePageRequest<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    title: &'a str,
    space: SpaceRef<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ancestors: Vec<AncestorRef<'a>>,
    body: CreateBody<'a>,
}

#[derive(Serialize)]
struct SpaceRef<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct AncestorRef<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    storage: CreateStorage<'a>,
}

#[derive(Serialize)]
struct CreateStorage<'a> {
    value: &'a str,
    representation: &'a str,
}

#[cfg(test)]
mod tests {
    use crate::{config::SETTINGS, logging};

    use super::*;

    fn client() -> Result<Confluence> {
        Confluence::new(
            &SETTINGS.confluence.base_url,
            &SETTINGS.confluence.username,
            &SETTINGS.confluence.api_token,
            &SETTINGS.confluence.space_key,
        )
    }

    #[tokio::test]
    #[ignore]
    async fn test_find_latest() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 test_find_latest".to_string());

        match client().unwrap().find_latest("WeeklyReport_").await {
            Ok(doc) => {
                logging::debug_file_async(format!("doc: {:#?}", doc));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to find_latest because {:?}", why));
            }
        }

        logging::debug_file_async("結束 test_find_latest".to_string());
    }

    #[tokio::test]
    #[ignore]
    async fn test_exists() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 test_exists".to_string());

        match client().unwrap().exists("WeeklyReport_20250912").await {
            Ok(found) => {
                logging::debug_file_async(format!("exists: {}", found));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to exists because {:?}", why));
            }
        }

        logging::debug_file_async("結束 test_exists".to_string());
    }
}
