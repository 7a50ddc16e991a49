use anyhow::Result;
use async_trait::async_trait;

/// Confluence REST API 客戶端
pub mod confluence;

/// 來源頁面，由外部文件庫查得，為不可變的輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    /// 頁面內文（storage 格式的標記文字）
    pub body: String,
    /// 直屬的父頁面
    pub ancestor_id: Option<String>,
    pub space_key: String,
}

/// 日期平移後待建立的新頁面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftedDocument {
    pub title: String,
    pub body: String,
}

/// 文件庫建立頁面成功後回傳的識別資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub id: String,
    pub link: String,
}

/// 文件庫的抽象能力。
///
/// 系統的資料以外部文件庫為準，這裡只定義複製作業需要的三個操作，
/// 實作端可以是 REST 客戶端，也可以是瀏覽器驅動。
#[async_trait]
pub trait DocumentStore {
    /// 依標題前綴找出最近一期的頁面，找不到時回傳 None
    async fn find_latest(&self, title_prefix: &str) -> Result<Option<SourceDocument>>;

    /// 目標空間內是否已存在指定標題的頁面
    async fn exists(&self, title: &str) -> Result<bool>;

    /// 建立新頁面。單一一次呼叫即完成，不會留下半成品。
    async fn create(
        &self,
        doc: &ShiftedDocument,
        ancestor_id: Option<&str>,
    ) -> Result<CreatedDocument>;
}
