//! Typed access to the paginated contents endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use vt_core::{LabelInfo, MediaType};

use crate::error::ClientError;

/// Filters sent with every page request. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
    pub search: Option<String>,
    pub media_type: Option<MediaType>,
    pub genre_id: Option<i64>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub rating_dir: Option<String>,
    pub orderby: Option<String>,
    pub order_dir: Option<String>,
}

impl ContentQuery {
    /// Query-string pairs for a given page.
    pub fn to_pairs(&self, page: u32, limit: u32) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref s) = self.search {
            pairs.push(("search", s.clone()));
        }
        if let Some(t) = self.media_type {
            pairs.push(("type", t.as_str().to_string()));
        }
        if let Some(g) = self.genre_id {
            pairs.push(("genreId", g.to_string()));
        }
        if let Some(y) = self.year {
            pairs.push(("year", y.to_string()));
        }
        if let Some(r) = self.rating {
            pairs.push(("rating", r.to_string()));
        }
        if let Some(ref d) = self.rating_dir {
            pairs.push(("rating_dir", d.clone()));
        }
        if let Some(ref o) = self.orderby {
            pairs.push(("orderby", o.clone()));
        }
        if let Some(ref d) = self.order_dir {
            pairs.push(("order_dir", d.clone()));
        }
        pairs.push(("page", page.to_string()));
        pairs.push(("limit", limit.to_string()));
        pairs
    }
}

/// One entry of a contents page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub label_info: Option<LabelInfo>,
}

impl ContentItem {
    /// Identity used for de-duplication; ids are unique per type only.
    pub fn key(&self) -> (MediaType, i64) {
        (self.media_type, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_on_page: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentPage {
    pub data: Vec<ContentItem>,
    pub pagination: PageInfo,
}

/// Source of content pages.
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Fetch one page. Must return [`ClientError::Cancelled`] once `cancel`
    /// fires.
    async fn fetch_page(
        &self,
        query: &ContentQuery,
        page: u32,
        limit: u32,
        cancel: CancellationToken,
    ) -> Result<ContentPage, ClientError>;
}

/// [`ContentsApi`] over HTTP.
///
/// Holds one connection pool; build it once per process and share it as
/// `Arc<dyn ContentsApi>`.
#[derive(Debug, Clone)]
pub struct HttpContentsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentsApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl ContentsApi for HttpContentsApi {
    async fn fetch_page(
        &self,
        query: &ContentQuery,
        page: u32,
        limit: u32,
        cancel: CancellationToken,
    ) -> Result<ContentPage, ClientError> {
        let request = self
            .client
            .get(format!("{}/api/contents", self.base_url))
            .query(&query.to_pairs(page, limit))
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            r = request => r?,
        };

        let status = response.status();
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            b = response.bytes() => b?,
        };

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
