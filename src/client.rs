//! HTTP client for the AlKetab search API
//!
//! Two request shapes share one endpoint: the initial natural-language
//! search (`message`) and stateless pagination keyed by the server-issued
//! continuation token (`generated_query`, `page`, `sort_by`).

use crate::config::Settings;
use crate::error::AlKetabError;
use crate::models::{NormalizedPage, SortOrder};
use crate::normalize::decode_page;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

/// The search operations the session depends on.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Run a natural-language search and return the first page.
    async fn search_initial(&self, query: &str) -> Result<NormalizedPage, AlKetabError>;

    /// Fetch a 1-based `page` for a continuation token returned by an
    /// earlier search. The original query text is never sent here.
    async fn search_continuation(
        &self,
        token: &str,
        page: u32,
        sort: SortOrder,
    ) -> Result<NormalizedPage, AlKetabError>;
}

/// Stateless client; each call issues exactly one GET.
pub struct SearchClient {
    http: Client,
    base_url: Url,
    api_key: String,
    api_key_header: String,
}

impl SearchClient {
    pub fn new(settings: &Settings) -> Result<Self, AlKetabError> {
        settings.validate()?;
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| AlKetabError::InvalidUrl(e.to_string()))?;
        let http = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
            api_key_header: settings.api_key_header.clone(),
        })
    }

    pub fn initial_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().clear().append_pair("message", query);
        url
    }

    pub fn continuation_url(&self, token: &str, page: u32, sort: SortOrder) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("generated_query", token)
            .append_pair("page", &page.to_string())
            .append_pair("sort_by", sort.wire_token());
        url
    }

    async fn execute(&self, url: Url) -> Result<NormalizedPage, AlKetabError> {
        tracing::debug!(url = %url, "sending search request");

        let response = self
            .http
            .get(url)
            .header(self.api_key_header.as_str(), self.api_key.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "search request failed");
                AlKetabError::Network(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "search response received");
        if let Some(err) = classify_status(status) {
            tracing::warn!(status = status.as_u16(), error = %err, "search rejected");
            return Err(err);
        }

        let body = response.bytes().await?;
        interpret_body(&body)
    }
}

#[async_trait]
impl SearchApi for SearchClient {
    async fn search_initial(&self, query: &str) -> Result<NormalizedPage, AlKetabError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AlKetabError::EmptyQuery);
        }
        self.execute(self.initial_url(query)).await
    }

    async fn search_continuation(
        &self,
        token: &str,
        page: u32,
        sort: SortOrder,
    ) -> Result<NormalizedPage, AlKetabError> {
        if token.is_empty() {
            return Err(AlKetabError::MissingContinuationToken);
        }
        self.execute(self.continuation_url(token, page, sort)).await
    }
}

/// Statuses that end a call before the body is looked at. Anything else,
/// including other non-2xx codes, falls through to body decoding.
pub fn classify_status(status: StatusCode) -> Option<AlKetabError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(AlKetabError::Unauthorized),
        StatusCode::PAYMENT_REQUIRED => Some(AlKetabError::InsufficientCredits),
        StatusCode::BAD_REQUEST => Some(AlKetabError::bad_request()),
        _ => None,
    }
}

pub fn interpret_body(body: &[u8]) -> Result<NormalizedPage, AlKetabError> {
    if body.is_empty() {
        tracing::warn!("search response had no body");
        return Err(AlKetabError::NoData);
    }
    tracing::trace!(body = %String::from_utf8_lossy(body), "raw search response");

    decode_page(body).map_err(|e| {
        tracing::warn!(error = %e, "search response not usable");
        e
    })
}
