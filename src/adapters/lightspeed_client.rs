use {
    crate::{
        config::UpstreamConfig,
        domain::{
            error::ClosureError,
            id::{OutletId, RegisterId},
            provider::{ProviderFuture, RetailProvider},
            register::{Outlet, PaymentSummary, Register},
        },
    },
    reqwest::header::ACCEPT,
    serde::{Deserialize, de::DeserializeOwned},
    std::{collections::HashSet, hash::Hash},
};

/// Hard stop for cursor pagination that never terminates.
pub const MAX_PAGES: usize = 1000;

const MAX_ERROR_BODY: usize = 512;

// ── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    version: Option<VersionRange>,
}

#[derive(Debug, Deserialize)]
struct VersionRange {
    #[serde(default)]
    max: Option<i64>,
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct LightspeedClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl LightspeedClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ClosureError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClosureError::Configuration(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }

    /// One GET with the configured retry policy: only transport failures,
    /// 429 and 5xx are retried, with exponential backoff.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClosureError> {
        let mut attempt: u32 = 0;
        loop {
            match self.get_once(path, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.pow(attempt.min(10));
                    tracing::warn!(path, attempt, error = %e, ?delay, "upstream call failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(path, error = %e, "upstream call failed");
                    return Err(e);
                }
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClosureError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClosureError::Upstream {
                status: status.as_u16(),
                path: path.to_string(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Single objects usually come wrapped in `{"data": ...}`; bare objects
    /// are accepted too. A top-level `data` key always means the envelope, so
    /// a malformed payload inside it is an error and never a defaulted `T`.
    async fn get_wrapped<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClosureError> {
        let mut body: serde_json::Value = self.get_json(path, &[]).await?;
        let inner = if body.get("data").is_some() {
            body["data"].take()
        } else {
            body
        };
        Ok(serde_json::from_value(inner)?)
    }

    /// Walk a version-cursor paginated list endpoint to the end.
    ///
    /// The vendor may return fewer items than `page_size`, so only an empty
    /// page, a missing `version.max` or a cursor that does not advance ends
    /// the walk. Items repeated across pages keep their first occurrence.
    async fn list_all<T, K, F>(&self, path: &str, key: F) -> Result<Vec<T>, ClosureError>
    where
        T: DeserializeOwned + Send,
        K: Eq + Hash + Send,
        F: Fn(&T) -> K + Send + Sync,
    {
        let page_size = self.config.page_size;
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut after: Option<i64> = None;

        for page_no in 1..=MAX_PAGES {
            let mut query = vec![("page_size", page_size.to_string())];
            if let Some(cursor) = after {
                query.push(("after", cursor.to_string()));
            }

            let page: Page<T> = self.get_json(path, &query).await?;
            let fetched = page.data.len();
            for item in page.data {
                if seen.insert(key(&item)) {
                    items.push(item);
                }
            }

            match page.version.and_then(|v| v.max) {
                Some(max) if fetched > 0 && after.is_none_or(|a| max > a) => {
                    after = Some(max);
                }
                _ => {
                    tracing::debug!(path, pages = page_no, items = items.len(), "list complete");
                    return Ok(items);
                }
            }
        }

        Err(ClosureError::Pagination(format!(
            "{path} did not finish within {MAX_PAGES} pages"
        )))
    }
}

impl RetailProvider for LightspeedClient {
    fn list_registers(&self) -> ProviderFuture<'_, Vec<Register>> {
        Box::pin(async move {
            self.list_all("/registers", |r: &Register| r.id.clone())
                .await
        })
    }

    fn fetch_payments_summary(&self, id: &RegisterId) -> ProviderFuture<'_, PaymentSummary> {
        let path = format!("/registers/{id}/payments_summary");
        Box::pin(async move { self.get_wrapped(&path).await })
    }

    fn fetch_outlet(&self, id: &OutletId) -> ProviderFuture<'_, Outlet> {
        let path = format!("/outlets/{id}");
        Box::pin(async move { self.get_wrapped(&path).await })
    }

    fn list_outlets(&self) -> ProviderFuture<'_, Vec<Outlet>> {
        Box::pin(async move { self.list_all("/outlets", |o: &Outlet| o.id.clone()).await })
    }
}
