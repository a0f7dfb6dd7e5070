use {
    crate::domain::error::ClosureError,
    std::{env, str::FromStr, time::Duration},
};

pub const DEFAULT_CLOSURE_URL_TEMPLATE: &str =
    "https://construmas.retail.lightspeed.app/register/closure/summary/{id}";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct UpstreamConfig {
    /// Vendor API root, without trailing slash (e.g. `https://store.retail.lightspeed.app/api/2.0`).
    pub base_url: String,
    pub api_token: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub page_size: usize,
}

// Keeps the token out of logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub concurrency: usize,
    pub register_timeout: Duration,
    pub deadline: Duration,
    /// Deep link for a closure; `{id}` is replaced by the register id.
    pub closure_url_template: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            register_timeout: Duration::from_secs(15),
            deadline: Duration::from_secs(30),
            closure_url_template: DEFAULT_CLOSURE_URL_TEMPLATE.to_string(),
        }
    }
}

impl AggregationConfig {
    pub fn closure_url(&self, register_id: &str) -> String {
        self.closure_url_template.replace("{id}", register_id)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ClosureError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClosureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, "LIGHTSPEED_API_URL")?
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClosureError::Configuration(format!(
                "LIGHTSPEED_API_URL must be an http(s) URL, got: {base_url}"
            )));
        }
        let api_token = required(&lookup, "LIGHTSPEED_API_TOKEN")?;

        let page_size: usize = parsed(&lookup, "UPSTREAM_PAGE_SIZE", 200)?;
        if page_size == 0 {
            return Err(ClosureError::Configuration(
                "UPSTREAM_PAGE_SIZE must be at least 1".into(),
            ));
        }

        let concurrency: usize = parsed(&lookup, "AGGREGATION_CONCURRENCY", 4)?;
        if concurrency == 0 {
            return Err(ClosureError::Configuration(
                "AGGREGATION_CONCURRENCY must be at least 1".into(),
            ));
        }

        let closure_url_template = lookup("CLOSURE_URL_TEMPLATE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLOSURE_URL_TEMPLATE.to_string());
        if !closure_url_template.contains("{id}") {
            return Err(ClosureError::Configuration(
                "CLOSURE_URL_TEMPLATE must contain {id}".into(),
            ));
        }

        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT", 3000)?,
            },
            upstream: UpstreamConfig {
                base_url,
                api_token,
                request_timeout: seconds(&lookup, "UPSTREAM_TIMEOUT_SECS", 10)?,
                max_retries: parsed(&lookup, "UPSTREAM_MAX_RETRIES", 0)?,
                retry_backoff: Duration::from_millis(parsed(
                    &lookup,
                    "UPSTREAM_RETRY_BACKOFF_MS",
                    200,
                )?),
                page_size,
            },
            aggregation: AggregationConfig {
                concurrency,
                register_timeout: seconds(&lookup, "REGISTER_TIMEOUT_SECS", 15)?,
                deadline: seconds(&lookup, "AGGREGATION_DEADLINE_SECS", 30)?,
                closure_url_template,
            },
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ClosureError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClosureError::Configuration(format!("{key} must be set")))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ClosureError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ClosureError::Configuration(format!("{key} is not a valid number: {raw}"))
        }),
    }
}

/// A timeout in whole seconds, at least 1.
fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ClosureError>
where
    F: Fn(&str) -> Option<String>,
{
    match parsed(lookup, key, default)? {
        0 => Err(ClosureError::Configuration(format!("{key} must be at least 1"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}
