//! Page fetcher — direct HTTP GET with a one-shot mirror-transport fallback.
//!
//! The scraped sites intermittently block direct requests, so every fetch
//! gets exactly two attempts: the direct path with a short timeout, then the
//! same URL proxied through the mirror prefix with a longer timeout. A
//! non-success status is always a failure; callers never see a partial body
//! as success.

use std::time::Duration;

use thiserror::Error;

/// Immutable transport configuration, passed in at construction so tests can
/// inject short timeouts and fake transports.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Direct-path request timeout.
    pub timeout: Duration,
    /// Mirror prefix prepended to the target URL, e.g. `https://r.jina.ai/`.
    /// `None` disables the fallback path entirely.
    pub mirror_prefix: Option<String>,
    /// Mirror-path request timeout (the proxy adds latency of its own).
    pub mirror_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".into(),
            timeout: Duration::from_secs(15),
            mirror_prefix: Some("https://r.jina.ai/".into()),
            mirror_timeout: Duration::from_secs(30),
        }
    }
}

/// Structured error types for page retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("both transports failed for {url} (direct: {direct}; mirror: {mirror})")]
    Exhausted {
        url: String,
        direct: String,
        mirror: String,
    },
}

/// Trait seam over page retrieval so adapters are testable without a network.
pub trait PageFetcher: Send + Sync {
    /// Retrieve the raw body for `url`, or fail once both transports fail.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher: `reqwest` blocking clients for both transport paths.
pub struct HttpFetcher {
    direct: reqwest::blocking::Client,
    mirror: reqwest::blocking::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let direct = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to build direct HTTP client");
        let mirror = reqwest::blocking::Client::builder()
            .timeout(config.mirror_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to build mirror HTTP client");
        Self {
            direct,
            mirror,
            config,
        }
    }

    fn mirror_url(&self, url: &str) -> Option<String> {
        self.config
            .mirror_prefix
            .as_ref()
            .map(|prefix| format!("{prefix}{url}"))
    }

    fn get(client: &reqwest::blocking::Client, url: &str) -> Result<String, FetchError> {
        let resp = client.get(url).send().map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let direct_err = match Self::get(&self.direct, url) {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };

        let Some(mirror_url) = self.mirror_url(url) else {
            return Err(direct_err);
        };

        match Self::get(&self.mirror, &mirror_url) {
            Ok(body) => Ok(body),
            Err(mirror_err) => Err(FetchError::Exhausted {
                url: url.to_string(),
                direct: direct_err.to_string(),
                mirror: mirror_err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_url_prefixes_the_target() {
        let fetcher = HttpFetcher::new(FetchConfig::default());
        assert_eq!(
            fetcher.mirror_url("https://example.com/kj/"),
            Some("https://r.jina.ai/https://example.com/kj/".into())
        );
    }

    #[test]
    fn mirror_can_be_disabled() {
        let fetcher = HttpFetcher::new(FetchConfig {
            mirror_prefix: None,
            ..FetchConfig::default()
        });
        assert_eq!(fetcher.mirror_url("https://example.com/"), None);
    }

    #[test]
    fn default_timeouts_are_bounded() {
        let config = FetchConfig::default();
        assert!(config.timeout < config.mirror_timeout);
        assert!(config.mirror_timeout <= Duration::from_secs(60));
    }
}
