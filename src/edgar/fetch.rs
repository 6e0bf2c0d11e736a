use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use super::error::{EdgarError, Result};
use super::rate_limiter::RateLimiter;

/// Source of raw documents addressed by URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Issues paced GET requests against EDGAR with a fixed identifying header set.
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpFetcher {
    pub fn new(client: Client, user_agent: &str, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
            rate_limiter,
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.rate_limiter.acquire().await;

        log::debug!("Fetching URL: {}", url);
        let transport = |reason: String| EdgarError::Transport {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        log::debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            return Err(transport(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport(e.to_string()))?;
        log::debug!("Received content length: {}", body.len());

        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies and records every requested URL.
    #[derive(Default)]
    pub struct StaticFetcher {
        bodies: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| EdgarError::Transport {
                    url: url.to_string(),
                    reason: "HTTP request failed with status: 404 Not Found".to_string(),
                })
        }
    }
}
