use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::AnalysisConfig;

/// Everything the check battery needs from one page fetch, captured before
/// any parsing so the checks themselves stay pure and the parsed DOM never
/// has to cross an await point.
#[derive(Debug, Clone)]
pub struct PageProbe {
    /// The normalized URL that was requested.
    pub url: String,
    pub status: u16,
    pub http2: bool,
    /// All response headers as lowercased `name: value` lines.
    pub headers_text: String,
    pub server_header: String,
    /// Time until response headers arrived.
    pub server_response_ms: u64,
    /// Time until the full body was read.
    pub load_time_s: f64,
    pub body: String,
    pub has_sitemap: bool,
    pub has_robots_txt: bool,
}

#[derive(Debug)]
pub enum FetchOutcome {
    InvalidUrl,
    Unreachable(String),
    HttpError(u16),
    /// Body could not be decoded after a successful response.
    Unparseable(String),
    Fetched(Box<PageProbe>),
}

/// HTTP collaborator for target-site fetches: fixed default user-agent,
/// bounded timeout, redirects followed.
pub struct SiteFetcher {
    client: Client,
    probe_timeout: Duration,
}

impl SiteFetcher {
    pub fn new(cfg: &AnalysisConfig) -> crate::models::Result<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.fetch_timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            probe_timeout: Duration::from_secs(cfg.probe_timeout_seconds),
        })
    }

    pub async fn fetch(&self, raw_url: &str) -> FetchOutcome {
        let url = match validate_url(raw_url) {
            Some(url) => url,
            None => return FetchOutcome::InvalidUrl,
        };
        let url_text = url.to_string();

        debug!("fetching {}", url_text);
        let started = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Unreachable(e.to_string()),
        };
        let server_response_ms = started.elapsed().as_millis() as u64;

        let status = response.status().as_u16();
        if status != 200 {
            return FetchOutcome::HttpError(status);
        }

        let http2 = response.version() >= reqwest::Version::HTTP_2;
        let headers_text = response
            .headers()
            .iter()
            .map(|(name, value)| {
                format!("{}: {}", name, value.to_str().unwrap_or_default())
            })
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();
        let server_header = response
            .headers()
            .get("server")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Unparseable(e.to_string()),
        };
        let load_time_s = started.elapsed().as_secs_f64();

        let has_sitemap = self.head_ok(&url_text, "sitemap.xml").await;
        let has_robots_txt = self.head_ok(&url_text, "robots.txt").await;

        debug!(
            "fetched {} ({} bytes in {:.2}s, headers in {}ms)",
            url_text,
            body.len(),
            load_time_s,
            server_response_ms
        );

        FetchOutcome::Fetched(Box::new(PageProbe {
            url: url_text,
            status,
            http2,
            headers_text,
            server_header,
            server_response_ms,
            load_time_s,
            body,
            has_sitemap,
            has_robots_txt,
        }))
    }

    async fn head_ok(&self, base_url: &str, file: &str) -> bool {
        let probe_url = format!("{}/{}", base_url.trim_end_matches('/'), file);
        match self
            .client
            .head(&probe_url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().as_u16() == 200,
            Err(_) => false,
        }
    }
}

/// Add a scheme to bare hosts, then require both a scheme and a host.
pub fn validate_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).ok()?;
    url.host_str()?;
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https_scheme() {
        let url = validate_url("example.com").expect("bare host should validate");
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn empty_and_hostless_urls_are_rejected() {
        assert!(validate_url("").is_none());
        assert!(validate_url("   ").is_none());
        assert!(validate_url("https://").is_none());
    }
}
