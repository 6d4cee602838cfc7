//! HTTP fetching behind a trait so the engine can run against fakes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use super::AcquisitionError;
use super::pdf::has_pdf_magic;
use crate::model::AcquisitionConfig;

const MAX_REDIRECTS: usize = 10;

/// What the caller expects back, selects timeout and Accept header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Html,
    Pdf,
}

/// A successfully fetched (2xx) response
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Declared PDF, or PDF magic bytes regardless of the declared type
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_lowercase().contains("application/pdf"))
            || has_pdf_magic(&self.body)
    }

    pub fn is_html(&self) -> bool {
        if self.is_pdf() {
            return false;
        }
        match self.content_type.as_deref() {
            Some(ct) => {
                let ct = ct.to_lowercase();
                ct.contains("html") || ct.contains("xml")
            }
            None => self
                .body
                .iter()
                .find(|b| !b.is_ascii_whitespace())
                .is_some_and(|b| *b == b'<'),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Source of remote resources
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL; non-2xx responses are errors
    async fn fetch(&self, url: &Url, kind: FetchKind) -> Result<FetchedResource, AcquisitionError>;

    /// A fresh fetcher that keeps cookies across its own requests
    fn session(&self) -> Arc<dyn Fetcher>;
}

/// Fetcher backed by reqwest
pub struct ReqwestFetcher {
    client: Client,
    config: AcquisitionConfig,
}

impl ReqwestFetcher {
    pub fn new(config: &AcquisitionConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(config, false)?,
            config: config.clone(),
        })
    }

    fn timeout_for(&self, kind: FetchKind) -> Duration {
        match kind {
            FetchKind::Html => Duration::from_secs(self.config.html_timeout_secs),
            FetchKind::Pdf => Duration::from_secs(self.config.pdf_timeout_secs),
        }
    }
}

fn build_client(config: &AcquisitionConfig, cookies: bool) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    // Redirects are only followed onto hosts the policy allows
    let policy = config.clone();
    let redirect = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if policy.is_url_allowed(attempt.url()) {
            attempt.follow()
        } else {
            tracing::info!(url = %attempt.url(), "Redirect blocked by host policy");
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .cookie_store(cookies)
        .redirect(redirect)
        .build()
}

/// Append a chunk unless the body would outgrow `limit`
fn append_within_limit(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    if body.len() + chunk.len() > limit {
        return false;
    }
    body.extend_from_slice(chunk);
    true
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url, kind: FetchKind) -> Result<FetchedResource, AcquisitionError> {
        let accept = match kind {
            FetchKind::Html => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            FetchKind::Pdf => "application/pdf,*/*;q=0.8",
        };

        let start = std::time::Instant::now();
        let mut response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, accept)
            .timeout(self.timeout_for(kind))
            .send()
            .await
            .map_err(|e| AcquisitionError::network(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Fetch returned error status");
            return Err(AcquisitionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let limit = self.config.max_fetch_bytes;
        let too_large = || AcquisitionError::ResponseTooLarge {
            url: url.to_string(),
            limit,
        };
        if let Some(declared) = response.content_length()
            && declared > limit as u64
        {
            tracing::info!(url = %url, declared, limit, "Response larger than fetch limit");
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AcquisitionError::network(url, e))?
        {
            if !append_within_limit(&mut body, &chunk, limit) {
                tracing::info!(url = %url, limit, "Response body exceeded fetch limit");
                return Err(too_large());
            }
        }

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            content_type = ?content_type,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched resource"
        );

        Ok(FetchedResource {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    fn session(&self) -> Arc<dyn Fetcher> {
        let client = match build_client(&self.config, true) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Session client unavailable, continuing without cookies");
                self.client.clone()
            }
        };
        Arc::new(ReqwestFetcher {
            client,
            config: self.config.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory fetcher for engine tests

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone)]
    pub enum FakeResponse {
        Ok {
            content_type: &'static str,
            body: Vec<u8>,
        },
        Status(u16),
        /// A PDF served only to requests that ask for one
        PdfOnly(Vec<u8>),
    }

    #[derive(Default)]
    pub struct FakeFetcher {
        routes: Mutex<HashMap<String, FakeResponse>>,
        log: Arc<Mutex<Vec<String>>>,
        sessions: Arc<Mutex<usize>>,
    }

    impl FakeFetcher {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn html(&self, url: &str, body: &str) {
            self.route(
                url,
                FakeResponse::Ok {
                    content_type: "text/html; charset=utf-8",
                    body: body.as_bytes().to_vec(),
                },
            );
        }

        pub fn pdf(&self, url: &str, body: Vec<u8>) {
            self.route(
                url,
                FakeResponse::Ok {
                    content_type: "application/pdf",
                    body,
                },
            );
        }

        pub fn pdf_only(&self, url: &str, body: Vec<u8>) {
            self.route(url, FakeResponse::PdfOnly(body));
        }

        pub fn status(&self, url: &str, status: u16) {
            self.route(url, FakeResponse::Status(status));
        }

        pub fn route(&self, url: &str, response: FakeResponse) {
            self.routes
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
        }

        /// Every URL requested, in order, across sessions
        pub fn requests(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        pub fn session_count(&self) -> usize {
            *self.sessions.lock().unwrap()
        }

        fn snapshot(&self) -> Self {
            Self {
                routes: Mutex::new(self.routes.lock().unwrap().clone()),
                log: self.log.clone(),
                sessions: self.sessions.clone(),
            }
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(
            &self,
            url: &Url,
            kind: FetchKind,
        ) -> Result<FetchedResource, AcquisitionError> {
            self.log.lock().unwrap().push(url.to_string());
            let response = self.routes.lock().unwrap().get(url.as_str()).cloned();
            match response {
                Some(FakeResponse::Ok { content_type, body }) => Ok(FetchedResource {
                    url: url.clone(),
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    body,
                }),
                Some(FakeResponse::PdfOnly(body)) if kind == FetchKind::Pdf => Ok(FetchedResource {
                    url: url.clone(),
                    status: 200,
                    content_type: Some("application/pdf".to_string()),
                    body,
                }),
                Some(FakeResponse::PdfOnly(_)) => Err(AcquisitionError::HttpStatus {
                    url: url.to_string(),
                    status: 406,
                }),
                Some(FakeResponse::Status(status)) => Err(AcquisitionError::HttpStatus {
                    url: url.to_string(),
                    status,
                }),
                None => Err(AcquisitionError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }

        fn session(&self) -> Arc<dyn Fetcher> {
            *self.sessions.lock().unwrap() += 1;
            Arc::new(self.snapshot())
        }
    }
}
