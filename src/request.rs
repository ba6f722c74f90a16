//! Request helper - one HTTP call, one good/bad answer
//!
//! Every request resolves to exactly one [`Answer`]. A 2xx response with a
//! JSON body is `Good`; a non-2xx status, a network failure or an unparseable
//! body is `Bad`. Callers never see a transport error type, only the payload
//! to report.

use crate::error::{ClientError, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};

/// Outcome of a single request
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Server accepted the request; body is the decoded JSON
    Good(Value),
    /// Anything else; body is the failure payload as JSON
    Bad(Value),
}

impl Answer {
    pub fn is_good(&self) -> bool {
        matches!(self, Answer::Good(_))
    }

    /// Decode a good answer into `T`.
    ///
    /// A good body that does not match `T` is folded into the failure path
    /// and returned as the payload, same as a bad answer.
    pub fn decode<T: DeserializeOwned>(self) -> std::result::Result<T, Value> {
        match self {
            Answer::Good(body) => T::deserialize(&body).map_err(|e| {
                tracing::debug!("Good answer did not decode: {}", e);
                body
            }),
            Answer::Bad(body) => Err(body),
        }
    }
}

/// Capability to issue requests against the photometer server.
///
/// Paths are absolute (`/gallery`) and already percent-encoded.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str, params: &[(&str, String)]) -> impl Future<Output = Answer> + Send;

    fn post(&self, path: &str, form: &[(&str, String)]) -> impl Future<Output = Answer> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn get(&self, path: &str, params: &[(&str, String)]) -> impl Future<Output = Answer> + Send {
        (**self).get(path, params)
    }

    fn post(&self, path: &str, form: &[(&str, String)]) -> impl Future<Output = Answer> + Send {
        (**self).post(path, form)
    }
}

/// Percent-encode a value for use as a single path segment
pub fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `http://127.0.0.1:6767`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: "expected an http(s) base url".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: &'static str,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Answer {
        let start = Instant::now();
        let answer = match request.send().await {
            Ok(response) => classify(response).await,
            Err(e) => {
                tracing::debug!("{} {} failed: {}", method, url, e);
                Answer::Bad(Value::String(e.to_string()))
            }
        };
        tracing::debug!(
            "{} {} -> {} in {:?}",
            method,
            url,
            if answer.is_good() { "good" } else { "bad" },
            start.elapsed()
        );
        answer
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Answer {
        let url = self.url(path);
        let request = self.client.get(&url).query(params);
        self.send("GET", url, request).await
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> Answer {
        let url = self.url(path);
        let request = self.client.post(&url).form(form);
        self.send("POST", url, request).await
    }
}

/// Map a response onto good/bad
async fn classify(response: reqwest::Response) -> Answer {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return Answer::Bad(Value::String(e.to_string())),
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(body) if status.is_success() => Answer::Good(body),
        Ok(body) => Answer::Bad(body),
        Err(_) => Answer::Bad(Value::String(text)),
    }
}
