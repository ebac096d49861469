use crate::core::{ChartKind, FetchOptions, Payload};
use crate::utils::error::{ChartError, Result};
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::LazyLock;
use url::Url;

// callback({...}); 以及 Rails 會加上的 /**/ 前綴
static JSONP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:/\*\*/)?\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?$")
        .expect("valid JSONP pattern")
});

/// 單次 GET 抓取並解碼 payload，可選擇重試
pub struct DataFetcher {
    client: Client,
    options: FetchOptions,
}

impl DataFetcher {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub async fn fetch(&self, url: &str) -> Result<Payload> {
        let max_attempts = self.options.retry_attempts + 1;
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(payload) => {
                    if attempt > 1 {
                        tracing::info!("✅ Fetched {} after {} attempts", url, attempt);
                    }
                    return Ok(payload);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "⚠️ Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        max_attempts,
                        url,
                        e,
                        self.options.retry_delay
                    );
                    tokio::time::sleep(self.options.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Payload> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        for (key, value) in &self.options.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        tracing::debug!("Making API request to: {}", url);
        let response = request.send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(ChartError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;
        tracing::debug!("Received {} bytes from {}", body.len(), url);
        decode_body(&body).map(Payload::new)
    }
}

fn classify(url: &str, err: reqwest::Error) -> ChartError {
    if err.is_timeout() {
        ChartError::FetchTimeout {
            url: url.to_string(),
        }
    } else if err.is_builder() {
        ChartError::HttpClientError(err)
    } else {
        ChartError::NetworkError {
            url: url.to_string(),
            source: err,
        }
    }
}

/// Decodes a JSON body, unwrapping JSONP padding when present.
pub fn decode_body(body: &str) -> Result<serde_json::Value> {
    let trimmed = body.trim();
    let json = match JSONP_PATTERN.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
        None => trimmed,
    };

    serde_json::from_str(json).map_err(|e| ChartError::DecodeError {
        message: format!("response body is not valid JSON: {}", e),
    })
}

/// Builds the endpoint URL for a chart kind under `api_base`.
pub fn resolve_endpoint(kind: ChartKind, api_base: &str, users: (u32, u32)) -> Result<String> {
    let invalid = |reason: String| ChartError::InvalidConfigValueError {
        field: "api_base".to_string(),
        value: api_base.to_string(),
        reason,
    };

    let mut url = Url::parse(api_base).map_err(|e| invalid(format!("Invalid URL format: {}", e)))?;

    // 只延伸路徑，保留 api_base 原有的查詢字串
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be used as a base".to_string()))?;
        segments.pop_if_empty();
        match kind {
            ChartKind::PopularBeers => {
                segments.push("beers.json");
            }
            ChartKind::RatingComparison => {
                segments.push("ratings").push(&format!("{}.json", users.0));
            }
            ChartKind::StaticBar => {
                return Err(ChartError::ValidationError {
                    message: "static-bar charts are not fetched from an endpoint".to_string(),
                })
            }
        }
    }

    if kind == ChartKind::RatingComparison {
        url.query_pairs_mut()
            .append_pair("compare", &users.1.to_string());
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn quick_options(retry_attempts: u32) -> FetchOptions {
        FetchOptions {
            timeout: Some(Duration::from_secs(5)),
            retry_attempts,
            retry_delay: Duration::from_millis(10),
            headers: Vec::new(),
        }
    }

    #[test]
    fn test_decode_plain_json() {
        let value = decode_body(r#" {"beers": []} "#).unwrap();
        assert_eq!(value, serde_json::json!({"beers": []}));
    }

    #[test]
    fn test_decode_jsonp_padding() {
        let value = decode_body(r#"jQuery1102_123({"ratings":[{"user1_rating":1,"user2_rating":2}]});"#)
            .unwrap();
        assert_eq!(value["ratings"][0]["user2_rating"], 2);

        let rails = decode_body(r#"/**/ callback({"beers": [1]})"#).unwrap();
        assert_eq!(rails, serde_json::json!({"beers": [1]}));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_body("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ChartError::DecodeError { .. }));
    }

    #[test]
    fn test_resolve_endpoints() {
        assert_eq!(
            resolve_endpoint(ChartKind::PopularBeers, "http://localhost:3000/api/v1/", (1, 2))
                .unwrap(),
            "http://localhost:3000/api/v1/beers.json"
        );
        assert_eq!(
            resolve_endpoint(ChartKind::RatingComparison, "http://localhost:3000/api/v1", (1, 2))
                .unwrap(),
            "http://localhost:3000/api/v1/ratings/1.json?compare=2"
        );
        assert!(resolve_endpoint(ChartKind::StaticBar, "http://localhost:3000", (1, 2)).is_err());
        assert!(resolve_endpoint(ChartKind::PopularBeers, "not a url", (1, 2)).is_err());
        assert!(resolve_endpoint(ChartKind::PopularBeers, "mailto:a@b.c", (1, 2)).is_err());
    }

    #[test]
    fn test_resolve_endpoint_keeps_base_query() {
        assert_eq!(
            resolve_endpoint(ChartKind::PopularBeers, "http://h/api?key=1", (1, 2)).unwrap(),
            "http://h/api/beers.json?key=1"
        );
        assert_eq!(
            resolve_endpoint(ChartKind::RatingComparison, "http://h/api/?key=1", (4, 5))
                .unwrap(),
            "http://h/api/ratings/4.json?key=1&compare=5"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_headers_and_decodes() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/beers.json")
                .header("x-api-key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"beers": [{"name": "A", "reviews_count": 3}]}));
        });

        let mut options = quick_options(0);
        options
            .headers
            .push(("x-api-key".to_string(), "secret".to_string()));
        let fetcher = DataFetcher::new(options).unwrap();

        let payload = fetcher.fetch(&server.url("/beers.json")).await.unwrap();

        api_mock.assert();
        assert_eq!(payload.body["beers"][0]["name"], "A");
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/beers.json");
            then.status(503);
        });

        let fetcher = DataFetcher::new(quick_options(2)).unwrap();
        let err = fetcher.fetch(&server.url("/beers.json")).await.unwrap_err();

        api_mock.assert_hits(3);
        assert!(matches!(err, ChartError::HttpStatusError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_errors() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ratings/9.json");
            then.status(404);
        });

        let fetcher = DataFetcher::new(quick_options(3)).unwrap();
        let err = fetcher
            .fetch(&server.url("/ratings/9.json"))
            .await
            .unwrap_err();

        api_mock.assert_hits(1);
        assert!(matches!(err, ChartError::HttpStatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"beers": []}));
        });

        let options = FetchOptions {
            timeout: Some(Duration::from_millis(50)),
            ..quick_options(0)
        };
        let fetcher = DataFetcher::new(options).unwrap();
        let err = fetcher.fetch(&server.url("/slow")).await.unwrap_err();

        assert!(matches!(err, ChartError::FetchTimeout { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = DataFetcher::new(quick_options(0)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:1/beers.json")
            .await
            .unwrap_err();

        assert!(matches!(err, ChartError::NetworkError { .. }));
    }
}
