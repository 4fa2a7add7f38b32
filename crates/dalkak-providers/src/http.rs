use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Method};

use dalkak_core::error::{FlowError, Result};
use dalkak_core::traits::{HttpCall, HttpFetcher, HttpReply};

/// `HttpFetcher` backed by a shared reqwest client.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlowError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(&self, call: HttpCall) -> BoxFuture<'_, Result<HttpReply>> {
        Box::pin(async move {
            let method = Method::from_bytes(call.method.as_bytes())
                .map_err(|_| FlowError::node("http_request", format!("invalid method \"{}\"", call.method)))?;

            let mut request = self.client.request(method, &call.url);
            for (name, value) in &call.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(body) = call.body {
                request = request.body(body);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    FlowError::Http(format!("request to {} timed out", call.url))
                } else {
                    FlowError::Http(e.to_string())
                }
            })?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = response
                .text()
                .await
                .map_err(|e| FlowError::Http(e.to_string()))?;

            Ok(HttpReply {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                content_type,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_method_is_rejected_before_sending() {
        let fetcher = ReqwestFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher
            .fetch(HttpCall {
                method: "GE T".into(),
                url: "http://127.0.0.1:9/".into(),
                headers: vec![],
                body: None,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid method"));
    }
}
