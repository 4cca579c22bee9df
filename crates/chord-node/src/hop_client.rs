//! The concrete `HopClient`: a single `reqwest` request per hop, no reuse.

use async_trait::async_trait;
use chord_core::{ForwardError, ForwardMethod, ForwardOutcome, ForwardRequest, HopClient};
use std::time::Duration;

pub const HOP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ReqwestHopClient {
    client: reqwest::Client,
}

impl ReqwestHopClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .http1_only()
            .timeout(HOP_TIMEOUT)
            .build()
            .expect("reqwest client builds with default TLS backend");
        ReqwestHopClient { client }
    }
}

impl Default for ReqwestHopClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HopClient for ReqwestHopClient {
    async fn forward(&self, peer: &str, request: ForwardRequest) -> Result<ForwardOutcome, ForwardError> {
        let url = format!("http://{peer}{}", request.path);

        let builder = match request.method {
            ForwardMethod::Get => self.client.get(&url),
            ForwardMethod::Put => self.client.put(&url).body(request.body.clone()),
            ForwardMethod::Head => self.client.head(&url),
        };

        let builder = builder
            .header("X-Chord-TTL", request.ttl.to_string())
            .header("Connection", "close");

        let response = builder.send().await.map_err(|e| ForwardError::Transport {
            peer: peer.to_string(),
            detail: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain; charset=utf-8")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| ForwardError::Transport {
                peer: peer.to_string(),
                detail: e.to_string(),
            })?
            .to_vec();

        Ok(ForwardOutcome {
            status,
            content_type,
            body,
        })
    }
}
