use crate::{config::SearchConfig, error::Result, types::Orientation};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Status and body of one HTTP exchange, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug)]
pub enum TransportError {
    Timeout,
    Other(String),
}

/// A single search request to the stock-video provider.
pub trait SearchTransport {
    async fn get(
        &self,
        query: &str,
        orientation: Orientation,
    ) -> std::result::Result<RawResponse, TransportError>;
}

pub struct PexelsTransport {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    per_page: String,
}

impl PexelsTransport {
    pub fn new(api_key: String, config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_key,
            api_url: config.api_url.clone(),
            per_page: config.per_page.to_string(),
        })
    }
}

impl SearchTransport for PexelsTransport {
    async fn get(
        &self,
        query: &str,
        orientation: Orientation,
    ) -> std::result::Result<RawResponse, TransportError> {
        let response = self
            .http
            .get(&self.api_url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("orientation", orientation.as_str()),
                ("per_page", self.per_page.as_str()),
            ])
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(RawResponse { status, body })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(error.to_string())
    }
}
