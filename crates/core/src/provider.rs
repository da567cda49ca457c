use std::time::Duration;

use tracing::debug;

use crate::error::{ClipError, Result};

const TEMPERATURE: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Groq,
    Openai,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Groq => ProviderConfig {
                api_url: "https://api.groq.com/openai/v1/chat/completions",
                model: "moonshotai/kimi-k2-instruct-0905",
                env_var: "GROQ_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o",
                env_var: "OPENAI_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Openai => "OpenAI",
        }
    }

    /// Pick a provider from the credentials present in the environment.
    ///
    /// Only consulted when the caller did not choose one explicitly.
    pub fn detect() -> Self {
        let groq_key = std::env::var(Provider::Groq.config().env_var).unwrap_or_default();
        if groq_key.trim().is_empty() {
            Provider::Openai
        } else {
            Provider::Groq
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String> {
        let env_var = self.config().env_var;
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ClipError::MissingApiKey {
                env_var: env_var.to_string(),
            }),
        }
    }
}

/// "Complete this chat prompt, return the text" capability.
pub trait ChatModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat completion client, shared by every [`Provider`].
pub struct ChatClient {
    http: reqwest::Client,
    provider: Provider,
    api_key: String,
}

impl ChatClient {
    pub fn new(provider: Provider) -> Result<Self> {
        let api_key = provider.validate_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            provider,
            api_key,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

impl ChatModel for ChatClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let config = self.provider.config();
        debug!(provider = self.provider.name(), model = config.model, "chat completion");

        let response = self
            .http
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt,
                    },
                    {
                        "role": "user",
                        "content": user_prompt,
                    },
                ],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClipError::ChatFailed {
                reason: format!("{} returned HTTP {}: {}", self.provider.name(), status, body),
            });
        }

        let response = response.json::<serde_json::Value>().await?;
        extract_message_content(&response)
    }
}

/// Pull `choices[0].message.content` out of a chat completion body.
pub fn extract_message_content(response: &serde_json::Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ClipError::ChatFailed {
            reason: format!("Invalid API response: {:?}", response),
        })
}
