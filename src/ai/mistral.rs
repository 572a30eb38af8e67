//! Mistral chat completions APIクライアント

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::Assistant;
use crate::config::AiConfig;
use crate::error::AiError;

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Mistral APIクライアント
pub struct MistralClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_tokens: u32,
}

impl MistralClient {
    /// 設定のAIセクションからクライアントを作成
    ///
    /// APIキーが未設定の場合は`AiError::NotConfigured`を返します。
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AiError::NotConfigured)?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// リクエストに指定するモデル名
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// レスポンス本文から返答テキストを取り出す
///
/// `choices[0].message.content`が無ければトップレベルの`message`、それも無ければ空文字列。
fn extract_reply(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// HTTPステータスをエラーに対応付ける
///
/// 404はエンドポイントの誤設定として`AiError::NotFound`、その他の失敗は`AiError::Status`。
fn check_status(status: StatusCode, endpoint: &str, body: &str) -> Result<(), AiError> {
    if status == StatusCode::NOT_FOUND {
        return Err(AiError::NotFound {
            endpoint: endpoint.to_string(),
            body: body.trim().to_string(),
        });
    }
    if !status.is_success() {
        return Err(AiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl Assistant for MistralClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "calling chat completions");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, &self.endpoint, &body)?;

        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok(extract_reply(&json)),
            Err(_) => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with_key(key: Option<&str>) -> AiConfig {
        AiConfig {
            api_key: key.map(str::to_string),
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(matches!(
            MistralClient::from_config(&config_with_key(None)),
            Err(AiError::NotConfigured)
        ));
        assert!(matches!(
            MistralClient::from_config(&config_with_key(Some("  "))),
            Err(AiError::NotConfigured)
        ));
        let client = MistralClient::from_config(&config_with_key(Some("secret"))).unwrap();
        assert_eq!(client.model(), "mistral-large-latest");
    }

    #[test]
    fn test_request_body() {
        let client = MistralClient::from_config(&config_with_key(Some("secret"))).unwrap();
        let body = serde_json::to_value(client.request("Привет")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "mistral-large-latest",
                "messages": [{"role": "user", "content": "Привет"}],
                "temperature": 0.6f32,
                "max_tokens": 512
            })
        );
    }

    #[test]
    fn test_status_mapping() {
        let endpoint = "https://api.mistral.ai/v1/chat/completions";
        assert!(check_status(StatusCode::OK, endpoint, "{}").is_ok());

        match check_status(StatusCode::NOT_FOUND, endpoint, " no route \n") {
            Err(AiError::NotFound { endpoint: e, body }) => {
                assert_eq!(e, endpoint);
                assert_eq!(body, "no route");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, endpoint, "bad key"),
            Err(AiError::Status { status: 401, .. })
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, endpoint, ""),
            Err(AiError::Status { status: 429, .. })
        ));
    }

    #[test]
    fn test_extract_reply() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "Ответ"}}]});
        assert_eq!(extract_reply(&body), "Ответ");

        let body = json!({"message": "Fallback"});
        assert_eq!(extract_reply(&body), "Fallback");

        let body = json!({"choices": []});
        assert_eq!(extract_reply(&body), "");
    }
}
