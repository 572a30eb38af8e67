//! Configuration Module
//!
//! Bot全体の設定。TOMLファイル（任意）を読み込み、環境変数で上書きします。
//!
//! ```toml
//! telegram_token = "123456:ABC"
//! poll_timeout_secs = 30
//!
//! [ai]
//! model = "mistral-large-latest"
//!
//! [thresholds]
//! attendance = 40.0
//! homework_check = 70.0
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::builder::{Analyzer, AnalyzerBuilder};
use crate::error::{BotError, ReportError};
use crate::security::TELEGRAM_DOWNLOAD_LIMIT;

/// Bot API のベースURL
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Mistral chat completions のエンドポイント
pub const DEFAULT_AI_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";

/// 既定のモデル名
pub const DEFAULT_AI_MODEL: &str = "mistral-large-latest";

/// Bot全体の設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot APIトークン（環境変数`TELEGRAM_BOT_TOKEN`が優先）
    pub telegram_token: Option<String>,

    /// Bot APIのベースURL
    pub api_base: String,

    /// getUpdatesのロングポーリング秒数
    pub poll_timeout_secs: u64,

    /// 通信エラー後の再試行までの秒数
    pub retry_delay_secs: u64,

    /// 受け付けるファイルの最大サイズ（バイト）
    pub max_file_size: u64,

    /// AIアシスタントの設定
    pub ai: AiConfig,

    /// レポートの閾値
    pub thresholds: ThresholdConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: 30,
            retry_delay_secs: 5,
            max_file_size: TELEGRAM_DOWNLOAD_LIMIT,
            ai: AiConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// AIアシスタントの設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// APIキー（未設定ならAIは無効）
    pub api_key: Option<String>,

    /// モデル名
    pub model: String,

    /// chat completionsのURL
    pub endpoint: String,

    /// サンプリング温度
    pub temperature: f32,

    /// 応答の最大トークン数
    pub max_tokens: u32,

    /// リクエストのタイムアウト秒数
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            temperature: 0.6,
            max_tokens: 512,
            timeout_secs: 30,
        }
    }
}

/// レポートの閾値
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// 出席率（%）
    pub attendance: f64,

    /// 宿題チェック率（%）
    pub homework_check: f64,

    /// 宿題提出率（%）
    pub homework_submit: f64,

    /// 授業評価
    pub classroom: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            attendance: 40.0,
            homework_check: 70.0,
            homework_submit: 70.0,
            classroom: 3.0,
        }
    }
}

impl BotConfig {
    /// 設定を読み込む
    ///
    /// `path`が指定されていればTOMLとして読み込み、その後に環境変数で上書きします。
    pub fn load(path: Option<&Path>) -> Result<Self, BotError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    BotError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// TOML文字列から読み込む
    pub fn from_toml(content: &str) -> Result<Self, BotError> {
        toml::from_str(content).map_err(|e| BotError::Config(format!("Failed to parse config: {}", e)))
    }

    /// 環境変数で上書きする
    ///
    /// 対象は`TELEGRAM_BOT_TOKEN`、`MISTRAL_API_KEY`、`MISTRAL_MODEL`、`MISTRAL_ENDPOINT`。
    /// 空の値は無視します。
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_token = Some(token);
        }
        if let Some(key) = get("MISTRAL_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = get("MISTRAL_MODEL") {
            self.ai.model = model;
        }
        if let Some(endpoint) = get("MISTRAL_ENDPOINT") {
            self.ai.endpoint = endpoint;
        }
    }

    /// Bot APIトークン（未設定ならエラー）
    pub fn token(&self) -> Result<&str, BotError> {
        self.telegram_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                BotError::Config(
                    "Telegram bot token is not set (TELEGRAM_BOT_TOKEN or telegram_token)".to_string(),
                )
            })
    }

    /// 閾値とサイズ上限を反映したAnalyzerを構築
    pub fn analyzer(&self) -> Result<Analyzer, ReportError> {
        AnalyzerBuilder::new()
            .with_attendance_threshold(self.thresholds.attendance)
            .with_homework_check_threshold(self.thresholds.homework_check)
            .with_homework_submit_threshold(self.thresholds.homework_submit)
            .with_classroom_threshold(self.thresholds.classroom)
            .with_max_input_size(self.max_file_size)
            .build()
    }
}
