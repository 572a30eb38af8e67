//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! レイヤーごとに1つのエラー型を持ちます。
//!
//! - `ReportError`: ワークブックの読み込みとレポート解析
//! - `AiError`: AIアシスタント（Mistral API）呼び出し
//! - `BotError`: Telegram Bot APIとの通信、および上記2つのラップ

use thiserror::Error;

/// レポート解析で使用するエラー型
///
/// I/O・パース・設定エラーに加えて、「ファイルは読めたが必要な列がない」
/// といったユーザーに伝えるべき拒否理由もこの型で表現します。
/// 拒否理由かどうかは`is_rejection()`で判定できます。
#[derive(Error, Debug)]
pub enum ReportError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `AnalyzerBuilder::build()`時の閾値チェックや、存在しないシートの指定など。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー（入力サイズ超過など）
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 列数が足りない
    #[error("Sheet has {found} column(s), at least {required} required")]
    TooFewColumns {
        /// 必要な列数
        required: usize,
        /// 実際の列数
        found: usize,
    },

    /// 必須列が見つからない
    #[error("Required column not found: {column}")]
    MissingColumn {
        /// 見つからなかった列の名前
        column: String,
    },

    /// 時間割の曜日列（4列目以降の1列おき）が存在しない
    #[error("No schedule day columns found")]
    MissingScheduleDays,

    /// 授業テーマの列を特定できない
    #[error("Could not detect the lesson topic column")]
    NoTopicColumn,

    /// テーマ列がすべて空
    #[error("Topic column is empty")]
    NoTopics,

    /// 「Получено」/「Проверено」列を特定できない
    ///
    /// 診断用に先頭の見出し（小文字化済み）を保持します。
    #[error("Could not detect issued/checked columns among headers: {headers:?}")]
    UnrecognizedHeaders {
        /// 見つかった見出し（最大12件）
        headers: Vec<String>,
    },
}

impl ReportError {
    /// ユーザーへそのまま伝えるべき拒否理由かどうか
    ///
    /// `false`の場合は内部エラーであり、詳細はログにのみ出力します。
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ReportError::TooFewColumns { .. }
                | ReportError::MissingColumn { .. }
                | ReportError::MissingScheduleDays
                | ReportError::NoTopicColumn
                | ReportError::NoTopics
                | ReportError::UnrecognizedHeaders { .. }
        )
    }
}

/// AIアシスタントのエラー型
#[derive(Error, Debug)]
pub enum AiError {
    /// APIキーが設定されていない
    #[error("AI assistant is not configured")]
    NotConfigured,

    /// ネットワークエラー
    #[error("Network error when calling the chat completions API: {0}")]
    Http(#[from] reqwest::Error),

    /// 404（モデル名またはエンドポイントの誤り）
    #[error(
        "Chat completions API returned 404 Not Found for URL {endpoint}. \
         Verify MISTRAL_MODEL or MISTRAL_ENDPOINT. Response: {body}"
    )]
    NotFound {
        /// 呼び出したURL
        endpoint: String,
        /// レスポンス本文
        body: String,
    },

    /// 404以外の非成功ステータス
    #[error("Chat completions API error {status}: {body}")]
    Status {
        /// HTTPステータスコード
        status: u16,
        /// レスポンス本文
        body: String,
    },
}

/// Bot全体のエラー型
#[derive(Error, Debug)]
pub enum BotError {
    /// HTTP通信エラー
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSONのシリアライズ/デシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bot APIが`ok: false`を返した
    #[error("Telegram API error in {method}: {description}")]
    Api {
        /// 呼び出したメソッド名
        method: String,
        /// Telegramのエラー説明
        description: String,
    },

    /// ダウンロード対象のファイルが大きすぎる
    #[error("File is too large to download: {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        /// ファイルサイズ
        size: u64,
        /// 上限
        max: u64,
    },

    /// レポート解析エラー
    #[error(transparent)]
    Report(#[from] ReportError),

    /// AIアシスタントのエラー
    #[error(transparent)]
    Ai(#[from] AiError),

    /// 設定エラー（トークン未設定など）
    #[error("Configuration error: {0}")]
    Config(String),
}
