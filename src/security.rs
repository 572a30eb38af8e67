//! Security Module
//!
//! アップロードされたファイルに対する制限を実装するモジュール。
//! ワークブックはメモリ上でのみ処理し、一時ファイルは作成しません。

use crate::error::ReportError;

/// Bot APIの`getFile`でダウンロードできる上限（20MB）
pub const TELEGRAM_DOWNLOAD_LIMIT: u64 = 20 * 1024 * 1024;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 20MB（Telegramのダウンロード上限と同じ）
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: TELEGRAM_DOWNLOAD_LIMIT,
        }
    }
}

impl SecurityConfig {
    /// 上限を指定して生成
    pub fn with_max_input_file_size(max_input_file_size: u64) -> Self {
        Self {
            max_input_file_size,
        }
    }

    /// 入力サイズを検証
    pub fn check_input_size(&self, bytes: u64) -> Result<(), ReportError> {
        if bytes > self.max_input_file_size {
            return Err(ReportError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// ドキュメント名の検証
///
/// 拡張子が`.xls`または`.xlsx`（大文字小文字を区別しない）の場合のみ受け付けます。
///
/// # 戻り値
///
/// * `Ok(())` - Excelファイル名の場合
/// * `Err(String)` - 名前が空、または拡張子が対象外の場合
pub fn validate_document_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Empty file name is not allowed".to_string());
    }

    let lower = trimmed.to_lowercase();
    if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
        Ok(())
    } else {
        Err(format!("Not an Excel file: {}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_document_name_valid() {
        assert!(validate_document_name("Расписание групп.xlsx").is_ok());
        assert!(validate_document_name("Темы уроков.XLS").is_ok());
    }

    #[test]
    fn test_validate_document_name_empty() {
        assert!(validate_document_name("").is_err());
        assert!(validate_document_name("   ").is_err());
    }

    #[test]
    fn test_validate_document_name_other_extension() {
        assert!(validate_document_name("report.csv").is_err());
        assert!(validate_document_name("report.xlsx.exe").is_err());
        assert!(validate_document_name("xlsx").is_err());
    }

    #[test]
    fn test_check_input_size() {
        let config = SecurityConfig::with_max_input_file_size(10);
        assert!(config.check_input_size(10).is_ok());
        match config.check_input_size(11) {
            Err(ReportError::SecurityViolation(msg)) => assert!(msg.contains("11 bytes")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }
}
