//! Builder Module
//!
//! Fluent Builder APIを提供し、`Analyzer`インスタンスを段階的に構築する。

use std::io::{Cursor, Read};

use crate::api::{HomeworkPeriod, ReportKind, SheetSelector};
use crate::error::ReportError;
use crate::parser::WorkbookParser;
use crate::report::{self, ReportOutput};
use crate::security::TELEGRAM_DOWNLOAD_LIMIT;

/// 解析処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct AnalysisConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 宿題チェックレポートの期間
    pub homework_period: HomeworkPeriod,

    /// 出席率の閾値（%未満を抽出）
    pub attendance_threshold: f64,

    /// 宿題チェック率の閾値（%未満を抽出）
    pub homework_check_threshold: f64,

    /// 宿題提出率の閾値（%未満を抽出）
    pub homework_submit_threshold: f64,

    /// 授業評価の閾値（未満を抽出）
    pub classroom_threshold: f64,

    /// 「宿題が未提出」とみなす評価値
    pub failing_homework_grade: f64,

    /// 入力ファイルの最大サイズ（バイト）
    pub max_input_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::Index(0),
            homework_period: HomeworkPeriod::Month,
            attendance_threshold: 40.0,
            homework_check_threshold: 70.0,
            homework_submit_threshold: 70.0,
            classroom_threshold: 3.0,
            failing_homework_grade: 1.0,
            max_input_size: TELEGRAM_DOWNLOAD_LIMIT,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use eduxlsx::{AnalyzerBuilder, HomeworkPeriod};
///
/// # fn main() -> Result<(), eduxlsx::ReportError> {
/// let analyzer = AnalyzerBuilder::new()
///     .with_homework_period(HomeworkPeriod::Week)
///     .with_attendance_threshold(50.0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    /// 内部設定（構築中）
    config: AnalysisConfig,
}

impl AnalyzerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 最初のシート
    /// - 宿題チェック期間: 月
    /// - 出席率の閾値: 40%
    /// - 宿題チェック率・提出率の閾値: 70%
    /// - 授業評価の閾値: 3
    /// - 入力サイズ上限: 20MB
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// 解析対象のシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 宿題チェックレポートの期間を指定する
    pub fn with_homework_period(mut self, period: HomeworkPeriod) -> Self {
        self.config.homework_period = period;
        self
    }

    /// 出席率の閾値（%）を指定する
    pub fn with_attendance_threshold(mut self, percent: f64) -> Self {
        self.config.attendance_threshold = percent;
        self
    }

    /// 宿題チェック率の閾値（%）を指定する
    pub fn with_homework_check_threshold(mut self, percent: f64) -> Self {
        self.config.homework_check_threshold = percent;
        self
    }

    /// 宿題提出率の閾値（%）を指定する
    pub fn with_homework_submit_threshold(mut self, percent: f64) -> Self {
        self.config.homework_submit_threshold = percent;
        self
    }

    /// 授業評価の閾値を指定する
    pub fn with_classroom_threshold(mut self, grade: f64) -> Self {
        self.config.classroom_threshold = grade;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.max_input_size = bytes;
        self
    }

    /// 設定を検証し、`Analyzer`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `ReportError::Config(String)`: 設定の検証に失敗した場合
    ///   * パーセント閾値が0〜100の範囲外
    ///   * 授業評価の閾値が負、または有限でない
    ///   * 入力サイズ上限が0
    pub fn build(self) -> Result<Analyzer, ReportError> {
        let percent_thresholds = [
            ("attendance", self.config.attendance_threshold),
            ("homework check", self.config.homework_check_threshold),
            ("homework submit", self.config.homework_submit_threshold),
        ];
        for (name, value) in percent_thresholds {
            if !(0.0..=100.0).contains(&value) {
                return Err(ReportError::Config(format!(
                    "Invalid {} threshold: {} (expected 0..=100)",
                    name, value
                )));
            }
        }

        if !self.config.classroom_threshold.is_finite() || self.config.classroom_threshold < 0.0 {
            return Err(ReportError::Config(format!(
                "Invalid classroom threshold: {}",
                self.config.classroom_threshold
            )));
        }

        if self.config.max_input_size == 0 {
            return Err(ReportError::Config(
                "Max input size must be greater than zero".to_string(),
            ));
        }

        Ok(Analyzer {
            config: self.config,
        })
    }
}

/// 解析処理のファサード
///
/// ワークブックを読み込み、指定された種類のレポートを生成します。
///
/// # 使用例
///
/// ```rust,no_run
/// use eduxlsx::{AnalyzerBuilder, ReportKind};
/// use std::fs::File;
///
/// # fn main() -> Result<(), eduxlsx::ReportError> {
/// let analyzer = AnalyzerBuilder::new().build()?;
/// let input = File::open("Посещаемость по преподавателям.xlsx")?;
/// let output = analyzer.analyze(ReportKind::Attendance, input)?;
/// for message in output.messages {
///     println!("{}", message.text);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    /// 解析設定
    config: AnalysisConfig,
}

impl Analyzer {
    /// 宿題チェック期間だけを差し替えたコピーを返す
    pub fn with_homework_period(&self, period: HomeworkPeriod) -> Analyzer {
        let mut config = self.config.clone();
        config.homework_period = period;
        Analyzer { config }
    }

    /// シート選択だけを差し替えたコピーを返す
    pub fn with_sheet_selector(&self, selector: SheetSelector) -> Analyzer {
        let mut config = self.config.clone();
        config.sheet_selector = selector;
        Analyzer { config }
    }

    /// 入力ファイルの最大サイズ（バイト）
    pub fn max_input_size(&self) -> u64 {
        self.config.max_input_size
    }

    /// ワークブックを解析してレポートを生成
    ///
    /// # 処理フロー
    ///
    /// 1. WorkbookParserの初期化（サイズ上限チェックを含む）
    /// 2. シート選択
    /// 3. シートを行の集合として読み出し
    /// 4. レポート種別ごとの解析
    ///
    /// # 戻り値
    ///
    /// * `Ok(ReportOutput)` - 送信用メッセージと集計
    /// * `Err(ReportError)` - 読み込み失敗、または必要な列が見つからない場合
    pub fn analyze<R: Read>(&self, kind: ReportKind, input: R) -> Result<ReportOutput, ReportError> {
        if !kind.is_file_report() {
            return Err(ReportError::Config(format!(
                "Report kind '{}' does not analyze spreadsheets",
                kind
            )));
        }

        let mut parser = WorkbookParser::open(input, self.config.max_input_size)?;
        let sheet_name = parser.select_sheet(&self.config.sheet_selector)?;
        let grid = parser.read_grid(&sheet_name)?;

        tracing::debug!(
            report = %kind,
            sheet = %sheet_name,
            rows = grid.rows.len(),
            columns = grid.width(),
            "sheet loaded"
        );

        let output = report::run(kind, &grid, &self.config)?;

        tracing::info!(
            report = %kind,
            rows_scanned = output.summary.rows_scanned,
            flagged = output.summary.flagged,
            messages = output.messages.len(),
            "report built"
        );

        Ok(output)
    }

    /// メモリ上のバイト列を解析
    pub fn analyze_bytes(&self, kind: ReportKind, bytes: &[u8]) -> Result<ReportOutput, ReportError> {
        self.analyze(kind, Cursor::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_builder_new() {
        let builder = AnalyzerBuilder::new();
        assert_eq!(builder.config.sheet_selector, SheetSelector::Index(0));
        assert_eq!(builder.config.homework_period, HomeworkPeriod::Month);
        assert_eq!(builder.config.attendance_threshold, 40.0);
        assert_eq!(builder.config.homework_check_threshold, 70.0);
        assert_eq!(builder.config.homework_submit_threshold, 70.0);
        assert_eq!(builder.config.classroom_threshold, 3.0);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = AnalyzerBuilder::new()
            .with_sheet_selector(SheetSelector::Name("Лист1".to_string()))
            .with_homework_period(HomeworkPeriod::Week)
            .with_attendance_threshold(50.0)
            .with_homework_check_threshold(80.0)
            .with_homework_submit_threshold(60.0)
            .with_classroom_threshold(4.0)
            .with_max_input_size(1024);

        assert!(matches!(
            builder.config.sheet_selector,
            SheetSelector::Name(ref name) if name == "Лист1"
        ));
        assert_eq!(builder.config.homework_period, HomeworkPeriod::Week);
        assert_eq!(builder.config.attendance_threshold, 50.0);
        assert_eq!(builder.config.homework_check_threshold, 80.0);
        assert_eq!(builder.config.homework_submit_threshold, 60.0);
        assert_eq!(builder.config.classroom_threshold, 4.0);
        assert_eq!(builder.config.max_input_size, 1024);
    }

    #[test]
    fn test_build_success() {
        assert!(AnalyzerBuilder::new().build().is_ok());
    }

    #[test]
    fn test_build_with_invalid_threshold() {
        let result = AnalyzerBuilder::new().with_attendance_threshold(140.0).build();
        match result {
            Err(ReportError::Config(msg)) => assert!(msg.contains("attendance")),
            _ => panic!("Expected Config error"),
        }

        let result = AnalyzerBuilder::new()
            .with_homework_submit_threshold(f64::NAN)
            .build();
        assert!(matches!(result, Err(ReportError::Config(_))));
    }

    #[test]
    fn test_build_with_negative_classroom_threshold() {
        let result = AnalyzerBuilder::new().with_classroom_threshold(-1.0).build();
        match result {
            Err(ReportError::Config(msg)) => assert!(msg.contains("classroom")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_zero_input_size() {
        let result = AnalyzerBuilder::new().with_max_input_size(0).build();
        assert!(matches!(result, Err(ReportError::Config(_))));
    }

    #[test]
    fn test_with_homework_period_copies_config() {
        let analyzer = AnalyzerBuilder::new()
            .with_attendance_threshold(55.0)
            .build()
            .unwrap();
        let weekly = analyzer.with_homework_period(HomeworkPeriod::Week);
        assert_eq!(weekly.config.homework_period, HomeworkPeriod::Week);
        assert_eq!(weekly.config.attendance_threshold, 55.0);
        assert_eq!(analyzer.config.homework_period, HomeworkPeriod::Month);
    }

    #[test]
    fn test_with_sheet_selector_copies_config() {
        let analyzer = AnalyzerBuilder::new()
            .with_classroom_threshold(4.0)
            .build()
            .unwrap();
        let named = analyzer.with_sheet_selector(SheetSelector::Name("Лист2".to_string()));
        assert_eq!(named.config.sheet_selector, SheetSelector::Name("Лист2".to_string()));
        assert_eq!(named.config.classroom_threshold, 4.0);
        assert_eq!(analyzer.config.sheet_selector, SheetSelector::Index(0));
    }

    #[test]
    fn test_analyze_rejects_ai_kind() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let result = analyzer.analyze_bytes(ReportKind::Ai, &[]);
        assert!(matches!(result, Err(ReportError::Config(_))));
    }

    #[test]
    fn test_analyze_with_invalid_input() {
        let analyzer = AnalyzerBuilder::new().build().unwrap();
        let result = analyzer.analyze_bytes(ReportKind::Attendance, b"garbage");
        assert!(result.is_err());
    }
}
