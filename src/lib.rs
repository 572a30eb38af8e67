//! eduxlsx - Telegram bot that turns school spreadsheet exports into short text reports
//!
//! This crate reads Excel exports from a school journal (schedules, lesson topics,
//! attendance, homework statistics) and produces compact Russian-language reports
//! sized for Telegram messages. It also ships the bot itself: a long-polling
//! Bot API client, a per-user conversation state machine and an optional
//! chat-completions assistant.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use eduxlsx::{AnalyzerBuilder, ReportKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create an analyzer with default thresholds
//!     let analyzer = AnalyzerBuilder::new().build()?;
//!
//!     // Analyze an attendance export
//!     let input = File::open("Посещаемость по преподавателям.xlsx")?;
//!     let output = analyzer.analyze(ReportKind::Attendance, input)?;
//!
//!     for message in &output.messages {
//!         println!("{}", message.text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Thresholds
//!
//! ```rust,no_run
//! use std::fs::File;
//! use eduxlsx::{AnalyzerBuilder, HomeworkPeriod, ReportKind, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = AnalyzerBuilder::new()
//!         .with_sheet_selector(SheetSelector::Index(0))
//!         .with_homework_period(HomeworkPeriod::Week)   // weekly column pair
//!         .with_homework_check_threshold(80.0)          // flag below 80%
//!         .build()?;
//!
//!     let input = File::open("Отчет по домашним заданиям.xlsx")?;
//!     let output = analyzer.analyze(ReportKind::HomeworkCheck, input)?;
//!     println!("{}", output.joined_text());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Running the Bot
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use eduxlsx::bot::Dialog;
//! use eduxlsx::config::BotConfig;
//! use eduxlsx::telegram::{Poller, TelegramClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BotConfig::load(None)?;
//! let poll = Duration::from_secs(config.poll_timeout_secs);
//! let client = Arc::new(TelegramClient::new(
//!     &config.api_base,
//!     config.token()?,
//!     poll,
//!     config.max_file_size,
//! )?);
//! let dialog = Arc::new(Dialog::new(client.clone(), None, config.analyzer()?));
//! Poller::new(client, dialog, poll, Duration::from_secs(5)).run().await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod output;
mod parser;
mod report;
mod security;
mod types;

pub mod ai;
pub mod bot;
pub mod config;
pub mod telegram;

// 公開API
pub use api::{HomeworkPeriod, ParseMode, ReportKind, SheetSelector};
pub use builder::{Analyzer, AnalyzerBuilder};
pub use error::{AiError, BotError, ReportError};
pub use output::{OutgoingText, REPORT_CHUNK_LIMIT, TELEGRAM_MESSAGE_LIMIT};
pub use report::{ReportOutput, ReportSummary};
pub use security::validate_document_name;
