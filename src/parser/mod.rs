//! Parser Module
//!
//! calamineを使用したワークブック読み込みと、シートからテーブルへの変換を提供します。

mod workbook;

pub use workbook::{HeaderLayout, SheetGrid, WorkbookParser};
