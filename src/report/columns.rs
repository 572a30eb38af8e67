//! 見出しのキーワード照合

/// 教員名の列を示すキーワード
pub(crate) const TEACHER_KEYWORDS: &[&str] = &["преподават", "учител", "фио", "преподав"];

/// 小文字化済みの見出しがいずれかのキーワードを含むか
pub(crate) fn contains_any(label: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| label.contains(k))
}

/// キーワードを含む最初の列
pub(crate) fn first_matching(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|h| contains_any(h, keywords))
}

/// キーワードを含む最後の列
pub(crate) fn last_matching(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().rposition(|h| contains_any(h, keywords))
}
