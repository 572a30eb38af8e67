//! Output Formatters Implementation
//!
//! エスケープ処理とメッセージ分割の実装。

/// 旧Markdownで特別な意味を持つ文字
const MARKDOWN_SPECIAL: &[char] = &['_', '*', '`', '['];

/// MarkdownV2で特別な意味を持つ文字（バックスラッシュ自身を含む）
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// 旧Markdown向けにエスケープ
pub fn escape_markdown(s: &str) -> String {
    escape_with(s, MARKDOWN_SPECIAL)
}

/// MarkdownV2向けにエスケープ
pub fn escape_markdown_v2(s: &str) -> String {
    escape_with(s, MARKDOWN_V2_SPECIAL)
}

fn escape_with(s: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// CSVフィールドをエスケープ
///
/// カンマ・ダブルクォート・改行を含む場合のみクォートします。
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// 見出し行とデータ行をCSVテキストに変換
pub fn render_csv(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let mut push_record = |fields: &[String]| {
        let record: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
        out.push_str(&record.join(","));
        out.push('\n');
    };
    push_record(headers);
    for row in rows {
        push_record(row);
    }
    out
}

/// Telegramが数える長さ（UTF-16コード単位）
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// 行単位でメッセージを詰める
///
/// 各メッセージは`limit`以下に収まるよう、行を`\n`で連結して貪欲に詰めます。
/// 1行だけで`limit`を超える場合は、その行を文字境界で強制分割します。
pub fn split_lines(lines: &[String], limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut messages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut current_lines = 0;

    for line in lines {
        let line_len = text_len(line);

        if line_len > limit {
            if current_lines > 0 {
                messages.push(std::mem::take(&mut current));
                current_len = 0;
                current_lines = 0;
            }
            messages.extend(hard_split(line, limit));
            continue;
        }

        let needed = if current_lines == 0 {
            line_len
        } else {
            current_len + 1 + line_len
        };

        if current_lines > 0 && needed > limit {
            messages.push(std::mem::take(&mut current));
            current.push_str(line);
            current_len = line_len;
            current_lines = 1;
        } else {
            if current_lines > 0 {
                current.push('\n');
            }
            current.push_str(line);
            current_len = needed;
            current_lines += 1;
        }
    }

    if current_lines > 0 && !current.trim().is_empty() {
        messages.push(current);
    }

    messages
}

fn hard_split(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;

    for c in line.chars() {
        let c_len = c.len_utf16();
        if piece_len + c_len > limit && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push(c);
        piece_len += c_len;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
