use std::sync::LazyLock;

use regex::{Captures, Regex};

/// 回合单位前的数值（四舍五入为整数）
static TURN_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(tours?|turns?|rounds?)\b").expect("turn pattern is valid")
});

/// 需要高亮的数值
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-]?\d+(?:[.,]\d+)?").expect("number pattern is valid"));

const STRONG_OPEN: &str = "<strong>";
const STRONG_CLOSE: &str = "</strong>";

/// 标记文本片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Tag(&'a str),
    Entity(&'a str),
    Text(&'a str),
}

/// 按标签切分；标签之间的文本（含实体）作为一个整体返回
fn split_tags(html: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while let Some(offset) = html[i..].find('<') {
        let open = i + offset;
        let Some(close) = html[open..].find('>').map(|p| open + p + 1) else {
            break;
        };
        if text_start < open {
            pieces.push(Piece::Text(&html[text_start..open]));
        }
        pieces.push(Piece::Tag(&html[open..close]));
        text_start = close;
        i = close;
    }
    if text_start < html.len() {
        pieces.push(Piece::Text(&html[text_start..]));
    }
    pieces
}

/// 把文本再按 HTML 实体切分
fn split_entities(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while let Some(offset) = text[i..].find('&') {
        let amp = i + offset;
        match entity_len(&text[amp..]) {
            Some(len) => {
                if text_start < amp {
                    pieces.push(Piece::Text(&text[text_start..amp]));
                }
                pieces.push(Piece::Entity(&text[amp..amp + len]));
                text_start = amp + len;
                i = amp + len;
            }
            None => i = amp + 1,
        }
    }
    if text_start < text.len() {
        pieces.push(Piece::Text(&text[text_start..]));
    }
    pieces
}

/// `rest` 以 `&` 开头时，返回实体（`&name;` / `&#123;`）的字节长度
fn entity_len(rest: &str) -> Option<usize> {
    let semi = rest.get(1..)?.find(';')? + 1;
    let body = &rest[1..semi];
    let name = body.strip_prefix('#').unwrap_or(body);
    let valid = !name.is_empty() && name.len() <= 8 && name.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(semi + 1)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_starts_at(text: &str, index: usize) -> bool {
    text[..index].chars().next_back().map_or(true, |c| !is_word_char(c))
}

fn word_ends_at(text: &str, index: usize) -> bool {
    text[index..].chars().next().map_or(true, |c| !is_word_char(c))
}

/// 关键词加粗
///
/// `keywords` 必须已转义并按长度降序排列。单次扫描，每个位置取最长的整词匹配，
/// 已加粗的区间和实体内部不会再匹配。
pub fn emphasize_keywords(html: &str, keywords: &[String]) -> String {
    if keywords.is_empty() {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut strong_depth = 0usize;
    for piece in split_tags(html) {
        match piece {
            Piece::Tag(tag) => {
                if tag.eq_ignore_ascii_case(STRONG_OPEN) {
                    strong_depth += 1;
                } else if tag.eq_ignore_ascii_case(STRONG_CLOSE) {
                    strong_depth = strong_depth.saturating_sub(1);
                }
                out.push_str(tag);
            }
            Piece::Text(text) if strong_depth == 0 => emphasize_run(text, keywords, &mut out),
            Piece::Text(text) | Piece::Entity(text) => out.push_str(text),
        }
    }
    out
}

fn emphasize_run(run: &str, keywords: &[String], out: &mut String) {
    let mut i = 0;
    while i < run.len() {
        let rest = &run[i..];
        if rest.starts_with('&') {
            if let Some(len) = entity_len(rest) {
                out.push_str(&rest[..len]);
                i += len;
                continue;
            }
        }

        if word_starts_at(run, i) {
            let found = keywords
                .iter()
                .find(|kw| rest.starts_with(kw.as_str()) && word_ends_at(run, i + kw.len()));
            if let Some(keyword) = found {
                out.push_str(STRONG_OPEN);
                out.push_str(keyword);
                out.push_str(STRONG_CLOSE);
                i += keyword.len();
                continue;
            }
        }

        let Some(c) = rest.chars().next() else { break };
        out.push(c);
        i += c.len_utf8();
    }
}

/// 回合取整并高亮所有数值
///
/// 只处理标签之间的文本，实体保持原样（`&#039;` 中的数字不会被高亮）。
pub fn highlight_numbers(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 32);
    for piece in split_tags(html) {
        match piece {
            Piece::Text(text) => {
                for inner in split_entities(text) {
                    match inner {
                        Piece::Text(segment) => out.push_str(&highlight_segment(segment)),
                        Piece::Tag(raw) | Piece::Entity(raw) => out.push_str(raw),
                    }
                }
            }
            Piece::Tag(raw) | Piece::Entity(raw) => out.push_str(raw),
        }
    }
    out
}

fn highlight_segment(segment: &str) -> String {
    let rounded = TURN_VALUE.replace_all(segment, |caps: &Captures| {
        match caps[1].replace(',', ".").parse::<f64>() {
            Ok(value) if value.is_finite() => format!("{} {}", value.round() as i64, &caps[2]),
            _ => caps[0].to_string(),
        }
    });
    NUMBER
        .replace_all(&rounded, r#"<span class="hl">$0</span>"#)
        .into_owned()
}
