use thiserror::Error;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Required document {key} could not be loaded: {reason}")]
    RequiredDocument { key: String, reason: String },

    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 生成 URL 安全的 slug
///
/// 规则：小写 → 删除 `[a-z0-9 _-]` 以外的字符 → 空白变 `_` → 合并连续 `_` → 去掉首尾 `_`
pub fn make_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
            continue;
        }
        if pending_space {
            slug.push('_');
            pending_space = false;
        }
        slug.push(c);
    }
    if pending_space {
        slug.push('_');
    }

    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('_').to_string()
}

/// 去除变音符号并小写，用于大小写/重音不敏感的比较
pub fn fold_text(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

/// 拉丁字母的重音折叠（覆盖法语与常见西欧字符）
fn strip_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        '’' => '\'',
        other => other,
    }
}

/// 把折叠后的文本拆成字母数字单词
pub fn words(text: &str) -> Vec<String> {
    fold_text(text)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// 判断字符串是否像首字母大写的专有名词（同时包含大写和小写字母）
///
/// 只是启发式：全小写或全大写的合法名字会被漏掉。
pub fn looks_like_proper_noun(text: &str) -> bool {
    let has_upper = text.chars().any(char::is_uppercase);
    let has_lower = text.chars().any(char::is_lowercase);
    has_upper && has_lower
}

/// 稀有度星级（显示时才截断到 [0, 5]）
pub fn rarity_stars(rarity: i64) -> String {
    let count = rarity.clamp(0, 5) as usize;
    "★".repeat(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_slug() {
        assert_eq!(make_slug("Black Swan"), "black_swan");
        assert_eq!(make_slug("  March 7th "), "march_7th");
        assert_eq!(make_slug("Dan Heng • Imbibitor Lunae"), "dan_heng_imbibitor_lunae");
        assert_eq!(make_slug("Topaz & Numby"), "topaz_numby");
        assert_eq!(make_slug("Luciole"), "luciole");
        assert_eq!(make_slug(""), "");
    }

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Érudition"), "erudition");
        assert_eq!(fold_text("DESTRUCTION"), "destruction");
        assert_eq!(fold_text("L’Harmonie"), "l'harmonie");
    }

    #[test]
    fn test_words() {
        assert_eq!(words("Luciole (Firefly)"), vec!["luciole", "firefly"]);
        assert!(words("  ").is_empty());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A\" & 'B'</b>"), "&lt;b&gt;&quot;A&quot; &amp; &#039;B&#039;&lt;/b&gt;");
    }

    #[test]
    fn test_looks_like_proper_noun() {
        assert!(looks_like_proper_noun("Firefly"));
        assert!(looks_like_proper_noun("Black Swan"));
        assert!(!looks_like_proper_noun("luciole"));
        assert!(!looks_like_proper_noun("SAM"));
    }

    #[test]
    fn test_rarity_stars() {
        assert_eq!(rarity_stars(5), "★★★★★");
        assert_eq!(rarity_stars(4), "★★★★");
        assert_eq!(rarity_stars(9), "★★★★★");
        assert_eq!(rarity_stars(-2), "");
    }
}
