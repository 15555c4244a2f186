use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::schema::ParamTable;

/// `#N[i]`、`#N[fK]`，可带 `%`
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)\[(i|f\d+)\](%?)").expect("placeholder pattern is valid"));

/// 判定为整数的容差
const INTEGER_EPSILON: f64 = 1e-8;

/// 展开描述模板中的参数占位符
///
/// N 从 1 开始；档位越界时取最后一档；缺失的参数替换为空串。
/// 带 `%` 的占位符数值乘 100，并保留百分号。
pub fn expand_params(template: &str, params: &ParamTable, rank: usize) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let Some(index) = caps[1].parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                return String::new();
            };
            let Some(mut value) = params.value(index, rank) else {
                return String::new();
            };
            let percent = !caps[3].is_empty();
            if percent {
                value *= 100.0;
            }
            let decimals = caps[2].strip_prefix('f').and_then(|k| k.parse::<usize>().ok());
            let mut text = format_value(value, decimals);
            if percent {
                text.push('%');
            }
            text
        })
        .into_owned()
}

/// 数值格式化：接近整数时输出整数，否则保留 `decimals` 位（默认 2 位）并去掉末尾的 0
pub fn format_value(value: f64, decimals: Option<usize>) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_EPSILON {
        return format!("{}", rounded as i64);
    }
    let fixed = format!("{:.*}", decimals.unwrap_or(2), value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ParamTable {
        ParamTable::new(vec![vec![0.50, 0.56, 0.62, 0.68, 0.75], vec![2.0], vec![0.333]])
    }

    #[test]
    fn test_percent_placeholder_by_rank() {
        assert_eq!(expand_params("Deals #1[i]% DMG", &table(), 2), "Deals 62% DMG");
        assert_eq!(expand_params("Deals #1[i]% DMG", &table(), 0), "Deals 50% DMG");
    }

    #[test]
    fn test_rank_clamped_to_last() {
        assert_eq!(expand_params("Deals #1[i]% DMG", &table(), 10), "Deals 75% DMG");
        assert_eq!(expand_params("#2[i] tours", &table(), 4), "2 tours");
    }

    #[test]
    fn test_missing_parameter_is_empty() {
        assert_eq!(expand_params("A#9[i]%B", &table(), 0), "AB");
        assert_eq!(expand_params("#1[i]", &ParamTable::default(), 0), "");
    }

    #[test]
    fn test_out_of_range_index_is_empty() {
        assert_eq!(expand_params("X #99999999999999999999999[i]% Y", &table(), 0), "X  Y");
        assert_eq!(expand_params("X #0[i] Y", &table(), 0), "X  Y");
    }

    #[test]
    fn test_fixed_decimals() {
        assert_eq!(expand_params("#3[f1]", &table(), 0), "0.3");
        assert_eq!(expand_params("#3[i]", &table(), 0), "0.33");
        assert_eq!(expand_params("#3[f1]%", &table(), 0), "33.3%");
    }

    #[test]
    fn test_untouched_text() {
        assert_eq!(expand_params("#1 sans crochets, #x[i]", &table(), 0), "#1 sans crochets, #x[i]");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(62.000000001, None), "62");
        assert_eq!(format_value(50.1, None), "50.1");
        assert_eq!(format_value(12.345, Some(1)), "12.3");
        assert_eq!(format_value(-0.001, None), "0");
    }
}
