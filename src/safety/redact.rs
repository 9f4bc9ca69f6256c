//! PII 脱敏：邮箱、电话、SSN 替换为 [<LABEL>_REDACTED]
//!
//! 替换标记本身不含数字和 @，所以重复脱敏不会再命中，sanitize_text 幂等。

use std::sync::LazyLock;

use regex::Regex;

static PII_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}", "[EMAIL_REDACTED]"),
        (r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b", "[PHONE_REDACTED]"),
        (r"\b\d{3}-\d{2}-\d{4}\b", "[SSN_REDACTED]"),
    ]
    .into_iter()
    .map(|(pattern, token)| (Regex::new(pattern).expect("PII pattern is valid"), token))
    .collect()
});

/// 依次应用各 PII 模式，返回脱敏后的文本
pub fn sanitize_text(text: &str) -> String {
    let mut sanitized = text.to_string();
    for (pattern, token) in PII_PATTERNS.iter() {
        if pattern.is_match(&sanitized) {
            sanitized = pattern.replace_all(&sanitized, *token).into_owned();
        }
    }
    sanitized
}
