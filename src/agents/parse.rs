//! 从模型输出中提取 JSON
//!
//! 模型常把 JSON 包在 ```json ... ``` 里或前后夹杂说明文字：先剥代码块，再取首个 open 到最后一个 close 之间的片段。

use crate::core::ResearchError;

/// 提取 JSON 片段；open / close 为 '[' ']' 或 '{' '}'
pub fn extract_json(output: &str, open: char, close: char) -> &str {
    let trimmed = output.trim();

    let body = if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.find("```").map(|end| &rest[..end]).unwrap_or(rest).trim()
    } else {
        trimmed
    };

    match (body.find(open), body.rfind(close)) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

/// 解析字符串列表（JSON array of strings）
pub fn parse_string_list(stage: &'static str, output: &str) -> Result<Vec<String>, ResearchError> {
    let json = extract_json(output, '[', ']');
    serde_json::from_str::<Vec<String>>(json)
        .map_err(|e| ResearchError::malformed(stage, format!("{e}: {json}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_list() {
        assert_eq!(
            parse_string_list("Planner", r#"["a", "b"]"#).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_fenced_list() {
        let out = "```json\n[\"Social inequality\", \"Enlightenment\"]\n```";
        assert_eq!(parse_string_list("Planner", out).unwrap().len(), 2);
    }

    #[test]
    fn test_list_with_chatter() {
        let out = "Here is the plan:\n[\"q1\"]\nGood luck!";
        assert_eq!(parse_string_list("Planner", out).unwrap(), vec!["q1".to_string()]);
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_string_list("Reflector", "[]").unwrap().is_empty());
    }

    #[test]
    fn test_not_a_list() {
        let err = parse_string_list("Planner", "I cannot help with that.").unwrap_err();
        assert!(matches!(err, ResearchError::MalformedOutput { stage: "Planner", .. }));
    }

    #[test]
    fn test_extract_object() {
        let out = "```\n{\"question\": \"q\", \"answer\": \"a [x]\"}\n```";
        assert_eq!(extract_json(out, '{', '}'), "{\"question\": \"q\", \"answer\": \"a [x]\"}");
    }
}
