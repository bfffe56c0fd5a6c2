//! 模型返回的 JSON 契约
//!
//! 模型输出是不可信文本：先解析成 `Value`，逐个校验键和类型，再取值。

use serde_json::Value;

/// 契约要求的全部键
pub const REQUIRED_KEYS: [&str; 6] = [
    "ok",
    "violations",
    "doctor_names_seen",
    "started_with_worker",
    "chronology_ok",
    "rendered_text",
];

pub const NON_JSON_OUTPUT: &str = "non_json_output";
pub const MISSING_JSON_KEYS: &str = "missing_json_keys";

/// 校验后的模型响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub ok: bool,
    pub violations: Vec<String>,
    pub doctor_names_seen: Vec<String>,
    pub started_with_worker: bool,
    pub chronology_ok: bool,
    pub rendered_text: String,
}

impl ModelResponse {
    /// 解析模型原始输出，永不失败
    ///
    /// 非 JSON 时返回带 `non_json_output` 的失败结果；缺键或类型不符时返回
    /// `missing_json_keys` 加上具体键名。两种情况都把原始文本当作 `rendered_text`。
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let body = strip_code_fence(trimmed);

        let value: Value = match serde_json::from_str(body) {
            Ok(value @ Value::Object(_)) => value,
            _ => return Self::failure(vec![NON_JSON_OUTPUT.to_string()], trimmed),
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !has_expected_type(key, value.get(**key)))
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            let mut violations = vec![MISSING_JSON_KEYS.to_string()];
            violations.extend(missing);
            return Self::failure(violations, trimmed);
        }

        Self {
            ok: value["ok"].as_bool().unwrap_or(false),
            violations: string_list(&value["violations"]),
            doctor_names_seen: string_list(&value["doctor_names_seen"]),
            started_with_worker: value["started_with_worker"].as_bool().unwrap_or(false),
            chronology_ok: value["chronology_ok"].as_bool().unwrap_or(false),
            rendered_text: value["rendered_text"].as_str().unwrap_or_default().to_string(),
        }
    }

    fn failure(violations: Vec<String>, raw: &str) -> Self {
        Self {
            ok: false,
            violations,
            doctor_names_seen: Vec::new(),
            started_with_worker: false,
            chronology_ok: false,
            rendered_text: raw.to_string(),
        }
    }
}

fn has_expected_type(key: &str, value: Option<&Value>) -> bool {
    match (key, value) {
        ("ok" | "started_with_worker" | "chronology_ok", Some(v)) => v.is_boolean(),
        ("violations" | "doctor_names_seen", Some(Value::Array(items))) => {
            items.iter().all(Value::is_string)
        }
        ("rendered_text", Some(v)) => v.is_string(),
        _ => false,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// 去掉 ```json ... ``` 包裹
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
