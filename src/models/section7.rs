use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{GuardMetadata, Language};

/// Token 用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// 单次格式化的元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub language: Language,
    pub files_loaded: Vec<String>,
    pub prompt_length: usize,
    pub processing_time_ms: u64,
    pub model: String,
    pub guards_applied: Vec<String>,
    /// 守卫名 → 诊断信息（术语替换、日期重排建议）
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub guard_metadata: BTreeMap<String, GuardMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// 第 7 节格式化结果
///
/// 每次请求创建一次，返回后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section7Result {
    pub formatted: String,
    /// 模型报告成功且没有关键违规
    pub ok: bool,
    pub violations: Vec<String>,
    pub doctor_names_seen: Vec<String>,
    pub started_with_worker: bool,
    pub chronology_ok: bool,
    pub suggestions: Vec<String>,
    pub names_restored: usize,
    pub metadata: ResultMetadata,
}

impl Section7Result {
    /// 是否来自兜底模式
    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback.unwrap_or(false)
    }
}
