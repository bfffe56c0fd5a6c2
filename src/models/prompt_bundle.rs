use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::PromptError;

/// 提示词工件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// 主指令文档
    Master,
    /// 规则配置（JSON）
    Rules,
    /// 参考示例（golden example）
    Golden,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Master,
        ArtifactKind::Rules,
        ArtifactKind::Golden,
    ];

    /// 元数据 `filesLoaded` 中使用的名称
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Master => "masterDocument",
            ArtifactKind::Rules => "rulesConfig",
            ArtifactKind::Golden => "referenceExample",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 解析器返回的三个工件（原始文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    pub master_document: String,
    /// 规则配置的 JSON 原文
    pub rules_config: String,
    pub reference_example: String,
    /// 实际使用的模板版本
    pub version_used: String,
}

impl PromptBundle {
    pub fn artifact(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Master => &self.master_document,
            ArtifactKind::Rules => &self.rules_config,
            ArtifactKind::Golden => &self.reference_example,
        }
    }
}

/// 术语规则
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TerminologyRules {
    #[serde(default, alias = "preferes")]
    pub preferred: BTreeMap<String, String>,
    #[serde(default, alias = "interdits")]
    pub prohibited: Vec<String>,
}

/// 少样本示例
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FewShotExample {
    #[serde(default, alias = "note_entree")]
    pub input_note: String,
    #[serde(default, alias = "extrait_sortie")]
    pub output_snippet: String,
}

/// 结构化规则配置，法语与英语键名均可
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RulesConfig {
    #[serde(default, alias = "regles_style")]
    pub style_rules: Map<String, Value>,
    #[serde(default, alias = "terminologie")]
    pub terminology: TerminologyRules,
    #[serde(default, alias = "verifications_QA")]
    pub qa_checks: Map<String, Value>,
    #[serde(default, alias = "exemples")]
    pub few_shot: Vec<FewShotExample>,
}

impl RulesConfig {
    /// 解析 JSON 原文
    pub fn parse(raw: &str) -> Result<Self, PromptError> {
        serde_json::from_str(raw).map_err(|source| PromptError::RulesConfigInvalid { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_french_keys() {
        let raw = r#"{
            "regles_style": {"travailleur_en_premier": true, "ton": "neutre"},
            "terminologie": {"preferes": {"patient": "travailleur"}, "interdits": ["patient"]},
            "verifications_QA": {"entete_unique": true},
            "exemples": [{"note_entree": "pt vu le 3 mai", "extrait_sortie": "Le travailleur consulte"}],
            "inconnu": 42
        }"#;
        let config = RulesConfig::parse(raw).unwrap();
        assert_eq!(config.style_rules.len(), 2);
        assert_eq!(config.terminology.preferred["patient"], "travailleur");
        assert_eq!(config.terminology.prohibited, vec!["patient"]);
        assert_eq!(config.few_shot[0].output_snippet, "Le travailleur consulte");
    }

    #[test]
    fn test_parse_english_keys_and_defaults() {
        let config = RulesConfig::parse(r#"{"style_rules": {"worker_first": true}}"#).unwrap();
        assert!(config.qa_checks.is_empty());
        assert!(config.few_shot.is_empty());
    }

    #[test]
    fn test_malformed_json_is_rules_config_invalid() {
        let err = RulesConfig::parse("{ not json").unwrap_err();
        assert!(matches!(err, PromptError::RulesConfigInvalid { .. }));
    }
}
