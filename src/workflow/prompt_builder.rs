//! 提示词组装 - 流程层
//!
//! 拼接顺序固定：
//! 1. 姓名保全规则（关键，始终最前）
//! 2. 主指令文档
//! 3. 参考示例（可按行数截断）
//! 4. 规则配置
//! 5. 少样本示例
//! 6. JSON 响应契约

use std::fmt::Write as _;

use serde_json::Value;
use tracing::debug;

use crate::error::PromptError;
use crate::models::{ArtifactKind, FewShotExample, Language, PromptBundle, RulesConfig};
use crate::services::name_preservation::preservation_rules;

/// 组装好的系统提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    /// 字符数
    pub prompt_length: usize,
    pub files_loaded: Vec<String>,
    pub version_used: String,
}

/// 提示词组装器
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    golden_example_max_lines: usize,
}

impl PromptBuilder {
    /// `golden_example_max_lines` 为 0 时不截断参考示例
    pub fn new(golden_example_max_lines: usize) -> Self {
        Self {
            golden_example_max_lines,
        }
    }

    pub fn build(
        &self,
        bundle: &PromptBundle,
        language: Language,
    ) -> Result<AssembledPrompt, PromptError> {
        let rules = RulesConfig::parse(&bundle.rules_config)?;

        let mut prompt = String::new();
        prompt.push_str(preservation_rules(language));
        prompt.push_str("\n\n");
        prompt.push_str(&bundle.master_document);

        prompt.push_str(&self.reference_section(&bundle.reference_example, language));
        prompt.push_str(&render_rules(&rules));
        prompt.push_str(&render_few_shot(&rules.few_shot));
        prompt.push_str(RESPONSE_CONTRACT);

        let prompt_length = prompt.chars().count();
        debug!("系统提示词组装完成: {} 字符", prompt_length);

        Ok(AssembledPrompt {
            system_prompt: prompt,
            prompt_length,
            files_loaded: ArtifactKind::ALL.iter().map(|k| k.label().to_string()).collect(),
            version_used: bundle.version_used.clone(),
        })
    }

    fn reference_section(&self, example: &str, language: Language) -> String {
        let (body, heading) = if self.golden_example_max_lines > 0 {
            let shortened = example
                .lines()
                .take(self.golden_example_max_lines)
                .collect::<Vec<_>>()
                .join("\n");
            (shortened, "\n\n## REFERENCE EXAMPLE (SHORTENED):\n")
        } else {
            (example.to_string(), "\n\n## REFERENCE EXAMPLE:\n")
        };

        let guidance = match language {
            Language::French => FRENCH_EXAMPLE_GUIDANCE,
            Language::English => ENGLISH_EXAMPLE_GUIDANCE,
        };

        format!("{}{}{}", heading, guidance, body)
    }
}

const FRENCH_EXAMPLE_GUIDANCE: &str = "Utilise cet exemple uniquement comme référence de structure \
et de style. Ne pas copier mot à mot. Note la préservation des noms complets des médecins.\n\n";

const ENGLISH_EXAMPLE_GUIDANCE: &str = "Use this example only as a reference for structure \
and style. Do not copy word for word. Note the preservation of complete doctor names.\n\n";

/// 构造用户消息：语言相关的指令 + 原文
pub fn user_message(content: &str, language: Language) -> String {
    match language {
        Language::French => format!(
            "Formate ce texte médical brut selon les standards québécois CNESST pour la Section 7. Réponds UNIQUEMENT en JSON selon le format requis:\n\n{}",
            content
        ),
        Language::English => format!(
            "Format this raw medical text according to Quebec CNESST standards for Section 7. Respond ONLY in JSON according to the required format:\n\n{}",
            content
        ),
    }
}

fn render_flags(out: &mut String, entries: &serde_json::Map<String, Value>, strings: bool) {
    for (key, value) in entries {
        match value {
            Value::Bool(true) => {
                let _ = writeln!(out, "- {}: REQUIRED", key);
            }
            Value::String(text) if strings => {
                let _ = writeln!(out, "- {}: {}", key, text);
            }
            _ => {}
        }
    }
}

fn render_rules(rules: &RulesConfig) -> String {
    let mut out = String::new();

    if !rules.style_rules.is_empty() {
        out.push_str("\n\n## STYLE RULES (CRITICAL):\n");
        render_flags(&mut out, &rules.style_rules, true);
    }

    let terminology = &rules.terminology;
    if !terminology.preferred.is_empty() || !terminology.prohibited.is_empty() {
        out.push_str("\n\n## TERMINOLOGY RULES:\n");
        for (from, to) in &terminology.preferred {
            let _ = writeln!(out, "- Replace \"{}\" with \"{}\"", from, to);
        }
        if !terminology.prohibited.is_empty() {
            out.push_str("\nPROHIBITED TERMS:\n");
            for term in &terminology.prohibited {
                let _ = writeln!(out, "- NEVER use: \"{}\"", term);
            }
        }
    }

    if !rules.qa_checks.is_empty() {
        out.push_str("\n\n## QA VERIFICATION RULES:\n");
        render_flags(&mut out, &rules.qa_checks, false);
    }

    out
}

fn render_few_shot(examples: &[FewShotExample]) -> String {
    let mut out = String::new();
    if examples.is_empty() {
        return out;
    }

    out.push_str("\n\n## FEW-SHOT EXAMPLES:\n");
    for (index, example) in examples.iter().enumerate() {
        if example.input_note.trim().is_empty() {
            continue;
        }
        let _ = write!(
            out,
            "\nExample {}:\nInput: {}\nOutput: {}\n",
            index + 1,
            example.input_note,
            example.output_snippet
        );
    }
    out
}

const RESPONSE_CONTRACT: &str = r#"

## CRITICAL: RESPONSE FORMAT
You MUST respond with valid JSON in this exact format:
{
  "ok": boolean,
  "violations": string[],
  "doctor_names_seen": string[],
  "started_with_worker": boolean,
  "chronology_ok": boolean,
  "rendered_text": string
}
The rendered_text field contains the formatted Section 7 content."#;
