//! 姓名保全引擎 - 业务能力层
//!
//! 基于姓名识别，对比原文与生成文本：
//! - `validate`：找出被截断（只剩姓）或丢失的完整医生姓名
//! - `restore`：按固定优先级把截断写法改回完整姓名
//!
//! 生成文本中出现而原文没有的姓名只作为建议，不算违规。

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{normalize_for_comparison, DoctorName, Language};
use crate::services::name_extractor::extract_doctor_names;

/// 还原后仍有截断姓名时追加的关键违规代码
pub const NAME_TRUNCATED: &str = "name_truncated";

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamePreservationReport {
    pub success: bool,
    pub preserved_names: Vec<String>,
    pub truncated_names: Vec<String>,
    pub violations: Vec<String>,
    pub suggestions: Vec<String>,
}

/// 还原结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub restored_content: String,
    pub names_restored: usize,
}

/// 校验生成文本是否完整保留了原文中的医生姓名
pub fn validate(original: &str, generated: &str, language: Language) -> NamePreservationReport {
    let original_names = extract_doctor_names(original, language);
    let generated_names = extract_doctor_names(generated, language);
    let mut report = NamePreservationReport::default();
    let mut truncated_forms: Vec<&DoctorName> = Vec::new();

    for name in original_names.iter().filter(|n| n.is_complete) {
        let preserved = generated_names
            .iter()
            .any(|g| g.is_complete && g.same_identity(name));
        if preserved {
            report.preserved_names.push(name.full_text.clone());
            continue;
        }

        match generated_names.iter().find(|g| is_bare_surname(g, name)) {
            Some(bare) => {
                report.truncated_names.push(name.full_text.clone());
                report.violations.push(format!(
                    "CRITICAL: Doctor name truncated - \"{}\" became \"{}\"",
                    name.full_text, bare.full_text
                ));
                truncated_forms.push(bare);
            }
            None => report.violations.push(format!(
                "MISSING: Doctor name \"{}\" not found in formatted content",
                name.full_text
            )),
        }
    }

    for generated_name in generated_names.iter().filter(|g| g.is_complete) {
        let known = original_names
            .iter()
            .any(|o| o.same_identity(generated_name))
            || truncated_forms.iter().any(|t| t.same_identity(generated_name));
        if !known {
            report
                .suggestions
                .push(format!("New doctor name found: \"{}\"", generated_name.full_text));
        }
    }

    report.success = report.violations.is_empty();
    report
}

/// 把生成文本中被截断的医生姓名还原为完整写法
///
/// 对每个完整的原文姓名（生成文本中尚无完整写法时），依次尝试：
/// 1. 头衔 + 姓
/// 2. （限定词）+ 头衔 + 名，保留限定词
/// 3. 多词姓氏时，头衔 + 姓氏的第一个词
///
/// 第一个命中的规则被应用后即停止，每个姓名每次调用最多计一次。
pub fn restore(original: &str, generated: &str, language: Language) -> RestoreOutcome {
    let mut content = generated.to_string();
    let mut names_restored = 0;

    for name in extract_doctor_names(original, language)
        .iter()
        .filter(|n| n.is_complete)
    {
        let title = regex::escape(&name.title);
        let first = regex::escape(&name.first_name);
        let last = escape_tokens(&name.last_name);

        let full_pattern = format!(r"(?i){title}\s+{first}\s+{last}");
        match compile(&full_pattern) {
            Some(re) if contains_bounded(&content, &re) => {
                debug!("完整姓名已存在: {}", name.full_text);
                continue;
            }
            Some(_) => {}
            None => continue,
        }

        for rule in RestoreRule::ORDER {
            let pattern = match rule {
                RestoreRule::TitleLast => format!(r"(?i)(?P<title>{title})\s+{last}"),
                RestoreRule::TitleFirst => format!(
                    r"(?i)(?:(?P<det>{})\s+)?(?P<title>{title})\s+{first}",
                    determiners(language)
                ),
                RestoreRule::TitleFirstLastToken => {
                    let mut tokens = name.last_name.split_whitespace();
                    match (tokens.next(), tokens.next()) {
                        (Some(head), Some(_)) => {
                            format!(r"(?i)(?P<title>{title})\s+{}", regex::escape(head))
                        }
                        _ => continue,
                    }
                }
            };
            let Some(re) = compile(&pattern) else {
                continue;
            };

            let (rewritten, hits) = replace_bounded(&content, &re, |caps| {
                let matched_title = caps.name("title").map_or(name.title.as_str(), |m| m.as_str());
                let restored = format!("{} {} {}", matched_title, name.first_name, name.last_name);
                match caps.name("det") {
                    Some(det) => format!("{} {}", det.as_str(), restored),
                    None => restored,
                }
            });

            if hits > 0 {
                debug!("还原姓名 ({:?}): {} 处 → {}", rule, hits, name.full_text);
                content = rewritten;
                names_restored += 1;
                break;
            }
        }
    }

    RestoreOutcome {
        restored_content: content,
        names_restored,
    }
}

/// 提示词中的姓名保全规则（始终放在最前，标记为关键）
pub fn preservation_rules(language: Language) -> &'static str {
    match language {
        Language::French => FRENCH_PRESERVATION_RULES,
        Language::English => ENGLISH_PRESERVATION_RULES,
    }
}

#[derive(Debug, Clone, Copy)]
enum RestoreRule {
    TitleLast,
    TitleFirst,
    TitleFirstLastToken,
}

impl RestoreRule {
    const ORDER: [RestoreRule; 3] = [
        RestoreRule::TitleLast,
        RestoreRule::TitleFirst,
        RestoreRule::TitleFirstLastToken,
    ];
}

fn determiners(language: Language) -> &'static str {
    match language {
        Language::French => "le|la",
        Language::English => "the",
    }
}

/// 生成文本中的姓名是否只剩下原文姓名的姓
fn is_bare_surname(candidate: &DoctorName, original: &DoctorName) -> bool {
    !original.last_name.is_empty()
        && normalize_for_comparison(&candidate.display_name())
            == normalize_for_comparison(&original.last_name)
}

fn escape_tokens(value: &str) -> String {
    value
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("姓名还原模式编译失败 ({}): {}", pattern, e);
            None
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '\'' | '’')
}

fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
}

/// 匹配后面紧跟另一个大写词，说明它是另一个完整姓名的开头
fn continues_with_name_token(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    let trimmed = rest.trim_start_matches([' ', '\t', '\u{a0}']);
    trimmed.len() < rest.len() && trimmed.chars().next().is_some_and(char::is_uppercase)
}

fn contains_bounded(text: &str, re: &Regex) -> bool {
    re.find_iter(text).any(|m| is_bounded(text, m.start(), m.end()))
}

/// 只替换两侧都不与姓名字符相连、且不是其他完整姓名开头的匹配
fn replace_bounded(
    text: &str,
    re: &Regex,
    mut render: impl FnMut(&Captures<'_>) -> String,
) -> (String, usize) {
    let mut out = String::with_capacity(text.len() + 32);
    let mut last = 0;
    let mut count = 0;

    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if !is_bounded(text, m.start(), m.end()) || continues_with_name_token(text, m.end()) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(&render(&caps));
        last = m.end();
        count += 1;
    }

    out.push_str(&text[last..]);
    (out, count)
}

const FRENCH_PRESERVATION_RULES: &str = r#"# RÈGLE CRITIQUE #1 - PRÉSERVATION ABSOLUE DES NOMS DE MÉDECINS

## JAMAIS TRONQUER LES NOMS DE MÉDECINS
- PRÉSERVE TOUJOURS les noms complets avec prénom + nom de famille quand disponibles
- FORMAT OBLIGATOIRE: "docteur [Prénom] [Nom de famille]" (ex: "docteur Jean-Pierre Martin")
- JAMAIS de noms tronqués ou partiels
- Chaque référence médicale doit inclure prénom + nom pour validité légale

## EXEMPLES
CORRECT: "docteur Harry Durusso"
INCORRECT: "docteur Durusso" (prénom supprimé - INTERDIT)

CORRECT: "docteur Roxanne Bouchard-Bellavance"
INCORRECT: "docteur Bouchard-Bellavance" (prénom supprimé - INTERDIT)

## NOMS INCOMPLETS DANS LA DICTÉE
- Seul le prénom est disponible: "docteur [Prénom] (nom de famille non spécifié)"
- Seul le nom de famille est disponible: "docteur [Nom de famille] (prénom non spécifié)"

## ATTENTION: cette règle est CRITIQUE et doit être respectée à 100%"#;

const ENGLISH_PRESERVATION_RULES: &str = r#"# CRITICAL RULE #1 - ABSOLUTE DOCTOR NAME PRESERVATION

## NEVER TRUNCATE DOCTOR NAMES
- ALWAYS preserve full names with first name + surname when available
- REQUIRED FORMAT: "Dr. [First Name] [Last Name]" (ex: "Dr. Jean-Pierre Martin")
- NEVER truncated or partial names
- Every medical reference must include first name + surname for legal validity

## EXAMPLES
CORRECT: "Dr. Harry Durusso"
INCORRECT: "Dr. Durusso" (first name removed - FORBIDDEN)

CORRECT: "Dr. Roxanne Bouchard-Bellavance"
INCORRECT: "Dr. Bouchard-Bellavance" (first name removed - FORBIDDEN)

## INCOMPLETE NAMES IN THE DICTATION
- Only first name available: "Dr. [First Name] (last name not specified)"
- Only last name available: "Dr. [Last Name] (first name not specified)"

## WARNING: this rule is CRITICAL and must be followed 100%"#;

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str =
        "Le travailleur consulte le docteur Harry Durusso le 19 avril 2024 pour une entorse.";

    #[test]
    fn test_validate_preserved() {
        let report = validate(
            ORIGINAL,
            "Le travailleur consulte le docteur Harry Durusso, le 19 avril 2024.",
            Language::French,
        );
        assert!(report.success);
        assert_eq!(report.preserved_names, vec!["docteur Harry Durusso"]);
    }

    #[test]
    fn test_validate_reports_truncation() {
        let report = validate(
            ORIGINAL,
            "Le travailleur consulte le docteur Durusso, le 19 avril 2024.",
            Language::French,
        );
        assert!(!report.success);
        assert_eq!(report.truncated_names, vec!["docteur Harry Durusso"]);
        assert!(report.violations[0].starts_with("CRITICAL: Doctor name truncated"));
    }

    #[test]
    fn test_validate_reports_missing() {
        let report = validate(ORIGINAL, "Le travailleur consulte un médecin.", Language::French);
        assert!(report.truncated_names.is_empty());
        assert!(report.violations[0].starts_with("MISSING:"));
    }

    #[test]
    fn test_new_names_are_suggestions_only() {
        let report = validate(
            ORIGINAL,
            "Le travailleur consulte le docteur Harry Durusso. Il est dirigé vers la docteure Anne Roy.",
            Language::French,
        );
        assert!(report.success);
        assert_eq!(
            report.suggestions,
            vec!["New doctor name found: \"docteure Anne Roy\""]
        );
    }

    #[test]
    fn test_restore_title_last() {
        let outcome = restore(
            ORIGINAL,
            "Le travailleur consulte le docteur Durusso, le 19 avril 2024. Le docteur Durusso prescrit du repos.",
            Language::French,
        );
        assert_eq!(outcome.names_restored, 1);
        assert_eq!(
            outcome.restored_content,
            "Le travailleur consulte le docteur Harry Durusso, le 19 avril 2024. Le docteur Harry Durusso prescrit du repos."
        );
    }

    #[test]
    fn test_restore_title_first_keeps_determiner() {
        let outcome = restore(
            ORIGINAL,
            "Le travailleur revoit le docteur Harry.",
            Language::French,
        );
        assert_eq!(outcome.names_restored, 1);
        assert_eq!(
            outcome.restored_content,
            "Le travailleur revoit le docteur Harry Durusso."
        );
    }

    #[test]
    fn test_restore_first_token_of_compound_last_name() {
        let original = "Consultation avec la docteure Anne Le Roux, chirurgienne.";
        let outcome = restore(original, "La travailleuse revoit la docteure Le.", Language::French);
        assert_eq!(outcome.names_restored, 1);
        assert_eq!(
            outcome.restored_content,
            "La travailleuse revoit la docteure Anne Le Roux."
        );
    }

    #[test]
    fn test_restore_is_idempotent() {
        let first = restore(
            ORIGINAL,
            "Le travailleur consulte le docteur Durusso.",
            Language::French,
        );
        let second = restore(ORIGINAL, &first.restored_content, Language::French);
        assert_eq!(second.names_restored, 0);
        assert_eq!(second.restored_content, first.restored_content);
    }

    #[test]
    fn test_restore_skips_other_doctor_with_same_first_name() {
        let original =
            "Le travailleur consulte le docteur Jean Roy. Il est dirigé vers le docteur Jean Tremblay.";
        let generated = "Le travailleur consulte le docteur Jean Roy. Il revoit le docteur Jean.";

        let first = restore(original, generated, Language::French);
        assert_eq!(first.names_restored, 1);
        assert_eq!(
            first.restored_content,
            "Le travailleur consulte le docteur Jean Roy. Il revoit le docteur Jean Tremblay."
        );

        let second = restore(original, &first.restored_content, Language::French);
        assert_eq!(second.names_restored, 0);
        assert_eq!(second.restored_content, first.restored_content);
    }

    #[test]
    fn test_restore_does_not_touch_hyphenated_surnames() {
        let original = "Le travailleur consulte le docteur Paul Bouchard.";
        let generated = "Le travailleur consulte le docteur Bouchard-Bellavance.";
        let outcome = restore(original, generated, Language::French);
        assert_eq!(outcome.names_restored, 0);
        assert_eq!(outcome.restored_content, generated);
    }

    #[test]
    fn test_restore_escapes_regex_characters() {
        let original = "The worker sees Dr. John O'Neil.";
        let outcome = restore(original, "The worker sees Dr. O'Neil.", Language::English);
        assert_eq!(outcome.restored_content, "The worker sees Dr. John O'Neil.");
    }

    #[test]
    fn test_preservation_rules_are_language_specific() {
        assert!(preservation_rules(Language::French).contains("RÈGLE CRITIQUE"));
        assert!(preservation_rules(Language::English).contains("CRITICAL RULE"));
    }
}
