//! 医生姓名识别 - 业务能力层
//!
//! 规则表按语言区分，按优先级从最具体到最宽松依次匹配：
//! 1. 头衔 + 多词姓名 + 逗号后的专科
//! 2. 头衔 + 多词姓名
//! 3. 头衔 + 单个大写词（不完整姓名）
//!
//! 高优先级规则先占用文本区间，低优先级规则不能再匹配重叠的位置。

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{DoctorName, Language};

const FRENCH_TITLE: &str = r"(?i:docteure|docteur|dre\.?|dr\.?|doctor)";
const FRENCH_TOKEN: &str = r"\p{Lu}[\p{L}'’\-]+";
const ENGLISH_TITLE: &str = r"(?i:doctor|dr\.?)";
const ENGLISH_TOKEN: &str = r"[A-Z][A-Za-z'’\-]+";

/// 捕获组到姓名字段的映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMapping {
    /// 1 = 头衔, 2 = 姓名, 3 = 专科
    TitleNameSpecialty,
    /// 1 = 头衔, 2 = 姓名
    TitleName,
    /// 1 = 头衔, 2 = 单个词
    TitleSingleToken,
}

/// 一条识别规则
#[derive(Debug)]
pub struct NameRule {
    pub mapping: CaptureMapping,
    pub regex: Regex,
}

impl NameRule {
    fn new(mapping: CaptureMapping, title: &str, token: &str) -> Self {
        let pattern = match mapping {
            CaptureMapping::TitleNameSpecialty => {
                format!(r"\b({title})\s+({token}(?:[ \t]+{token})+),[ \t]*([^,.\n]+)")
            }
            CaptureMapping::TitleName => format!(r"\b({title})\s+({token}(?:[ \t]+{token})+)"),
            CaptureMapping::TitleSingleToken => format!(r"\b({title})\s+({token})"),
        };
        Self {
            mapping,
            regex: Regex::new(&pattern).expect("invalid doctor name rule"),
        }
    }

    /// 该规则占用的区间（不含专科部分）
    fn claimed_span(&self, caps: &Captures<'_>) -> Option<Range<usize>> {
        let whole = caps.get(0)?;
        let name = caps.get(2)?;
        Some(whole.start()..name.end())
    }

    fn build(&self, caps: &Captures<'_>) -> Option<DoctorName> {
        let title = caps.get(1)?.as_str();
        let name = caps.get(2)?.as_str();
        let specialty = match self.mapping {
            CaptureMapping::TitleNameSpecialty => caps
                .get(3)
                .map(|m| m.as_str())
                .filter(|clause| is_specialty_clause(clause)),
            _ => None,
        };
        Some(DoctorName::from_parts(title, name, specialty))
    }
}

/// 逗号后以限定词、介词或数字开头的是从句或日期，不是专科
const NON_SPECIALTY_LEADS: [&str; 16] = [
    "le", "la", "les", "l'", "l’", "un", "une", "des", "du", "au", "en", "the", "a", "an", "on",
    "in",
];

fn is_specialty_clause(clause: &str) -> bool {
    let clause = clause.trim();
    let Some(first) = clause.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    let lower = clause.to_lowercase();
    !NON_SPECIALTY_LEADS.iter().any(|lead| {
        lower.strip_prefix(lead).is_some_and(|rest| {
            lead.ends_with(['\'', '’']) || rest.is_empty() || rest.starts_with(char::is_whitespace)
        })
    })
}

static FRENCH_RULES: LazyLock<Vec<NameRule>> =
    LazyLock::new(|| build_rules(FRENCH_TITLE, FRENCH_TOKEN));
static ENGLISH_RULES: LazyLock<Vec<NameRule>> =
    LazyLock::new(|| build_rules(ENGLISH_TITLE, ENGLISH_TOKEN));

fn build_rules(title: &str, token: &str) -> Vec<NameRule> {
    [
        CaptureMapping::TitleNameSpecialty,
        CaptureMapping::TitleName,
        CaptureMapping::TitleSingleToken,
    ]
    .into_iter()
    .map(|mapping| NameRule::new(mapping, title, token))
    .collect()
}

/// 获取某语言的规则表（按优先级排序）
pub fn rules_for(language: Language) -> &'static [NameRule] {
    match language {
        Language::French => &FRENCH_RULES,
        Language::English => &ENGLISH_RULES,
    }
}

/// 从文本中提取医生姓名
///
/// 结果保持首次出现顺序；同一身份只保留一条，完整版本原位替换不完整版本。
pub fn extract_doctor_names(text: &str, language: Language) -> Vec<DoctorName> {
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut hits: Vec<(usize, DoctorName)> = Vec::new();

    for rule in rules_for(language) {
        for caps in rule.regex.captures_iter(text) {
            let Some(span) = rule.claimed_span(&caps) else {
                continue;
            };
            if !ends_cleanly(text, span.end) || claimed.iter().any(|c| overlaps(c, &span)) {
                continue;
            }
            if let Some(name) = rule.build(&caps) {
                hits.push((span.start, name));
                claimed.push(span);
            }
        }
    }

    hits.sort_by_key(|(start, _)| *start);
    merge(hits.into_iter().map(|(_, name)| name))
}

fn merge(candidates: impl Iterator<Item = DoctorName>) -> Vec<DoctorName> {
    let mut names: Vec<DoctorName> = Vec::new();

    for candidate in candidates {
        if names.iter().any(|existing| existing.same_identity(&candidate)) {
            continue;
        }

        if candidate.is_complete {
            let partial = names
                .iter()
                .position(|existing| existing.is_partial_of(&candidate));
            if let Some(index) = partial {
                names[index] = candidate.clone();
                // 同一人的其他不完整写法一并并入
                let mut seen_first = false;
                names.retain(|existing| {
                    if existing.same_identity(&candidate) {
                        let keep = !seen_first;
                        seen_first = true;
                        return keep;
                    }
                    !existing.is_partial_of(&candidate)
                });
                continue;
            }
        } else if names
            .iter()
            .any(|existing| existing.is_complete && candidate.is_partial_of(existing))
        {
            continue;
        }

        names.push(candidate);
    }

    names
}

fn ends_cleanly(text: &str, end: usize) -> bool {
    text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric())
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str, language: Language) -> Vec<String> {
        extract_doctor_names(text, language)
            .into_iter()
            .map(|n| n.full_text)
            .collect()
    }

    #[test]
    fn test_full_name_with_specialty() {
        let found = extract_doctor_names(
            "Le travailleur consulte le docteur Jean-Pierre Martin, orthopédiste, le 3 juin 2024.",
            Language::French,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Jean-Pierre");
        assert_eq!(found[0].last_name, "Martin");
        assert_eq!(found[0].specialty.as_deref(), Some("orthopédiste"));
        assert!(found[0].is_complete);
    }

    #[test]
    fn test_date_after_comma_is_not_a_specialty() {
        let found = extract_doctor_names(
            "Le travailleur revoit le docteur Harry Durusso, le 12 mars 2024.",
            Language::French,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_text, "docteur Harry Durusso");
        assert_eq!(found[0].specialty, None);

        let found = extract_doctor_names(
            "The worker sees Dr. John Smith, 3 weeks later.",
            Language::English,
        );
        assert_eq!(found[0].specialty, None);
    }

    #[test]
    fn test_full_name_without_specialty() {
        assert_eq!(
            names("Il revoit la docteure Hélène Côté le 5 mai.", Language::French),
            vec!["docteure Hélène Côté"]
        );
    }

    #[test]
    fn test_single_token_is_incomplete() {
        let found =
            extract_doctor_names("Le travailleur revoit le docteur Harry.", Language::French);
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_complete);
        assert_eq!(found[0].first_name, "Harry");
    }

    #[test]
    fn test_first_name_is_not_reported_separately() {
        let found = extract_doctor_names(
            "Le travailleur consulte le docteur Harry Durusso pour une entorse.",
            Language::French,
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].is_complete);
    }

    #[test]
    fn test_duplicates_are_merged() {
        let text = "Le docteur Harry Durusso examine. Le docteur Harry Durusso revoit. Le docteur Durusso conclut.";
        assert_eq!(names(text, Language::French), vec!["docteur Harry Durusso"]);
    }

    #[test]
    fn test_incomplete_replaced_in_place_by_later_complete() {
        let text = "Le docteur Durusso examine. La docteure Anne Roy opère. Le docteur Harry Durusso conclut.";
        assert_eq!(
            names(text, Language::French),
            vec!["docteur Harry Durusso", "docteure Anne Roy"]
        );
    }

    #[test]
    fn test_apostrophes_and_accents() {
        assert_eq!(
            names("Suivi par le Dr. Émile D'Amours.", Language::French),
            vec!["Dr. Émile D'Amours"]
        );
    }

    #[test]
    fn test_lowercase_word_after_title_is_not_a_name() {
        let found =
            extract_doctor_names("Il consulte un docteur pour sa douleur.", Language::French);
        assert!(found.is_empty());
    }

    #[test]
    fn test_english_rules() {
        let found = extract_doctor_names(
            "The worker sees Dr. John Smith, orthopedic surgeon, then doctor Patel.",
            Language::English,
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].full_text, "Dr. John Smith");
        assert_eq!(found[0].specialty.as_deref(), Some("orthopedic surgeon"));
        assert!(!found[1].is_complete);
    }

    #[test]
    fn test_rule_table_priority_order() {
        let mappings: Vec<_> = rules_for(Language::French).iter().map(|r| r.mapping).collect();
        assert_eq!(
            mappings,
            vec![
                CaptureMapping::TitleNameSpecialty,
                CaptureMapping::TitleName,
                CaptureMapping::TitleSingleToken
            ]
        );
    }
}
