//! 语言路由 - 业务能力层
//!
//! 用固定词表给法语、英语分别计数，票数高者胜；平票时取法语（主要工作语言）。

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::Language;

/// 法语标记词：工人指称、月份、头衔、常见疗程
const FRENCH_MARKERS: &[&str] = &[
    "le travailleur",
    "la travailleuse",
    "docteure",
    "docteur",
    "dre",
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
    "1er",
    "physiothérapie",
    "ergothérapie",
    "consulte",
    "revoit",
];

/// 英语标记词
const ENGLISH_MARKERS: &[&str] = &[
    "the worker",
    "doctor",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "physiotherapy",
    "occupational therapy",
    "consults",
    "sees",
];

static FRENCH_LEXICON: LazyLock<Regex> = LazyLock::new(|| lexicon(FRENCH_MARKERS));
static ENGLISH_LEXICON: LazyLock<Regex> = LazyLock::new(|| lexicon(ENGLISH_MARKERS));

fn lexicon(markers: &[&str]) -> Regex {
    let alternation = markers
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("invalid lexicon pattern")
}

/// 统计两种语言的标记词出现次数 (法语, 英语)
pub fn score(text: &str) -> (usize, usize) {
    (
        FRENCH_LEXICON.find_iter(text).count(),
        ENGLISH_LEXICON.find_iter(text).count(),
    )
}

/// 检测输入语言
///
/// 显式指定的语言总是优先。
pub fn detect_language(text: &str, hint: Option<Language>) -> Language {
    if let Some(language) = hint {
        return language;
    }

    let (french, english) = score(text);
    let language = if english > french {
        Language::English
    } else {
        Language::French
    };

    debug!(
        "语言检测: 法语 {} / 英语 {} → {}",
        french, english, language
    );
    language
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_authoritative() {
        let english = "The worker sees Dr. John Smith on March 3, 2024.";
        assert_eq!(
            detect_language(english, Some(Language::French)),
            Language::French
        );
    }

    #[test]
    fn test_detects_french() {
        let text = "Le travailleur consulte le docteur Harry Durusso le 12 mars 2024.";
        assert_eq!(detect_language(text, None), Language::French);
    }

    #[test]
    fn test_detects_english() {
        let text = "The worker consults doctor Jane Smith on March 3, 2024 and starts physiotherapy in April.";
        assert_eq!(detect_language(text, None), Language::English);
    }

    #[test]
    fn test_tie_resolves_to_french() {
        assert_eq!(detect_language("12345", None), Language::French);
        assert_eq!(score(""), (0, 0));
    }

    #[test]
    fn test_markers_need_word_boundaries() {
        // "maintenant" 不应计为 "mai"
        assert_eq!(score("maintenant").0, 0);
    }
}
