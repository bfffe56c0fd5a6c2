use std::sync::LazyLock;

use regex::Regex;

use super::Guard;
use crate::models::{GuardOutcome, Language};

/// 椎体节段写法统一为 `L4-L5`
///
/// 只规范化带连字符的范围；没有连字符的 `L 4 L 5` 无法确定是范围还是两个节段，只报告违规。
pub struct VertebraeGuard;

static VERTEBRAE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([CTLS])\s*(\d{1,2})\s*[-–]\s*([CTLS])\s*(\d{1,2})\b")
        .expect("invalid vertebrae pattern")
});

/// 字母与数字之间也有空格的写法（如 `L 4 L 5`、`L 4 - L 5`）
static SPACED_VERTEBRAE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[CTLS]\s+\d{1,2}\s*[-–]?\s*[CTLS]\s+\d{1,2}\b")
        .expect("invalid vertebrae pattern")
});

impl Guard for VertebraeGuard {
    fn name(&self) -> &'static str {
        "VertebraeGuard"
    }

    fn apply(&self, text: &str, _language: Language) -> GuardOutcome {
        let spaced = SPACED_VERTEBRAE.find_iter(text).count();
        let normalized = VERTEBRAE_RANGE
            .replace_all(text, "${1}${2}-${3}${4}")
            .into_owned();

        (0..spaced).fold(GuardOutcome::clean(normalized), |outcome, _| {
            outcome.with_violation("inconsistent_vertebrae_spacing")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphen_spacing_is_normalized() {
        let outcome = VertebraeGuard.apply("Hernie discale L4 - L5 et C5 – C6.", Language::French);
        assert_eq!(outcome.text, "Hernie discale L4-L5 et C5-C6.");
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_fully_spaced_variant_is_flagged() {
        let outcome = VertebraeGuard.apply("Protrusion L 4 - L 5.", Language::French);
        assert_eq!(outcome.text, "Protrusion L4-L5.");
        assert_eq!(outcome.violations, vec!["inconsistent_vertebrae_spacing"]);
    }

    #[test]
    fn test_spaced_levels_without_hyphen_are_flagged_only() {
        let text = "Discopathie L 4 L 5.";
        let outcome = VertebraeGuard.apply(text, Language::French);
        assert_eq!(outcome.text, text);
        assert_eq!(outcome.violations, vec!["inconsistent_vertebrae_spacing"]);
    }

    #[test]
    fn test_canonical_form_is_noop() {
        let text = "Fusion L5-S1.";
        let outcome = VertebraeGuard.apply(text, Language::English);
        assert_eq!(outcome.text, text);
        assert!(outcome.violations.is_empty());
    }
}
