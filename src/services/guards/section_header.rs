use super::Guard;
use crate::models::{GuardOutcome, Language};

/// 保证恰好一个第 7 节标题行
pub struct SectionHeaderGuard;

fn is_header_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("7.") && (line.contains("Historique") || line.contains("History"))
}

impl Guard for SectionHeaderGuard {
    fn name(&self) -> &'static str {
        "SectionHeaderGuard"
    }

    fn apply(&self, text: &str, language: Language) -> GuardOutcome {
        let headers = text.split('\n').filter(|l| is_header_line(l)).count();

        match headers {
            0 => {
                let body = text.trim_start_matches(['\n', '\r']);
                GuardOutcome::clean(format!("{}\n\n{}", language.section_header(), body))
                    .with_violation("missing_section_header")
            }
            1 => GuardOutcome::clean(text),
            _ => {
                let mut seen = false;
                let kept: Vec<&str> = text
                    .split('\n')
                    .filter(|line| {
                        if !is_header_line(line) {
                            return true;
                        }
                        !std::mem::replace(&mut seen, true)
                    })
                    .collect();
                GuardOutcome::clean(kept.join("\n")).with_violation("duplicate_section_headers")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_count(text: &str) -> usize {
        text.lines().filter(|l| is_header_line(l)).count()
    }

    #[test]
    fn test_missing_header_is_prepended() {
        let outcome = SectionHeaderGuard.apply("Le travailleur consulte.", Language::French);
        assert_eq!(
            outcome.text,
            "7. Historique de faits et évolution\n\nLe travailleur consulte."
        );
        assert_eq!(outcome.violations, vec!["missing_section_header"]);
        assert_eq!(header_count(&outcome.text), 1);
    }

    #[test]
    fn test_duplicate_headers_keep_first() {
        let text = "7. Historique de faits et évolution\nA\n7. Historique de faits et évolution\nB";
        let outcome = SectionHeaderGuard.apply(text, Language::French);
        assert_eq!(outcome.text, "7. Historique de faits et évolution\nA\nB");
        assert_eq!(outcome.violations, vec!["duplicate_section_headers"]);
    }

    #[test]
    fn test_single_header_is_noop() {
        let text = "7. History of Facts and Clinical Evolution\n\nThe worker consults.";
        let outcome = SectionHeaderGuard.apply(text, Language::English);
        assert_eq!(outcome.text, text);
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_english_header_when_missing() {
        let outcome = SectionHeaderGuard.apply("The worker consults.", Language::English);
        assert!(outcome
            .text
            .starts_with("7. History of Facts and Clinical Evolution\n\n"));
    }
}
