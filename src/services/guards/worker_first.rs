use std::sync::LazyLock;

use regex::Regex;

use super::Guard;
use crate::models::{GuardOutcome, Language};

/// 叙述必须以工人开头，而不是日期
pub struct WorkerFirstGuard;

static FRENCH_DATE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Le\s+\d{1,2}\s+\w+|Le\s+\d|En\s+\w+)").expect("invalid date-first pattern")
});
static ENGLISH_DATE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:On\s+\w+\s+\d|On\s+\d{1,2})").expect("invalid date-first pattern")
});

static FRENCH_WORKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:le travailleur|la travailleuse)\b").expect("invalid worker pattern")
});
static ENGLISH_WORKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bthe worker\b").expect("invalid worker pattern"));

fn is_header_line(line: &str) -> bool {
    line.trim_start().starts_with("7.")
}

fn capitalize(phrase: &str) -> String {
    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Guard for WorkerFirstGuard {
    fn name(&self) -> &'static str {
        "WorkerFirstGuard"
    }

    fn apply(&self, text: &str, language: Language) -> GuardOutcome {
        let (date_first, worker) = match language {
            Language::French => (&*FRENCH_DATE_FIRST, &*FRENCH_WORKER),
            Language::English => (&*ENGLISH_DATE_FIRST, &*ENGLISH_WORKER),
        };

        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let Some(index) = lines
            .iter()
            .position(|l| !l.trim().is_empty() && !is_header_line(l))
        else {
            return GuardOutcome::clean(text);
        };

        let opener = lines[index].trim().to_string();
        if !date_first.is_match(&opener) {
            return GuardOutcome::clean(text);
        }

        // 全文出现过工人指称时才改写首行，原句附在后面以便追溯
        if let Some(reference) = worker.find(text) {
            lines[index] = format!(
                "{} [action from original: {}]",
                capitalize(reference.as_str()),
                opener
            );
        }

        GuardOutcome::clean(lines.join("\n")).with_violation("date_first_opener")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_first_opener_is_untouched() {
        let text = "7. Historique de faits et évolution\n\nLe travailleur consulte le 3 mai 2024.";
        let outcome = WorkerFirstGuard.apply(text, Language::French);
        assert_eq!(outcome.text, text);
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_date_first_opener_is_rewritten() {
        let text = "Le 3 mai 2024, consultation.\nLa travailleuse revoit le médecin.";
        let outcome = WorkerFirstGuard.apply(text, Language::French);
        assert_eq!(outcome.violations, vec!["date_first_opener"]);
        assert_eq!(
            outcome.text,
            "La travailleuse [action from original: Le 3 mai 2024, consultation.]\nLa travailleuse revoit le médecin."
        );
    }

    #[test]
    fn test_date_first_without_worker_reference_only_flags() {
        let text = "En janvier 2024, douleur lombaire.";
        let outcome = WorkerFirstGuard.apply(text, Language::French);
        assert_eq!(outcome.text, text);
        assert_eq!(outcome.violations, vec!["date_first_opener"]);
    }

    #[test]
    fn test_english_date_first() {
        let text = "On March 3, 2024, the worker consults.";
        let outcome = WorkerFirstGuard.apply(text, Language::English);
        assert_eq!(outcome.violations, vec!["date_first_opener"]);
        assert!(outcome.text.starts_with("The worker [action from original: On March 3"));
    }

    #[test]
    fn test_blank_text_is_clean() {
        let outcome = WorkerFirstGuard.apply("\n  \n", Language::French);
        assert!(outcome.violations.is_empty());
    }
}
