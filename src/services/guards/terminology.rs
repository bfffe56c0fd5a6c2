use std::sync::LazyLock;

use regex::Regex;

use super::Guard;
use crate::models::{GuardMetadata, GuardOutcome, Language, TerminologyChange};

/// 固定的术语替换表
pub struct TerminologyGuard;

struct Substitution {
    regex: Regex,
    source: &'static str,
    replacement: &'static str,
}

fn table(entries: &[(&'static str, &'static str)]) -> Vec<Substitution> {
    entries
        .iter()
        .map(|&(source, replacement)| Substitution {
            regex: Regex::new(source).expect("invalid terminology pattern"),
            source,
            replacement,
        })
        .collect()
}

static FRENCH_TABLE: LazyLock<Vec<Substitution>> = LazyLock::new(|| {
    table(&[
        (r"\ble patient\b", "le travailleur"),
        (r"\bLe patient\b", "Le travailleur"),
        (r"\bla patiente\b", "la travailleuse"),
        (r"\bLa patiente\b", "La travailleuse"),
        (r"\bDocteur\b", "docteur"),
    ])
});

static ENGLISH_TABLE: LazyLock<Vec<Substitution>> = LazyLock::new(|| {
    table(&[
        (r"\bthe patient\b", "the worker"),
        (r"\bThe patient\b", "The worker"),
        (r"\bDoctor\b", "Dr."),
    ])
});

impl Guard for TerminologyGuard {
    fn name(&self) -> &'static str {
        "TerminologyGuard"
    }

    fn apply(&self, text: &str, language: Language) -> GuardOutcome {
        let substitutions = match language {
            Language::French => &*FRENCH_TABLE,
            Language::English => &*ENGLISH_TABLE,
        };

        let mut current = text.to_string();
        let mut changes = Vec::new();

        for sub in substitutions {
            let count = sub.regex.find_iter(&current).count();
            if count == 0 {
                continue;
            }
            current = sub
                .regex
                .replace_all(&current, sub.replacement)
                .into_owned();
            changes.push(TerminologyChange {
                from: sub.source.to_string(),
                to: sub.replacement.to_string(),
                count,
            });
        }

        let outcome = GuardOutcome::clean(current);
        if changes.is_empty() {
            outcome
        } else {
            outcome.with_metadata(GuardMetadata::TerminologyChanges(changes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_substitutions_are_counted() {
        let outcome = TerminologyGuard.apply(
            "Le patient consulte. Docteur Roy revoit le patient et la patiente.",
            Language::French,
        );
        assert_eq!(
            outcome.text,
            "Le travailleur consulte. docteur Roy revoit le travailleur et la travailleuse."
        );
        assert!(outcome.violations.is_empty());
        match outcome.metadata {
            Some(GuardMetadata::TerminologyChanges(changes)) => {
                assert_eq!(changes.len(), 4);
                assert!(changes.iter().all(|c| c.count == 1));
            }
            other => panic!("unexpected metadata: {:?}", other),
        }
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        let text = "La patientèle du docteur est large.";
        let outcome = TerminologyGuard.apply(text, Language::French);
        assert_eq!(outcome.text, text);
        assert!(outcome.metadata.is_none());
    }

    #[test]
    fn test_english_table() {
        let outcome = TerminologyGuard.apply(
            "The patient sees Doctor Smith; the patient improves.",
            Language::English,
        );
        assert_eq!(
            outcome.text,
            "The worker sees Dr. Smith; the worker improves."
        );
    }
}
