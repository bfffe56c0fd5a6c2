use std::sync::LazyLock;

use regex::Regex;

use super::Guard;
use crate::models::{GuardOutcome, Language};

/// 引号风格：法语用书名号 « »，英语用直双引号
pub struct QuoteGuard;

static STRAIGHT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[ \t]*([^"]*?)[ \t]*""#).expect("invalid quote pattern"));
static CURLY_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"“[ \t]*([^”]*?)[ \t]*”").expect("invalid quote pattern"));
static GUILLEMET_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"«[\s\u{a0}\u{202f}]*([^»]*?)[\s\u{a0}\u{202f}]*»").expect("invalid quote pattern")
});

fn french(text: &str) -> (String, bool) {
    let text = STRAIGHT_PAIR.replace_all(text, "« ${1} »");
    let text = CURLY_PAIR.replace_all(&text, "« ${1} »").into_owned();

    let opens = text.matches('«').count();
    let closes = text.matches('»').count();
    let leftovers = text.matches(['"', '“', '”']).count();
    let balanced = opens == closes && leftovers == 0;
    (text, balanced)
}

fn english(text: &str) -> (String, bool) {
    let text = GUILLEMET_PAIR.replace_all(text, "\"${1}\"");
    let text = CURLY_PAIR.replace_all(&text, "\"${1}\"").into_owned();

    let straight = text.matches('"').count();
    let stray = text.matches(['«', '»', '“', '”']).count();
    let balanced = straight % 2 == 0 && stray == 0;
    (text, balanced)
}

impl Guard for QuoteGuard {
    fn name(&self) -> &'static str {
        "QuoteGuard"
    }

    fn apply(&self, text: &str, language: Language) -> GuardOutcome {
        let (normalized, balanced) = match language {
            Language::French => french(text),
            Language::English => english(text),
        };

        let outcome = GuardOutcome::clean(normalized);
        if balanced {
            outcome
        } else {
            outcome.with_violation("unbalanced_quotes")
        }
    }
}
