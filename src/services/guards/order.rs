use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::Guard;
use crate::models::{DateReordering, GuardMetadata, GuardOutcome, Language};

/// 检查带日期的行是否按时间先后排列（只诊断，不重排正文）
pub struct OrderGuard;

static FRENCH_MONTHS: phf::Map<&'static str, u32> = phf::phf_map! {
    "janvier" => 1,
    "février" => 2, "fevrier" => 2,
    "mars" => 3,
    "avril" => 4,
    "mai" => 5,
    "juin" => 6,
    "juillet" => 7,
    "août" => 8, "aout" => 8,
    "septembre" => 9,
    "octobre" => 10,
    "novembre" => 11,
    "décembre" => 12, "decembre" => 12,
};

static ENGLISH_MONTHS: phf::Map<&'static str, u32> = phf::phf_map! {
    "january" => 1,
    "february" => 2,
    "march" => 3,
    "april" => 4,
    "may" => 5,
    "june" => 6,
    "july" => 7,
    "august" => 8,
    "september" => 9,
    "october" => 10,
    "november" => 11,
    "december" => 12,
};

/// 日 + 月 + 年，如 "1er mars 2024"、"19 décembre 2023"
static FRENCH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:er)?\s+(janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre)\s+(\d{4})\b",
    )
    .expect("invalid french date pattern")
});

/// 月 + 日 + 年，如 "March 3rd, 2024"
static ENGLISH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .expect("invalid english date pattern")
});

/// 带日期的行
#[derive(Debug, Clone, Copy)]
struct DatedLine {
    line: usize,
    date: NaiveDate,
}

fn parse_line_date(line: &str, language: Language) -> Option<NaiveDate> {
    let (regex, months, (day_idx, month_idx)) = match language {
        Language::French => (&*FRENCH_DATE, &FRENCH_MONTHS, (1, 2)),
        Language::English => (&*ENGLISH_DATE, &ENGLISH_MONTHS, (2, 1)),
    };

    regex.captures_iter(line).find_map(|caps| {
        let day: u32 = caps.get(day_idx)?.as_str().parse().ok()?;
        let month = *months.get(caps.get(month_idx)?.as_str().to_lowercase().as_str())?;
        let year: i32 = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn dated_lines(text: &str, language: Language) -> Vec<DatedLine> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .filter_map(|(line, content)| {
            parse_line_date(content, language).map(|date| DatedLine { line, date })
        })
        .collect()
}

impl Guard for OrderGuard {
    fn name(&self) -> &'static str {
        "OrderGuard"
    }

    fn apply(&self, text: &str, language: Language) -> GuardOutcome {
        let dated = dated_lines(text, language);
        if dated.windows(2).all(|pair| pair[0].date <= pair[1].date) {
            return GuardOutcome::clean(text);
        }

        let mut order: Vec<usize> = (0..dated.len()).collect();
        order.sort_by_key(|&i| dated[i].date);

        let moves = order
            .iter()
            .enumerate()
            .filter(|(to, from)| *to != **from)
            .map(|(to, &from)| DateReordering {
                line: dated[from].line,
                from,
                to,
                date: dated[from].date.to_string(),
            })
            .collect();

        GuardOutcome::clean(text)
            .with_violation("chronology_fail")
            .with_metadata(GuardMetadata::DateReorderings(moves))
    }
}
