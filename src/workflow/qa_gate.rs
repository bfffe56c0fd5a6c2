//! QA 关卡 - 流程层
//!
//! 把违规分为关键与提示两类；模型报告成功且无关键违规才算通过。

/// 关键违规
pub const CRITICAL_VIOLATIONS: [&str; 5] = [
    "date_first_opener",
    "worker_first",
    "chronology_fail",
    "incomplete_quotes",
    "name_truncated",
];

pub fn is_critical(violation: &str) -> bool {
    CRITICAL_VIOLATIONS.contains(&violation)
}

/// 关卡结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaVerdict {
    pub ok: bool,
    pub critical: Vec<String>,
}

impl QaVerdict {
    /// 存在关键违规时给出一条汇总建议
    pub fn suggestion(&self) -> Option<String> {
        if self.critical.is_empty() {
            None
        } else {
            Some(format!(
                "Critical violations found: {}",
                self.critical.join(", ")
            ))
        }
    }
}

pub fn evaluate(model_ok: bool, violations: &[String]) -> QaVerdict {
    let critical: Vec<String> = violations
        .iter()
        .filter(|v| is_critical(v))
        .cloned()
        .collect();

    QaVerdict {
        ok: model_ok && critical.is_empty(),
        critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_informational_violations_keep_ok() {
        let verdict = evaluate(true, &owned(&["missing_section_header", "unbalanced_quotes"]));
        assert!(verdict.ok);
        assert!(verdict.suggestion().is_none());
    }

    #[test]
    fn test_critical_violation_fails() {
        let verdict = evaluate(true, &owned(&["chronology_fail", "missing_section_header"]));
        assert!(!verdict.ok);
        assert_eq!(
            verdict.suggestion().as_deref(),
            Some("Critical violations found: chronology_fail")
        );
    }

    #[test]
    fn test_remaining_name_truncation_fails() {
        let verdict = evaluate(true, &owned(&["name_truncated"]));
        assert!(!verdict.ok);
        assert_eq!(verdict.critical, vec!["name_truncated"]);
    }

    #[test]
    fn test_model_failure_fails_without_violations() {
        assert!(!evaluate(false, &[]).ok);
    }
}
