use serde::Serialize;

/// 单次术语替换记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminologyChange {
    /// 源模式
    pub from: String,
    pub to: String,
    pub count: usize,
}

/// 时间顺序诊断：某个带日期的行应处的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateReordering {
    /// 行号（非空行序号，从 0 开始）
    pub line: usize,
    /// 当前在日期序列中的位置
    pub from: usize,
    /// 按时间排序后应处的位置
    pub to: usize,
    /// ISO 日期
    pub date: String,
}

/// 守卫附带的诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMetadata {
    TerminologyChanges(Vec<TerminologyChange>),
    DateReorderings(Vec<DateReordering>),
}

/// 单个守卫的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub text: String,
    pub violations: Vec<String>,
    pub metadata: Option<GuardMetadata>,
}

impl GuardOutcome {
    /// 无违规、无诊断信息
    pub fn clean(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            violations: Vec::new(),
            metadata: None,
        }
    }

    /// 追加一条违规
    pub fn with_violation(mut self, violation: impl Into<String>) -> Self {
        self.violations.push(violation.into());
        self
    }

    pub fn with_metadata(mut self, metadata: GuardMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
