//! 守卫流水线 - 业务能力层
//!
//! 六个互相独立的文本守卫，按固定顺序执行，每个守卫消费上一个守卫的输出文本。
//! 守卫只做确定性的正则处理，不做 I/O，也不会失败：发现的问题一律记为违规。

mod order;
mod quote;
mod section_header;
mod terminology;
mod vertebrae;
mod worker_first;

pub use order::OrderGuard;
pub use quote::QuoteGuard;
pub use section_header::SectionHeaderGuard;
pub use terminology::TerminologyGuard;
pub use vertebrae::VertebraeGuard;
pub use worker_first::WorkerFirstGuard;

use tracing::debug;

use crate::models::{GuardMetadata, GuardOutcome, Language};

/// 文本守卫
pub trait Guard: Send + Sync {
    /// 守卫名称（写入 `guardsApplied`）
    fn name(&self) -> &'static str;

    /// 处理文本，返回新文本与违规
    fn apply(&self, text: &str, language: Language) -> GuardOutcome;
}

/// 流水线的汇总输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// 最后一个守卫的输出文本
    pub text: String,
    /// 所有守卫的违规（保持顺序，允许重复）
    pub violations: Vec<String>,
    /// 修改了文本或报告了违规的守卫
    pub guards_applied: Vec<String>,
    pub metadata: Vec<(String, GuardMetadata)>,
}

/// 守卫流水线
pub struct GuardPipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardPipeline {
    /// 标准的六个守卫，顺序固定
    pub fn standard() -> Self {
        Self {
            guards: vec![
                Box::new(SectionHeaderGuard),
                Box::new(TerminologyGuard),
                Box::new(WorkerFirstGuard),
                Box::new(VertebraeGuard),
                Box::new(QuoteGuard),
                Box::new(OrderGuard),
            ],
        }
    }

    /// 自定义守卫组合
    pub fn with_guards(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }

    pub fn guard_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub fn run(&self, text: &str, language: Language) -> PipelineOutcome {
        let mut outcome = PipelineOutcome {
            text: text.to_string(),
            ..Default::default()
        };

        for guard in &self.guards {
            let result = guard.apply(&outcome.text, language);
            let changed = result.text != outcome.text;

            if changed || !result.violations.is_empty() {
                debug!(
                    guard = guard.name(),
                    changed,
                    violations = result.violations.len(),
                    "守卫已生效"
                );
                outcome.guards_applied.push(guard.name().to_string());
            }

            outcome.violations.extend(result.violations);
            if let Some(metadata) = result.metadata {
                outcome.metadata.push((guard.name().to_string(), metadata));
            }
            outcome.text = result.text;
        }

        outcome
    }
}

impl Default for GuardPipeline {
    fn default() -> Self {
        Self::standard()
    }
}
