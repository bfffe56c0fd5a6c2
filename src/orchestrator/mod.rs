//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `formatter` - 单次格式化
//! - 语言检测 → 提示词组装 → 模型调用 → 守卫 → 姓名保全 → QA 关卡
//! - 模型失败时的兜底模式
//!
//! ### `batch_processor` - 批量处理
//! - 扫描输入目录、控制并发、写出结果、汇总统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! formatter (处理单段口述)
//!     ↓
//! workflow (prompt_builder / qa_gate)
//!     ↓
//! services (语言路由 / 姓名识别与保全 / 守卫 / LLM)
//!     ↓
//! infrastructure (工件解析器 / 提示词缓存)
//! ```

pub mod batch_processor;
pub mod formatter;

// 重新导出主要类型
pub use batch_processor::{format_single_file, App, ProcessingStats};
pub use formatter::Section7Formatter;
